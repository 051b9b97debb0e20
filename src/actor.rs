//! The actor contract: identifiers, the `receive` interface, and the control
//! signals an actor hands back to the runtime.

use async_trait::async_trait;
use std::any::TypeId;
use std::error::Error;
use std::fmt;

/// Unique identifier of a spawned actor within one
/// [`ActorSystem`](crate::ActorSystem).
///
/// Pids are allocated monotonically starting at 1 and are never reused for
/// the lifetime of the system. [`Pid::INVALID`] (zero) is a sentinel that no
/// successful spawn ever returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub(crate) u64);

impl Pid {
    /// The reserved, never-allocated sentinel.
    pub const INVALID: Pid = Pid(0);

    /// Build a Pid from its raw value. Useful for embedding Pids in
    /// application messages and for addressing actors from tests.
    pub const fn from_raw(raw: u64) -> Pid {
        Pid(raw)
    }

    /// Raw numeric value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.0)
    }
}

/// Control signal returned from [`Actor::receive`] alongside the next state.
pub enum Control<M> {
    /// Process the next message normally.
    Continue,
    /// Defer the just-received message: ownership flows back to the runtime,
    /// which moves it to the stash partition. Stashed messages are
    /// redelivered, ahead of the regular queue and in their stash order,
    /// once the actor transitions to a state of a different type.
    Stash(M),
    /// Remove the actor from the registry and end its execution loop.
    /// Messages still queued in its mailbox are discarded.
    Terminate,
    /// Non-fatal application error. The runtime logs it and keeps
    /// dispatching; only [`Control::Terminate`] ends an actor.
    Fault(Box<dyn Error + Send + Sync>),
}

impl<M> fmt::Debug for Control<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Continue => f.write_str("Continue"),
            Control::Stash(_) => f.write_str("Stash(..)"),
            Control::Terminate => f.write_str("Terminate"),
            Control::Fault(error) => write!(f, "Fault({error})"),
        }
    }
}

/// The result of one [`Actor::receive`] call: the state that handles the
/// next message, plus a control signal for the runtime.
pub struct Transition<M> {
    /// State for the subsequent message. With [`Control::Terminate`] it is
    /// dropped without ever being invoked again.
    pub state: Box<dyn Actor<M>>,
    /// What the runtime should do with the just-received message and the
    /// actor itself.
    pub control: Control<M>,
}

impl<M: Send + 'static> Transition<M> {
    /// Keep processing with `state`.
    pub fn resume(state: Box<dyn Actor<M>>) -> Self {
        Self {
            state,
            control: Control::Continue,
        }
    }

    /// Defer `msg` for later redelivery and keep processing with `state`.
    pub fn stash(state: Box<dyn Actor<M>>, msg: M) -> Self {
        Self {
            state,
            control: Control::Stash(msg),
        }
    }

    /// End the actor. Subsequent sends to its Pid fail with
    /// [`SendError::InvalidPid`](crate::SendError::InvalidPid).
    pub fn terminate(state: Box<dyn Actor<M>>) -> Self {
        Self {
            state,
            control: Control::Terminate,
        }
    }

    /// Report a non-fatal fault and keep processing with `state`.
    pub fn fault(
        state: Box<dyn Actor<M>>,
        error: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            state,
            control: Control::Fault(error.into()),
        }
    }
}

/// A stateful message handler.
///
/// `receive` consumes the current state and returns the state for the next
/// message, which may be a different concrete type entirely: multi-state
/// protocols are modeled as one type per state, each handing off to the
/// next. Returning a state of a *different type* marks a behavior change
/// and makes the runtime redeliver any stashed messages; returning `self`
/// (or any state of the same type) keeps the stash parked.
///
/// The state is owned exclusively by the actor's execution loop, so
/// implementations may mutate it freely without synchronization.
#[async_trait]
pub trait Actor<M: Send + 'static>: Send + 'static {
    /// Handle one message and choose the state and control signal for what
    /// comes next.
    async fn receive(self: Box<Self>, msg: M) -> Transition<M>;

    /// Identity used by the runtime to detect behavior changes between
    /// consecutive states. The default (the concrete type of the state) is
    /// right for virtually every actor; there is no reason to override it.
    fn state_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_sentinel_is_zero() {
        assert_eq!(Pid::INVALID.as_u64(), 0);
        assert_eq!(Pid::from_raw(42).as_u64(), 42);
    }

    #[test]
    fn pid_display() {
        assert_eq!(Pid::from_raw(3).to_string(), "actor-3");
    }

    #[test]
    fn control_debug_does_not_require_message_debug() {
        struct Opaque;
        let control: Control<Opaque> = Control::Stash(Opaque);
        assert_eq!(format!("{control:?}"), "Stash(..)");
        let fault: Control<Opaque> = Control::Fault("boom".into());
        assert_eq!(format!("{fault:?}"), "Fault(boom)");
    }
}
