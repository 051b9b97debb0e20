//! The actor system: registry of live actors, spawn/send routing, the
//! per-actor execution loop, and the termination barrier.

use crate::actor::{Actor, Control, Pid, Transition};
use crate::error::SendError;
use crate::mailbox::Mailbox;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

/// Handle to a running actor system.
///
/// Cloning is cheap (all state sits behind an `Arc`) and every clone
/// addresses the same registry. Spawn constructors receive such a clone so
/// an actor can keep a handle in its state and send messages of its own.
///
/// The system is generic over one application-chosen message type `M`,
/// typically an enum over the application's closed message set. The runtime
/// never inspects payloads; discrimination happens in each actor's
/// `receive`.
pub struct ActorSystem<M: Send + 'static> {
    inner: Arc<SystemInner<M>>,
}

struct SystemInner<M: Send + 'static> {
    /// Live actors. `send` enqueues while holding the read lock and the
    /// execution loop removes its entry under the write lock, so a send
    /// either queues its message before termination commits or observes
    /// the removal and reports `InvalidPid`. There is no in-between.
    registry: RwLock<HashMap<Pid, ActorCell<M>>>,
    /// Monotonic Pid source. Zero is the reserved invalid sentinel.
    next_pid: AtomicU64,
    /// Count of live execution loops; `await_termination` waits for zero.
    live: watch::Sender<usize>,
}

struct ActorCell<M> {
    mailbox: Arc<Mailbox<M>>,
}

impl<M: Send + 'static> Clone for ActorSystem<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Send + 'static> Default for ActorSystem<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> ActorSystem<M> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SystemInner {
                registry: RwLock::new(HashMap::new()),
                next_pid: AtomicU64::new(1),
                live: watch::channel(0).0,
            }),
        }
    }

    /// Spawn a new actor and return its Pid.
    ///
    /// The constructor is called with a system handle and the freshly
    /// allocated Pid; it returns the initial state plus a mailbox limit
    /// hint (zero leaves the regular partition unbounded). The Pid is
    /// routable the moment `spawn` returns.
    pub async fn spawn<F>(&self, constructor: F) -> Pid
    where
        F: FnOnce(ActorSystem<M>, Pid) -> (Box<dyn Actor<M>>, usize),
    {
        let pid = Pid(self.inner.next_pid.fetch_add(1, Ordering::Relaxed));
        let (state, limit) = constructor(self.clone(), pid);

        let mailbox = Arc::new(Mailbox::new());
        mailbox.set_limit(limit);
        self.inner.registry.write().await.insert(
            pid,
            ActorCell {
                mailbox: Arc::clone(&mailbox),
            },
        );
        self.inner.live.send_modify(|live| *live += 1);

        debug!(actor = %pid, limit, "spawned actor");
        tokio::spawn(self.clone().run(pid, state, mailbox));
        pid
    }

    /// Deliver `msg` to the regular partition of `pid`'s mailbox.
    ///
    /// Fails with [`SendError::InvalidPid`] if the actor was never spawned
    /// or has terminated, and with [`SendError::MailboxFull`] if its
    /// regular partition is at its bound.
    ///
    /// A send that succeeds immediately before the recipient terminates is
    /// not retroactively failed: the message is discarded together with the
    /// mailbox. Callers that need delivery confirmation must build it into
    /// their message protocol.
    pub async fn send(&self, pid: Pid, msg: M) -> Result<(), SendError> {
        let registry = self.inner.registry.read().await;
        let cell = registry.get(&pid).ok_or(SendError::InvalidPid(pid))?;
        cell.mailbox.enqueue(msg)
    }

    /// Deliver `msg` ahead of every regular message queued so far.
    ///
    /// Priority messages stay FIFO among themselves and bypass the mailbox
    /// capacity bound, so the only failure mode is
    /// [`SendError::InvalidPid`].
    pub async fn send_priority(&self, pid: Pid, msg: M) -> Result<(), SendError> {
        let registry = self.inner.registry.read().await;
        let cell = registry.get(&pid).ok_or(SendError::InvalidPid(pid))?;
        cell.mailbox.enqueue_front(msg);
        Ok(())
    }

    /// Number of live actors.
    pub async fn actor_count(&self) -> usize {
        self.inner.registry.read().await.len()
    }

    /// Wait until every spawned actor's execution loop has finished.
    ///
    /// Returns immediately when nothing was ever spawned. Any number of
    /// callers may wait concurrently.
    pub async fn await_termination(&self) {
        let mut live = self.inner.live.subscribe();
        // The sender half lives in `inner`, which `self` keeps alive, so
        // the channel cannot close while we wait.
        let _ = live.wait_for(|live| *live == 0).await;
    }

    /// Per-actor execution loop: dequeue, dispatch, interpret the control
    /// signal, repeat until the actor terminates. A transition to a state
    /// of a different type splices stashed messages back in front of the
    /// regular queue.
    async fn run(self, pid: Pid, mut state: Box<dyn Actor<M>>, mailbox: Arc<Mailbox<M>>) {
        loop {
            let msg = mailbox.dequeue().await;
            let prev = state.state_id();
            let Transition {
                state: next,
                control,
            } = state.receive(msg).await;

            match control {
                Control::Continue => {
                    if next.state_id() != prev {
                        mailbox.unstash();
                    }
                    state = next;
                }
                Control::Fault(error) => {
                    warn!(actor = %pid, error = %error, "actor fault, dispatch continues");
                    if next.state_id() != prev {
                        mailbox.unstash();
                    }
                    state = next;
                }
                Control::Stash(msg) => {
                    // The deferred message must not come straight back, so a
                    // state change here does not trigger redelivery.
                    mailbox.stash(msg);
                    state = next;
                }
                Control::Terminate => {
                    // Removal commits the termination: from here on, senders
                    // observe InvalidPid. Whatever is still queued is
                    // discarded with the mailbox. `next` is never invoked.
                    self.inner.registry.write().await.remove(&pid);
                    debug!(actor = %pid, "actor terminated");
                    break;
                }
            }
        }
        self.inner.live.send_modify(|live| *live -= 1);
    }
}
