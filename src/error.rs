//! Routing failures surfaced to senders.

use crate::actor::Pid;

/// The closed set of failures a send can report.
///
/// Control signals (terminate, stash) are not errors; they travel in
/// [`Control`](crate::Control) and are interpreted by the execution loop,
/// never by senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The target Pid was never spawned or its actor has already terminated.
    #[error("no live actor registered for {0}")]
    InvalidPid(Pid),

    /// The recipient's regular partition is at its configured bound.
    /// Priority sends bypass the bound and cannot fail this way.
    #[error("mailbox full")]
    MailboxFull,
}

impl SendError {
    /// Whether retrying the same send later could succeed.
    ///
    /// A full mailbox can drain; a dead Pid never comes back.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SendError::MailboxFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(SendError::MailboxFull.is_retryable());
        assert!(!SendError::InvalidPid(Pid::INVALID).is_retryable());
    }

    #[test]
    fn display_names_the_pid() {
        let err = SendError::InvalidPid(Pid::from_raw(7));
        assert!(err.to_string().contains("actor-7"));
    }
}
