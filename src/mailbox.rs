//! Per-actor message buffer with priority, regular, and stash partitions.
//!
//! All three partitions and the parked-consumer flag live behind a single
//! `parking_lot::Mutex`; a `tokio::sync::Notify` beside the lock carries at
//! most one pending wakeup. The flag is flipped under the same lock that
//! guards the queues, so an enqueue racing with a parking consumer cannot
//! lose its wakeup: a token posted before the consumer awaits is held by
//! the `Notify` until consumed.
//!
//! Exactly one consumer may call [`dequeue`](Mailbox::dequeue),
//! [`stash`](Mailbox::stash), and [`unstash`](Mailbox::unstash). That is a
//! contract, not something the type enforces. Producers may call the
//! enqueue methods from any number of tasks concurrently.

use crate::error::SendError;
use crate::queue::Queue;
use parking_lot::Mutex;
use tokio::sync::Notify;

struct MailboxState<M> {
    priority: Queue<M>,
    regular: Queue<M>,
    stash: Queue<M>,
    /// Regular-partition bound; 0 means unbounded. Never applies to the
    /// priority or stash partitions.
    limit: usize,
    consumer_parked: bool,
}

pub struct Mailbox<M> {
    state: Mutex<MailboxState<M>>,
    wakeup: Notify,
}

impl<M> Mailbox<M> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MailboxState {
                priority: Queue::new(),
                regular: Queue::new(),
                stash: Queue::new(),
                limit: 0,
                consumer_parked: false,
            }),
            wakeup: Notify::new(),
        }
    }

    /// Bound the regular partition to `limit` messages. Zero is ignored and
    /// the partition stays unbounded. Priority and stashed messages are
    /// never limited.
    pub fn set_limit(&self, limit: usize) {
        if limit > 0 {
            self.state.lock().limit = limit;
        }
    }

    /// Append to the regular partition, waking a parked consumer.
    ///
    /// Fails with [`SendError::MailboxFull`] when a finite limit is set and
    /// the regular partition already holds that many messages.
    pub fn enqueue(&self, msg: M) -> Result<(), SendError> {
        let mut state = self.state.lock();
        if state.limit != 0 && state.regular.len() == state.limit {
            return Err(SendError::MailboxFull);
        }
        state.regular.enqueue(msg);
        self.wake(&mut state);
        Ok(())
    }

    /// Append to the priority partition, waking a parked consumer.
    ///
    /// Priority messages are dequeued before any regular message but stay
    /// FIFO among themselves. Never fails: the capacity bound does not
    /// apply here.
    pub fn enqueue_front(&self, msg: M) {
        let mut state = self.state.lock();
        state.priority.enqueue(msg);
        self.wake(&mut state);
    }

    /// Move `msg` to the stash partition. Consumer-side only; never blocks,
    /// never fails.
    pub fn stash(&self, msg: M) {
        self.state.lock().stash.enqueue(msg);
    }

    /// Splice all stashed messages onto the front of the regular partition,
    /// in their original stash order. Consumer-side only; no wakeup is
    /// posted because the caller is the one consumer that could be parked.
    pub fn unstash(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.regular.move_from(&mut state.stash);
    }

    /// Take the next message, suspending while the mailbox is empty.
    ///
    /// Selection order: priority front, then regular front. Stashed
    /// messages only become deliverable through [`unstash`](Self::unstash).
    pub async fn dequeue(&self) -> M {
        loop {
            {
                let mut state = self.state.lock();
                if let Some(msg) = state.priority.dequeue() {
                    return msg;
                }
                if let Some(msg) = state.regular.dequeue() {
                    return msg;
                }
                state.consumer_parked = true;
            }
            // The lock is released before awaiting; a token posted in the
            // meantime is consumed immediately.
            self.wakeup.notified().await;
        }
    }

    fn wake(&self, state: &mut MailboxState<M>) {
        if state.consumer_parked {
            state.consumer_parked = false;
            self.wakeup.notify_one();
        }
    }
}

impl<M> Default for Mailbox<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn enqueue_dequeue() {
        let mb = Mailbox::new();
        mb.enqueue("msg1").unwrap();
        assert_eq!(mb.dequeue().await, "msg1");
    }

    #[tokio::test]
    async fn regular_messages_are_fifo() {
        let mb = Mailbox::new();
        mb.enqueue("msg1").unwrap();
        mb.enqueue("msg2").unwrap();
        mb.enqueue("msg3").unwrap();
        assert_eq!(mb.dequeue().await, "msg1");
        assert_eq!(mb.dequeue().await, "msg2");
        assert_eq!(mb.dequeue().await, "msg3");
    }

    #[tokio::test]
    async fn priority_precedes_pending_regular() {
        let mb = Mailbox::new();
        mb.enqueue("msg1").unwrap();
        mb.enqueue("msg2").unwrap();
        mb.enqueue_front("important!");
        assert_eq!(mb.dequeue().await, "important!");
        assert_eq!(mb.dequeue().await, "msg1");
        assert_eq!(mb.dequeue().await, "msg2");
    }

    #[tokio::test]
    async fn priority_messages_stay_fifo_among_themselves() {
        let mb = Mailbox::new();
        mb.enqueue("regular").unwrap();
        mb.enqueue_front("first");
        mb.enqueue_front("second");
        assert_eq!(mb.dequeue().await, "first");
        assert_eq!(mb.dequeue().await, "second");
        assert_eq!(mb.dequeue().await, "regular");
    }

    #[tokio::test]
    async fn stash_then_unstash_redelivers_in_stash_order() {
        let mb = Mailbox::new();
        mb.enqueue("msg1").unwrap();
        mb.enqueue("msg2").unwrap();
        mb.enqueue("msg3").unwrap();

        let msg = mb.dequeue().await;
        assert_eq!(msg, "msg1");
        mb.stash(msg);

        let msg = mb.dequeue().await;
        assert_eq!(msg, "msg2");
        mb.unstash();

        // Stashed msg1 comes back ahead of the still-queued msg3.
        assert_eq!(mb.dequeue().await, "msg1");
        assert_eq!(mb.dequeue().await, "msg3");
    }

    #[tokio::test]
    async fn limit_bounds_regular_but_not_priority() {
        let mb = Mailbox::new();
        mb.set_limit(2);
        mb.enqueue("msg1").unwrap();
        mb.enqueue("msg2").unwrap();
        assert_eq!(mb.enqueue("msg3"), Err(SendError::MailboxFull));

        mb.enqueue_front("important!");

        assert_eq!(mb.dequeue().await, "important!");
        assert_eq!(mb.dequeue().await, "msg1");
        assert_eq!(mb.dequeue().await, "msg2");
    }

    #[tokio::test]
    async fn zero_limit_stays_unbounded() {
        let mb = Mailbox::new();
        mb.set_limit(0);
        for i in 0..64 {
            mb.enqueue(i).unwrap();
        }
        assert_eq!(mb.dequeue().await, 0);
    }

    async fn wait_until_parked<M>(mb: &Mailbox<M>) {
        while !mb.state.lock().consumer_parked {
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn enqueue_wakes_parked_consumer() {
        let mb = Arc::new(Mailbox::new());
        let consumer = {
            let mb = Arc::clone(&mb);
            tokio::spawn(async move { mb.dequeue().await })
        };

        wait_until_parked(&mb).await;
        mb.enqueue("hello!").unwrap();

        let msg = timeout(Duration::from_secs(5), consumer)
            .await
            .expect("dequeue did not wake up")
            .expect("consumer task panicked");
        assert_eq!(msg, "hello!");
    }

    #[tokio::test]
    async fn enqueue_front_wakes_parked_consumer() {
        let mb = Arc::new(Mailbox::new());
        let consumer = {
            let mb = Arc::clone(&mb);
            tokio::spawn(async move { mb.dequeue().await })
        };

        wait_until_parked(&mb).await;
        mb.enqueue_front("hello!");

        let msg = timeout(Duration::from_secs(5), consumer)
            .await
            .expect("dequeue did not wake up")
            .expect("consumer task panicked");
        assert_eq!(msg, "hello!");
    }
}
