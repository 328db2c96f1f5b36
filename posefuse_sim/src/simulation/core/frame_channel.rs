// posefuse_sim/src/simulation/core/frame_channel.rs

//! A single-slot channel that always holds the newest item.
//!
//! The producer never blocks: when the consumer has not yet taken the queued
//! item, that item is drained and replaced, and the drop is counted.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::trace;

use crate::error::{Result, SimError};

pub fn latest_channel<T>() -> (LatestSender<T>, Receiver<T>) {
    let (tx, rx) = bounded(1);
    let sender = LatestSender {
        tx,
        drain: rx.clone(),
        sent: 0,
        dropped: 0,
    };
    (sender, rx)
}

#[derive(Debug)]
pub struct LatestSender<T> {
    tx: Sender<T>,
    drain: Receiver<T>,
    sent: u64,
    dropped: u64,
}

impl<T> LatestSender<T> {
    /// Queues `item`, replacing a stale one if the slot is occupied.
    pub fn send_latest(&mut self, item: T) -> Result<()> {
        let mut item = item;
        loop {
            match self.tx.try_send(item) {
                Ok(()) => {
                    self.sent += 1;
                    return Ok(());
                }
                Err(TrySendError::Full(back)) => {
                    // The consumer may take the stale item first; either way retry.
                    if self.drain.try_recv().is_ok() {
                        self.dropped += 1;
                        trace!(dropped = self.dropped, "Replaced stale item");
                    }
                    item = back;
                }
                // Only reachable once `drain` is gone.
                Err(TrySendError::Disconnected(_)) => return Err(SimError::Thread("consumer")),
            }
        }
    }

    /// Items accepted into the slot, including ones later replaced.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_only_newest() {
        let (mut tx, rx) = latest_channel();
        for i in 0..5 {
            tx.send_latest(i).unwrap();
        }
        assert_eq!(rx.try_recv().unwrap(), 4);
        assert!(rx.try_recv().is_err());
        assert_eq!(tx.sent(), 5);
        assert_eq!(tx.dropped(), 4);
    }

    #[test]
    fn test_no_drop_when_consumer_keeps_up() {
        let (mut tx, rx) = latest_channel();
        for i in 0..3 {
            tx.send_latest(i).unwrap();
            assert_eq!(rx.recv().unwrap(), i);
        }
        assert_eq!(tx.dropped(), 0);
    }
}
