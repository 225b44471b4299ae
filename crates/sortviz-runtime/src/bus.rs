//! Fan-out of session events to any number of channel subscribers.
//!
//! Each subscriber owns the receiving end of an unbounded channel.
//! Dropping the receiver unsubscribes; dead senders are pruned on the next
//! publish.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::event::SessionEvent;

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<SessionEvent>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. It sees events published from now on.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, in registration order.
    pub fn publish(&self, event: SessionEvent) {
        let mut subscribers = self.lock();
        let Some((last, rest)) = subscribers.split_last() else {
            return;
        };
        let mut dead = Vec::new();
        for (index, tx) in rest.iter().enumerate() {
            if tx.send(event.clone()).is_err() {
                dead.push(index);
            }
        }
        if last.send(event).is_err() {
            dead.push(rest.len());
        }
        for index in dead.into_iter().rev() {
            subscribers.remove(index);
        }
    }

    /// Registered subscribers, including any dropped since the last publish.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<SessionEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
