// Observer fan-out - lets presentation code subscribe to state changes
//
// State owners (conversation/trace state, the typewriter) hold an `Observers`
// list and call `notify` after every mutation. Each subscriber gets its own
// unbounded channel, so a slow reader never blocks the writer. Subscribers that
// have dropped their receiver are pruned on the next notification.

use tokio::sync::mpsc;

/// List of subscribers interested in updates of type `T`
#[derive(Debug)]
pub struct Observers<T> {
    senders: Vec<mpsc::UnboundedSender<T>>,
}

impl<T: Clone> Observers<T> {
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver an update to every live subscriber
    pub fn notify(&mut self, update: &T) {
        self.senders.retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Number of live subscribers (as of the last notification)
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.senders.len()
    }
}

impl<T: Clone> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}
