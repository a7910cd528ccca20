// Typewriter - rate-limited replay of the execution kernel log
//
// Text is appended in bursts as events arrive, but is revealed one character
// per tick at a fixed cadence, no matter how fast it was produced. Production
// and consumption are decoupled: the queue is unbounded and appends never wait
// for the drain.
//
//   append("abc") ──▶ pending: [a b c]        visible: ""
//   tick          ──▶ pending: [b c]          visible: "a"
//   append("d")   ──▶ pending: [b c d]        visible: "a"
//   tick          ──▶ pending: [c d]          visible: "ab"
//
// `Typewriter` is the pure queue. `TypewriterHandle` shares it between the
// session (producer) and the drain task (consumer) and lets the presentation
// layer subscribe to what gets revealed.

use crate::observer::Observers;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Delay between two revealed characters
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(4);

/// Change to the visible log, delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterUpdate {
    /// One character moved from pending to visible
    Emitted(char),
    /// Pending and visible text were both discarded
    Cleared,
}

/// FIFO of pending characters plus the text revealed so far
#[derive(Debug, Default)]
pub struct Typewriter {
    pending: VecDeque<char>,
    visible: String,
}

impl Typewriter {
    /// Enqueue text at the tail
    pub fn append(&mut self, text: &str) {
        self.pending.extend(text.chars());
    }

    /// Move exactly one character to the visible log
    pub fn tick(&mut self) -> Option<char> {
        let c = self.pending.pop_front()?;
        self.visible.push(c);
        Some(c)
    }

    /// Discard both pending and visible text
    pub fn clear(&mut self) {
        self.pending.clear();
        self.visible.clear();
    }

    pub fn visible(&self) -> &str {
        &self.visible
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Debug, Default)]
struct Shared {
    typewriter: Typewriter,
    observers: Observers<TypewriterUpdate>,
}

/// Cloneable handle to the shared typewriter
#[derive(Debug, Clone, Default)]
pub struct TypewriterHandle {
    shared: Arc<Mutex<Shared>>,
    wake: Arc<Notify>,
}

impl TypewriterHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue text and wake the drain task if it is idle
    pub fn append(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.lock().typewriter.append(text);
        self.wake.notify_one();
    }

    /// Discard everything, pending and visible
    pub fn clear(&self) {
        let mut shared = self.lock();
        shared.typewriter.clear();
        shared.observers.notify(&TypewriterUpdate::Cleared);
    }

    /// Reveal one character, notifying subscribers
    pub fn tick(&self) -> Option<char> {
        let mut shared = self.lock();
        let c = shared.typewriter.tick()?;
        shared.observers.notify(&TypewriterUpdate::Emitted(c));
        Some(c)
    }

    /// Snapshot of the visible log
    pub fn visible(&self) -> String {
        self.lock().typewriter.visible().to_string()
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.lock().typewriter.pending_len()
    }

    pub fn is_drained(&self) -> bool {
        self.lock().typewriter.is_drained()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TypewriterUpdate> {
        self.lock().observers.subscribe()
    }

    /// Drain task: one character per `cadence` while text is pending, parked
    /// until the next append otherwise. Runs until aborted.
    pub async fn run(self, cadence: Duration) {
        loop {
            if self.is_drained() {
                self.wake.notified().await;
                continue;
            }
            tokio::time::sleep(cadence).await;
            self.tick();
        }
    }

    /// Resolve once everything queued so far has been revealed
    pub async fn wait_drained(&self) {
        let mut updates = self.subscribe();
        while !self.is_drained() {
            if updates.recv().await.is_none() {
                break;
            }
        }
    }
}
