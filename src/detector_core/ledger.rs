//! Bounded per-user purchase history keyed by a global ingestion counter

use super::user_store::{PurchaseRecord, UserId, UserStore};

/// Appends purchases with a process-wide monotonically increasing sequence
///
/// Sequence numbers are assigned at ingestion time, independent of the logged
/// timestamp, so relative recency is gap-free even when timestamps collide.
#[derive(Debug)]
pub struct PurchaseLedger {
    next_seq: u64,
    capacity: usize,
}

impl PurchaseLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            next_seq: 0,
            capacity,
        }
    }

    /// Record a validated, non-negative amount and return its sequence number
    ///
    /// The oldest entry is evicted once the history exceeds `capacity`.
    pub fn record(&mut self, users: &mut UserStore, user: UserId, amount: f64) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        let history = &mut users.ensure_user(user).purchases;
        history.push_back(PurchaseRecord::new(seq, amount));
        while history.len() > self.capacity {
            history.pop_front();
        }

        seq
    }

    /// Number of purchases recorded so far
    pub fn recorded(&self) -> u64 {
        self.next_seq
    }
}
