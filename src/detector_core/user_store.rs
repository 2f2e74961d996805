//! Per-user state container: friend set and bounded purchase history

use std::collections::{HashMap, HashSet, VecDeque};

pub type UserId = u64;

/// A single logged purchase, ordered by its ingestion sequence number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseRecord {
    pub seq: u64,
    pub amount: f64,
}

impl PurchaseRecord {
    pub fn new(seq: u64, amount: f64) -> Self {
        Self { seq, amount }
    }
}

#[derive(Debug, Clone, Default)]
pub struct User {
    pub friends: HashSet<UserId>,
    /// Oldest first. Appended at the back, evicted from the front.
    pub purchases: VecDeque<PurchaseRecord>,
}

/// Owns every user's friend set and purchase history
#[derive(Debug, Default)]
pub struct UserStore {
    users: HashMap<UserId, User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Create an empty user for unseen ids, no-op otherwise
    pub fn ensure_user(&mut self, id: UserId) -> &mut User {
        self.users.entry(id).or_default()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// Friend set of a user, `None` if the user was never referenced
    pub fn friends(&self, id: UserId) -> Option<&HashSet<UserId>> {
        self.users.get(&id).map(|u| &u.friends)
    }

    /// Purchase history of a user, oldest first
    pub fn history(&self, id: UserId) -> Option<&VecDeque<PurchaseRecord>> {
        self.users.get(&id).map(|u| &u.purchases)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &UserId> {
        self.users.keys()
    }
}
