//! Friendship mutations and bounded-depth neighborhood discovery

use super::user_store::{UserId, UserStore};
use std::collections::{HashMap, HashSet, VecDeque};

pub struct SocialGraph;

impl SocialGraph {
    pub fn new() -> Self {
        Self
    }

    /// Add a symmetric edge between two users, creating them if needed
    ///
    /// Re-befriending an existing pair leaves both friend sets unchanged.
    pub fn befriend(&self, users: &mut UserStore, id1: UserId, id2: UserId) {
        if id1 == id2 {
            users.ensure_user(id1);
            return;
        }

        users.ensure_user(id1).friends.insert(id2);
        users.ensure_user(id2).friends.insert(id1);
    }

    /// Remove the edge between two users if present, creating them if needed
    pub fn unfriend(&self, users: &mut UserStore, id1: UserId, id2: UserId) {
        users.ensure_user(id1).friends.remove(&id2);
        users.ensure_user(id2).friends.remove(&id1);
    }

    /// All users reachable from `root` within `max_depth` hops, excluding `root`
    ///
    /// Breadth-first: each node keeps its first-discovery depth and nodes at
    /// `max_depth` are included but never expanded.
    pub fn neighborhood(&self, users: &UserStore, root: UserId, max_depth: usize) -> HashSet<UserId> {
        let mut depths: HashMap<UserId, usize> = HashMap::new();
        let mut frontier: VecDeque<UserId> = VecDeque::new();

        depths.insert(root, 0);
        frontier.push_back(root);

        while let Some(current) = frontier.pop_front() {
            let next_depth = depths[&current] + 1;
            if next_depth > max_depth {
                continue;
            }

            let Some(friends) = users.friends(current) else {
                continue;
            };

            for &friend in friends {
                if depths.contains_key(&friend) {
                    continue;
                }
                depths.insert(friend, next_depth);
                if next_depth < max_depth {
                    frontier.push_back(friend);
                }
            }
        }

        depths.remove(&root);
        depths.into_keys().collect()
    }
}

impl Default for SocialGraph {
    fn default() -> Self {
        Self::new()
    }
}
