//! Top-T merge of recent purchases across a neighborhood

use super::user_store::{PurchaseRecord, UserId, UserStore};
use std::collections::VecDeque;

pub struct NeighborhoodCollector {
    capacity: usize,
}

impl NeighborhoodCollector {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Collect the `capacity` most recent purchases made by `neighbors`
    ///
    /// Online k-way merge into a window kept ascending by sequence number.
    /// Each history is scanned newest first; once the window is full, the
    /// first entry older than everything retained ends that neighbor's scan.
    ///
    /// # Returns
    /// At most `capacity` records, ascending by sequence number
    pub fn collect_top_t<'a, I>(&self, users: &UserStore, neighbors: I) -> Vec<PurchaseRecord>
    where
        I: IntoIterator<Item = &'a UserId>,
    {
        if self.capacity == 0 {
            return Vec::new();
        }
        let mut window: VecDeque<PurchaseRecord> = VecDeque::with_capacity(self.capacity + 1);

        for id in neighbors {
            let Some(history) = users.history(*id) else {
                continue;
            };

            for record in history.iter().rev().take(self.capacity) {
                let index = window.partition_point(|kept| kept.seq < record.seq);

                if window.len() < self.capacity {
                    window.insert(index, *record);
                } else if index == 0 {
                    // Older than the oldest retained; the rest of this history is older still
                    break;
                } else {
                    window.insert(index, *record);
                    window.pop_front();
                }
            }
        }

        window.into()
    }
}
