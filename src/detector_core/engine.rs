//! Detection Engine - owns graph and ledger state and routes events through it
//!
//! ```text
//! raw log line
//!     ↓  UTF-8 decode              (NotUtf8 → Rejected)
//! Event::from_jsonl()          (Malformed / Invalid → Rejected)
//!     ↓
//! DetectionEngine::apply()     (UserStore, SocialGraph, PurchaseLedger)
//!     ↓  stream purchases only
//! SocialGraph::neighborhood() → NeighborhoodCollector → AnomalyScorer
//!     ↓
//! Verdict
//! ```

use super::collector::NeighborhoodCollector;
use super::event::{Event, EventError, EventKind, InvalidEvent, Purchase, Source};
use super::ledger::PurchaseLedger;
use super::scorer::{AnomalyScorer, Verdict};
use super::social_graph::SocialGraph;
use super::user_store::UserStore;
use crate::config::Params;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Result of routing one record into the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Purchase(Purchase),
    Befriend,
    Unfriend,
    Rejected(InvalidEvent),
}

/// Result of processing one log line
#[derive(Debug)]
pub enum LineOutcome {
    Applied(EventKind),
    Scored(Verdict),
    Rejected(EventError),
}

/// Cumulative time spent in each scoring stage
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub neighborhood: Duration,
    pub collection: Duration,
    pub scoring: Duration,
}

pub struct DetectionEngine {
    params: Params,
    users: UserStore,
    ledger: PurchaseLedger,
    graph: SocialGraph,
    collector: NeighborhoodCollector,
    scorer: AnomalyScorer,
    timings: StageTimings,
}

impl DetectionEngine {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            users: UserStore::new(),
            ledger: PurchaseLedger::new(params.window),
            graph: SocialGraph::new(),
            collector: NeighborhoodCollector::new(params.window),
            scorer: AnomalyScorer::with_defaults(),
            timings: StageTimings::default(),
        }
    }

    /// Validate a parsed record and apply it to graph / ledger state
    ///
    /// Rejected records leave state untouched.
    pub fn dispatch(&mut self, record: &Value) -> Dispatched {
        match Event::from_record(record) {
            Ok(event) => {
                self.apply(&event);
                match event {
                    Event::Purchase(p) => Dispatched::Purchase(p),
                    Event::Befriend(_) => Dispatched::Befriend,
                    Event::Unfriend(_) => Dispatched::Unfriend,
                }
            }
            Err(reason) => Dispatched::Rejected(reason),
        }
    }

    /// Apply an already-validated event
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Purchase(p) => {
                self.ledger.record(&mut self.users, p.user, p.amount);
            }
            Event::Befriend(f) => self.graph.befriend(&mut self.users, f.id1, f.id2),
            Event::Unfriend(f) => self.graph.unfriend(&mut self.users, f.id1, f.id2),
        }
    }

    /// Score a purchase against its D-hop neighborhood's last T purchases
    ///
    /// Pure with respect to engine state apart from timing counters.
    pub fn flag_purchase(&mut self, purchase: &Purchase) -> Verdict {
        let started = Instant::now();
        let neighbors = self
            .graph
            .neighborhood(&self.users, purchase.user, self.params.depth);
        self.timings.neighborhood += started.elapsed();

        let started = Instant::now();
        let window = self.collector.collect_top_t(&self.users, &neighbors);
        self.timings.collection += started.elapsed();

        let started = Instant::now();
        let verdict = self.scorer.evaluate(purchase, &window);
        self.timings.scoring += started.elapsed();

        verdict
    }

    /// Decode a raw log line and hand it to `process_line`
    pub fn process_raw(&mut self, bytes: &[u8], source: Source) -> LineOutcome {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.process_line(line, source),
            Err(e) => LineOutcome::Rejected(EventError::NotUtf8(e)),
        }
    }

    /// Parse, apply and (for stream purchases) score one JSONL line
    ///
    /// Blank lines are malformed records like any other unparseable input.
    pub fn process_line(&mut self, line: &str, source: Source) -> LineOutcome {
        let record: Value = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => return LineOutcome::Rejected(EventError::Malformed(e)),
        };

        match self.dispatch(&record) {
            Dispatched::Purchase(p) if source == Source::Stream => {
                LineOutcome::Scored(self.flag_purchase(&p))
            }
            Dispatched::Purchase(_) => LineOutcome::Applied(EventKind::Purchase),
            Dispatched::Befriend => LineOutcome::Applied(EventKind::Befriend),
            Dispatched::Unfriend => LineOutcome::Applied(EventKind::Unfriend),
            Dispatched::Rejected(reason) => LineOutcome::Rejected(EventError::Invalid(reason)),
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn purchases_recorded(&self) -> u64 {
        self.ledger.recorded()
    }

    pub fn timings(&self) -> StageTimings {
        self.timings
    }
}
