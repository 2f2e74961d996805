//! Detector Core - Social-Network Purchase Anomaly Engine
//!
//! Maintains a social graph and bounded per-user purchase histories, and flags
//! purchases that are outliers against the recent purchases made inside the
//! buyer's D-hop neighborhood.
//!
//! # Architecture
//!
//! ```text
//! Event (purchase / befriend / unfriend)
//!     ↓
//! DetectionEngine::dispatch()
//!     ├─ SocialGraph (befriend, unfriend)  ┐
//!     └─ PurchaseLedger (record, evict)    ┴→ UserStore
//!     ↓  stream purchases only
//! SocialGraph::neighborhood (BFS, depth ≤ D)
//!     ↓
//! NeighborhoodCollector (top-T most recent across neighbors)
//!     ↓
//! AnomalyScorer (amount ≥ mean + 3·sd)
//! ```

pub mod collector;
pub mod engine;
pub mod event;
pub mod ledger;
pub mod scorer;
pub mod social_graph;
pub mod user_store;

pub use collector::NeighborhoodCollector;
pub use engine::{DetectionEngine, Dispatched, LineOutcome, StageTimings};
pub use event::{Event, EventError, EventKind, Friendship, InvalidEvent, Purchase, Source};
pub use ledger::PurchaseLedger;
pub use scorer::{AnomalyScorer, FlaggedPurchase, Verdict};
pub use social_graph::SocialGraph;
pub use user_store::{PurchaseRecord, User, UserId, UserStore};
