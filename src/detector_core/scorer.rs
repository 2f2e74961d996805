//! Mean / standard-deviation threshold scoring for purchases

use super::event::Purchase;
use super::user_store::PurchaseRecord;
use serde::Serialize;

/// Fewer window entries than this cannot estimate spread
pub const MIN_WINDOW_LEN: usize = 2;

/// Purchase enriched with the neighborhood statistics that flagged it
///
/// Field order is the output key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedPurchase {
    pub event_type: &'static str,
    pub timestamp: serde_json::Value,
    pub id: serde_json::Value,
    pub amount: serde_json::Value,
    pub mean: String,
    pub sd: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Flagged(FlaggedPurchase),
    NotFlagged,
    InsufficientData { window_len: usize },
}

impl Verdict {
    pub fn is_flagged(&self) -> bool {
        matches!(self, Verdict::Flagged(_))
    }

    pub fn flagged(self) -> Option<FlaggedPurchase> {
        match self {
            Verdict::Flagged(f) => Some(f),
            _ => None,
        }
    }
}

pub struct AnomalyScorer {
    sd_multiplier: f64,
}

impl AnomalyScorer {
    pub fn new(sd_multiplier: f64) -> Self {
        Self { sd_multiplier }
    }

    /// Threshold at mean + 3 standard deviations
    pub fn with_defaults() -> Self {
        Self::new(3.0)
    }

    /// Score a purchase against the recent purchases of its neighborhood
    ///
    /// # Returns
    /// - `InsufficientData` when the window holds fewer than two purchases
    /// - `Flagged` when `amount >= mean + k * sd` (population sd)
    /// - `NotFlagged` otherwise
    pub fn evaluate(&self, purchase: &Purchase, window: &[PurchaseRecord]) -> Verdict {
        if window.len() < MIN_WINDOW_LEN {
            return Verdict::InsufficientData {
                window_len: window.len(),
            };
        }

        let amounts: Vec<f64> = window.iter().map(|r| r.amount).collect();
        let (mean, sd) = mean_std(&amounts);
        let threshold = mean + self.sd_multiplier * sd;

        if purchase.amount >= threshold {
            Verdict::Flagged(FlaggedPurchase {
                event_type: "purchase",
                timestamp: purchase.timestamp.clone(),
                id: purchase.raw_id.clone(),
                amount: purchase.raw_amount.clone(),
                mean: format!("{:.2}", mean),
                sd: format!("{:.2}", sd),
            })
        } else {
            Verdict::NotFlagged
        }
    }
}

/// Arithmetic mean and population standard deviation (divisor n)
pub fn mean_std(vals: &[f64]) -> (f64, f64) {
    if vals.is_empty() {
        return (0.0, 0.0);
    }
    let n = vals.len() as f64;
    let sum: f64 = vals.iter().sum();
    let mean = sum / n;
    let sq_diff: f64 = vals.iter().map(|v| (v - mean).powi(2)).sum();
    let std = (sq_diff / n).sqrt();
    (mean, std)
}
