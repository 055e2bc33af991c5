use serde::{Deserialize, Serialize};

use super::super::domain::FillMetric;

const DEFAULT_PENALTY_COEFFICIENT: f64 = 0.05;
const MAX_ORDERED_WISH_LIMIT: usize = 5;

/// Run parameters for one allocation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Multi-term penalty coefficient, conventionally in [0, 1].
    #[serde(default = "AllocationConfig::default_penalty")]
    pub penalty_coefficient: f64,
    /// How many leading wish-list entries are firm ordered choices before
    /// fallback selection engages. Clamped to [0, 5].
    #[serde(default)]
    pub ordered_wish_limit: usize,
    #[serde(default)]
    pub fill_metric: FillMetric,
}

impl AllocationConfig {
    fn default_penalty() -> f64 {
        DEFAULT_PENALTY_COEFFICIENT
    }

    /// Returns a copy safe to run with: the ordered-wish limit is clamped and
    /// a non-finite penalty coefficient is replaced by the default. A run is
    /// never rejected over configuration shape.
    pub fn sanitized(&self) -> Self {
        let penalty_coefficient = if self.penalty_coefficient.is_finite() {
            self.penalty_coefficient
        } else {
            DEFAULT_PENALTY_COEFFICIENT
        };

        Self {
            penalty_coefficient,
            ordered_wish_limit: self.ordered_wish_limit.min(MAX_ORDERED_WISH_LIMIT),
            fill_metric: self.fill_metric,
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            penalty_coefficient: DEFAULT_PENALTY_COEFFICIENT,
            ordered_wish_limit: 0,
            fill_metric: FillMetric::Rate,
        }
    }
}
