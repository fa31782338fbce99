use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type RewardId = Uuid;

/// A savings target funded from the available balance.
/// Lower `priority` values are listed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGoal {
    pub id: RewardId,
    pub title: String,
    pub goal_cents: Cents,
    /// Accumulated deposits. May exceed `goal_cents`.
    pub progress_cents: Cents,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
}

impl RewardGoal {
    pub fn new(title: impl Into<String>, goal_cents: Cents, priority: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            goal_cents,
            progress_cents: 0,
            priority,
            created_at: Utc::now(),
        }
    }

    /// Amount still missing to reach the goal, never negative.
    pub fn remaining(&self) -> Cents {
        self.goal_cents.saturating_sub(self.progress_cents).max(0)
    }

    pub fn is_reached(&self) -> bool {
        self.progress_cents >= self.goal_cents
    }

    /// Progress as a percentage of the goal. Over-funded goals report more than 100.
    pub fn percent_complete(&self) -> f64 {
        if self.goal_cents <= 0 {
            return 0.0;
        }
        self.progress_cents as f64 / self.goal_cents as f64 * 100.0
    }
}
