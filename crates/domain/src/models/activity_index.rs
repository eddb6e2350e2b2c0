//! Derived player-engagement score.

use serde::{Deserialize, Serialize};

/// Categorical engagement group derived from an [`ActivityIndex`] score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityGroup {
    Active,
    Regular,
    Irregular,
    Inactive,
}

impl ActivityGroup {
    pub fn label(self) -> &'static str {
        match self {
            ActivityGroup::Active => "Active",
            ActivityGroup::Regular => "Regular",
            ActivityGroup::Irregular => "Irregular",
            ActivityGroup::Inactive => "Inactive",
        }
    }
}

/// Derived, never stored, engagement score in `[0, 5]`.
///
/// Computed by [`crate::services::activity::activity_index`] from recent
/// session count, recency of the last session, and playtime against the
/// configured active-play threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityIndex {
    pub score: f64,
}

impl ActivityIndex {
    /// Group breakpoints are fixed; only the score computation is
    /// configurable through the active-play threshold.
    pub fn group(self) -> ActivityGroup {
        if self.score >= 3.0 {
            ActivityGroup::Active
        } else if self.score >= 1.5 {
            ActivityGroup::Regular
        } else if self.score >= 0.5 {
            ActivityGroup::Irregular
        } else {
            ActivityGroup::Inactive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_map_to_groups() {
        assert_eq!(ActivityIndex { score: 5.0 }.group(), ActivityGroup::Active);
        assert_eq!(ActivityIndex { score: 3.0 }.group(), ActivityGroup::Active);
        assert_eq!(ActivityIndex { score: 2.0 }.group(), ActivityGroup::Regular);
        assert_eq!(
            ActivityIndex { score: 0.5 }.group(),
            ActivityGroup::Irregular
        );
        assert_eq!(
            ActivityIndex { score: 0.49 }.group(),
            ActivityGroup::Inactive
        );
    }
}
