use serde::Serialize;
use std::fmt;

/// Lower bound (inclusive) of the High tier
pub const HIGH_THRESHOLD: u32 = 75;
/// Lower bound (inclusive) of the Mid tier
pub const MID_THRESHOLD: u32 = 40;

/// Coarse tier derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScoreGroup {
    High,
    Mid,
    Low,
}

impl ScoreGroup {
    /// Display order, best tier first
    pub const ALL: [ScoreGroup; 3] = [ScoreGroup::High, ScoreGroup::Mid, ScoreGroup::Low];

    pub fn classify(score: u32) -> Self {
        if score >= HIGH_THRESHOLD {
            ScoreGroup::High
        } else if score >= MID_THRESHOLD {
            ScoreGroup::Mid
        } else {
            ScoreGroup::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreGroup::High => "High",
            ScoreGroup::Mid => "Mid",
            ScoreGroup::Low => "Low",
        }
    }
}

impl fmt::Display for ScoreGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
