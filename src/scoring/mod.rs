pub mod engine;
pub mod group;
pub mod result;

pub use engine::{explain, score, FactorContribution, ScoreBreakdown};
pub use group::ScoreGroup;
pub use result::{Employees, ScoreResult, NOT_AVAILABLE};
