pub mod engine;
pub mod snapshot;

pub use engine::{score_user, EventContribution, ScoreResult};
pub use snapshot::{RankListSnapshot, StatCounts, WeightedEvent};
