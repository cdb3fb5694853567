pub mod types;

pub use types::{
    Event, EventAttachment, EventId, RankList, RankListId, SolveStat, User, UserId,
};
