use std::fmt;

use crate::model::{RankList, UserId};
use crate::scoring::{score_user, RankListSnapshot, ScoreResult};
use crate::store::{ClubData, ScoreBoard};

/// The two recognized non-fatal reasons a recompute does no work. Anything
/// else (unreadable data, failed board save) is a fatal error surfaced by
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The rank list has no attached events.
    EmptyEventSet,
    /// A single-user recompute was requested for a user who is not enrolled.
    UserNotEnrolled(UserId),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyEventSet => {
                write!(f, "Rank list has no attached events; nothing to score.")
            }
            SkipReason::UserNotEnrolled(user_id) => {
                write!(f, "User {} is not enrolled in this rank list.", user_id)
            }
        }
    }
}

/// Result of a recompute invocation.
#[derive(Debug)]
pub struct RecomputeOutcome {
    pub message: String,
    /// How many members received a score. Zero when skipped.
    pub processed_users: usize,
    pub skipped: Option<SkipReason>,
    /// Per-event breakdown, populated by single-user recomputes.
    pub breakdown: Option<ScoreResult>,
}

impl RecomputeOutcome {
    pub fn success(&self) -> bool {
        self.skipped.is_none()
    }

    fn skip(reason: SkipReason) -> Self {
        Self {
            message: reason.to_string(),
            processed_users: 0,
            skipped: Some(reason),
            breakdown: None,
        }
    }
}

/// Recompute and upsert the composite score of every enrolled member.
///
/// The board is mutated only on success; skipped invocations leave existing
/// rows untouched. Recomputation is idempotent, so rerunning it wholesale is
/// the recovery path for any failure. Concurrent recomputes of the same rank
/// list are not coordinated here; callers serialize them.
pub fn recompute_rank_list(
    data: &ClubData,
    list: &RankList,
    board: &mut ScoreBoard,
    verbose: bool,
) -> RecomputeOutcome {
    let snapshot = RankListSnapshot::assemble(list, data);
    if !snapshot.has_events() {
        return RecomputeOutcome::skip(SkipReason::EmptyEventSet);
    }

    if verbose {
        eprintln!(
            "Scoring {} members over {} events for '{}'",
            snapshot.members().len(),
            snapshot.events().len(),
            list.keyword
        );
    }

    let members: Vec<UserId> = snapshot.members().to_vec();
    for user_id in &members {
        let result = score_user(&snapshot, *user_id);
        if verbose {
            eprintln!("  user {} -> {}", user_id, result.total);
        }
        board.upsert(list.id, *user_id, result.total);
    }

    RecomputeOutcome {
        message: format!(
            "Recomputed {} member scores for '{}'.",
            members.len(),
            list.keyword
        ),
        processed_users: members.len(),
        skipped: None,
        breakdown: None,
    }
}

/// Recompute one member's score. Enrollment is checked before the event-set
/// precondition.
pub fn recompute_user(
    data: &ClubData,
    list: &RankList,
    user_id: UserId,
    board: &mut ScoreBoard,
    verbose: bool,
) -> RecomputeOutcome {
    if !list.is_member(user_id) {
        return RecomputeOutcome::skip(SkipReason::UserNotEnrolled(user_id));
    }

    let snapshot = RankListSnapshot::assemble(list, data);
    if !snapshot.has_events() {
        return RecomputeOutcome::skip(SkipReason::EmptyEventSet);
    }

    if verbose {
        eprintln!(
            "Scoring user {} over {} events for '{}'",
            user_id,
            snapshot.events().len(),
            list.keyword
        );
    }

    let result = score_user(&snapshot, user_id);
    board.upsert(list.id, user_id, result.total);

    RecomputeOutcome {
        message: format!(
            "Recomputed score for user {} in '{}': {}",
            user_id, list.keyword, result.total
        ),
        processed_users: 1,
        skipped: None,
        breakdown: Some(result),
    }
}
