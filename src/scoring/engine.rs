use super::snapshot::{RankListSnapshot, WeightedEvent};
use crate::model::{EventId, UserId};

/// One event's contribution to a user's composite score.
#[derive(Debug, Clone)]
pub struct EventContribution {
    pub event_id: EventId,
    pub weight: f64,
    pub solve_count: u32,
    pub upsolve_count: u32,
    /// False only when the rank list considers strict attendance, the event
    /// is strict, and the user is not a recorded attendee.
    pub attendance_satisfied: bool,
    pub contribution: f64,
}

/// A user's composite score with its per-event breakdown.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub total: f64,
    pub events: Vec<EventContribution>,
}

/// Compute one member's composite score over the snapshot's attached events.
///
/// Events without a stat row contribute 0. Summation follows attachment
/// order. All arithmetic is f64 with no intermediate rounding.
pub fn score_user(snapshot: &RankListSnapshot, user_id: UserId) -> ScoreResult {
    let mut total = 0.0;
    let mut events = Vec::with_capacity(snapshot.events().len());

    for event in snapshot.events() {
        let contribution = event_contribution(snapshot, user_id, event);
        total += contribution.contribution;
        events.push(contribution);
    }

    ScoreResult { total, events }
}

fn event_contribution(
    snapshot: &RankListSnapshot,
    user_id: UserId,
    event: &WeightedEvent,
) -> EventContribution {
    let (solve_count, upsolve_count) = match snapshot.stat(user_id, event.event_id) {
        Some(stat) => (stat.solve_count, stat.upsolve_count),
        None => (0, 0),
    };

    let attendance_satisfied = snapshot.attendance_satisfied(user_id, event);
    let w = event.weight;
    let u = snapshot.upsolve_weight;

    let contribution = if attendance_satisfied {
        f64::from(solve_count) * w + f64::from(upsolve_count) * w * u
    } else {
        // Attendance missed on a strict event: every solve counts as upsolve.
        f64::from(solve_count + upsolve_count) * w * u
    };

    EventContribution {
        event_id: event.event_id,
        weight: w,
        solve_count,
        upsolve_count,
        attendance_satisfied,
        contribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, EventAttachment, RankList, SolveStat, User};
    use crate::store::ClubData;
    use chrono::Utc;

    fn sample_event(id: EventId, strict: bool, attendees: Vec<UserId>) -> Event {
        Event {
            id,
            title: format!("Contest {}", id),
            starting_at: Utc::now(),
            strict_attendance: strict,
            attendees,
        }
    }

    fn sample_user(id: UserId, handle: &str) -> User {
        User {
            id,
            handle: handle.to_string(),
            name: None,
        }
    }

    fn sample_list(
        upsolve_weight: f64,
        consider_strict: bool,
        events: Vec<(EventId, f64)>,
        members: Vec<UserId>,
    ) -> RankList {
        RankList {
            id: 1,
            keyword: "intro-2025".to_string(),
            title: "Intro Track 2025".to_string(),
            upsolve_weight,
            consider_strict_attendance: consider_strict,
            events: events
                .into_iter()
                .map(|(event_id, weight)| EventAttachment { event_id, weight })
                .collect(),
            members,
        }
    }

    fn snapshot_of(data: &ClubData) -> RankListSnapshot {
        RankListSnapshot::assemble(&data.rank_lists[0], data)
    }

    #[test]
    fn test_strict_attendance_missed_reallocates_to_upsolve() {
        // 5 solves, 2 upsolves, w=2, u=0.25, not an attendee:
        // (5 + 2) * 2 * 0.25 = 3.5
        let data = ClubData {
            rank_lists: vec![sample_list(0.25, true, vec![(10, 2.0)], vec![100])],
            events: vec![sample_event(10, true, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![SolveStat {
                event_id: 10,
                user_id: 100,
                solve_count: 5,
                upsolve_count: 2,
                participation: false,
            }],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.total, 3.5);
        assert!(!result.events[0].attendance_satisfied);
    }

    #[test]
    fn test_strict_attendance_satisfied_scores_normally() {
        // Same stats but the user attended: 5*2 + 2*2*0.25 = 11
        let data = ClubData {
            rank_lists: vec![sample_list(0.25, true, vec![(10, 2.0)], vec![100])],
            events: vec![sample_event(10, true, vec![100])],
            users: vec![sample_user(100, "alice")],
            stats: vec![SolveStat {
                event_id: 10,
                user_id: 100,
                solve_count: 5,
                upsolve_count: 2,
                participation: true,
            }],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.total, 11.0);
        assert!(result.events[0].attendance_satisfied);
    }

    #[test]
    fn test_strict_event_ignored_when_list_does_not_consider() {
        let data = ClubData {
            rank_lists: vec![sample_list(0.25, false, vec![(10, 2.0)], vec![100])],
            events: vec![sample_event(10, true, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![SolveStat {
                event_id: 10,
                user_id: 100,
                solve_count: 5,
                upsolve_count: 2,
                participation: false,
            }],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.total, 11.0);
    }

    #[test]
    fn test_multi_event_summation() {
        // Event A: w=1, 2 solves -> 2. Event B: w=3, 4 upsolves, u=0.5 -> 6.
        let data = ClubData {
            rank_lists: vec![sample_list(0.5, false, vec![(10, 1.0), (11, 3.0)], vec![100])],
            events: vec![sample_event(10, false, vec![]), sample_event(11, false, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![
                SolveStat {
                    event_id: 10,
                    user_id: 100,
                    solve_count: 2,
                    upsolve_count: 0,
                    participation: true,
                },
                SolveStat {
                    event_id: 11,
                    user_id: 100,
                    solve_count: 0,
                    upsolve_count: 4,
                    participation: true,
                },
            ],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.total, 8.0);
        assert_eq!(result.events[0].contribution, 2.0);
        assert_eq!(result.events[1].contribution, 6.0);
    }

    #[test]
    fn test_missing_stat_row_contributes_zero() {
        let data = ClubData {
            rank_lists: vec![sample_list(0.5, false, vec![(10, 7.0), (11, 3.0)], vec![100])],
            events: vec![sample_event(10, false, vec![]), sample_event(11, false, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![SolveStat {
                event_id: 11,
                user_id: 100,
                solve_count: 1,
                upsolve_count: 0,
                participation: true,
            }],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.events[0].contribution, 0.0);
        assert_eq!(result.total, 3.0);
    }

    #[test]
    fn test_no_stats_at_all_scores_zero() {
        let data = ClubData {
            rank_lists: vec![sample_list(0.5, false, vec![(10, 2.0)], vec![100])],
            events: vec![sample_event(10, false, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn test_zero_upsolve_weight_discards_upsolves() {
        let data = ClubData {
            rank_lists: vec![sample_list(0.0, false, vec![(10, 2.0)], vec![100])],
            events: vec![sample_event(10, false, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![SolveStat {
                event_id: 10,
                user_id: 100,
                solve_count: 3,
                upsolve_count: 7,
                participation: true,
            }],
        };

        let result = score_user(&snapshot_of(&data), 100);
        assert_eq!(result.total, 6.0);
    }

    #[test]
    fn test_breakdown_follows_attachment_order() {
        let data = ClubData {
            rank_lists: vec![sample_list(0.5, false, vec![(11, 1.0), (10, 1.0)], vec![100])],
            events: vec![sample_event(10, false, vec![]), sample_event(11, false, vec![])],
            users: vec![sample_user(100, "alice")],
            stats: vec![],
        };

        let result = score_user(&snapshot_of(&data), 100);
        let ids: Vec<EventId> = result.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![11, 10]);
    }
}
