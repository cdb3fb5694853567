use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RankListId = u64;
pub type EventId = u64;
pub type UserId = u64;

/// A named, weighted collection of events and enrolled users.
///
/// Rank lists are the unit of recomputation: every enrolled member gets one
/// composite score per rank list, derived from the attached events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankList {
    pub id: RankListId,
    pub keyword: String, // short unique handle, e.g. "intro-2025"
    pub title: String,
    /// Multiplier in [0, 1] discounting upsolve activity relative to
    /// in-window solves (the "weight of upsolve").
    pub upsolve_weight: f64,
    /// When set, solves on strict-attendance events only count as solves
    /// for users recorded as attendees of that event.
    #[serde(default)]
    pub consider_strict_attendance: bool,
    /// Attached events with their per-rank-list weights, in standings order.
    #[serde(default)]
    pub events: Vec<EventAttachment>,
    /// Enrolled users. Only members receive a score row.
    #[serde(default)]
    pub members: Vec<UserId>,
}

impl RankList {
    /// Look up the attachment record for an event, if it is attached.
    pub fn attachment(&self, event_id: EventId) -> Option<&EventAttachment> {
        self.events.iter().find(|a| a.event_id == event_id)
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}

/// Rank-list/event association carrying the event's weight within the list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventAttachment {
    pub event_id: EventId,
    pub weight: f64,
}

/// A contest or class session contributing solve/upsolve activity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub starting_at: DateTime<Utc>,
    /// Whether missing attendance reclassifies in-window solves as upsolves.
    #[serde(default)]
    pub strict_attendance: bool,
    /// Recorded attendees (user ids). Only consulted for strict events.
    #[serde(default)]
    pub attendees: Vec<UserId>,
}

impl Event {
    pub fn has_attendee(&self, user_id: UserId) -> bool {
        self.attendees.contains(&user_id)
    }
}

/// Per-user, per-event solve counts produced by the platform's judge import.
///
/// At most one row exists per (event, user) pair; the registry validator
/// rejects duplicates.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolveStat {
    pub event_id: EventId,
    pub user_id: UserId,
    pub solve_count: u32,   // solved inside the event window
    pub upsolve_count: u32, // solved after the window closed
    /// Whether the judge data marked the user as a participant. Display
    /// only; scoring attendance comes from the event's attendee list.
    #[serde(default)]
    pub participation: bool,
}

impl SolveStat {
    /// Total counted activity, window placement ignored.
    pub fn total_activity(&self) -> u32 {
        self.solve_count + self.upsolve_count
    }
}

/// A club member. Only the id matters to scoring; handle and name are for
/// standings output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub handle: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// Preferred display string: full name when present, handle otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rank_list() -> RankList {
        RankList {
            id: 1,
            keyword: "intro-2025".to_string(),
            title: "Intro Track 2025".to_string(),
            upsolve_weight: 0.25,
            consider_strict_attendance: true,
            events: vec![
                EventAttachment {
                    event_id: 10,
                    weight: 1.0,
                },
                EventAttachment {
                    event_id: 11,
                    weight: 2.0,
                },
            ],
            members: vec![100, 101],
        }
    }

    #[test]
    fn test_attachment_lookup() {
        let list = sample_rank_list();
        assert_eq!(list.attachment(11).unwrap().weight, 2.0);
        assert!(list.attachment(99).is_none());
    }

    #[test]
    fn test_is_member() {
        let list = sample_rank_list();
        assert!(list.is_member(100));
        assert!(!list.is_member(999));
    }

    #[test]
    fn test_event_attendee_check() {
        let event = Event {
            id: 10,
            title: "Weekly Contest 1".to_string(),
            starting_at: Utc::now(),
            strict_attendance: true,
            attendees: vec![100],
        };
        assert!(event.has_attendee(100));
        assert!(!event.has_attendee(101));
    }

    #[test]
    fn test_total_activity() {
        let stat = SolveStat {
            event_id: 10,
            user_id: 100,
            solve_count: 5,
            upsolve_count: 2,
            participation: true,
        };
        assert_eq!(stat.total_activity(), 7);
    }

    #[test]
    fn test_display_name_falls_back_to_handle() {
        let mut user = User {
            id: 100,
            handle: "tourist".to_string(),
            name: None,
        };
        assert_eq!(user.display_name(), "tourist");
        user.name = Some("Gennady K.".to_string());
        assert_eq!(user.display_name(), "Gennady K.");
    }

    #[test]
    fn test_rank_list_parses_with_defaults() {
        // Fields like members and attendance flags may be absent in exports.
        let json = r#"{
            "id": 3,
            "keyword": "div2",
            "title": "Division 2",
            "upsolve_weight": 0.5
        }"#;
        let list: RankList = serde_json::from_str(json).unwrap();
        assert_eq!(list.id, 3);
        assert!(!list.consider_strict_attendance);
        assert!(list.events.is_empty());
        assert!(list.members.is_empty());
    }

    #[test]
    fn test_solve_stat_parses_without_participation() {
        let json = r#"{"event_id": 1, "user_id": 2, "solve_count": 3, "upsolve_count": 0}"#;
        let stat: SolveStat = serde_json::from_str(json).unwrap();
        assert!(!stat.participation);
        assert_eq!(stat.solve_count, 3);
    }
}
