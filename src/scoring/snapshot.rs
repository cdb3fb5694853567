use std::collections::{HashMap, HashSet};

use crate::model::{EventId, RankList, RankListId, UserId};
use crate::store::ClubData;

/// An event attached to the rank list, in attachment order.
#[derive(Debug, Clone)]
pub struct WeightedEvent {
    pub event_id: EventId,
    /// The event's weight within this rank list (pivot weight).
    pub weight: f64,
    pub strict_attendance: bool,
}

/// Solve counts for one (user, event) pair.
#[derive(Debug, Clone, Copy)]
pub struct StatCounts {
    pub solve_count: u32,
    pub upsolve_count: u32,
}

/// Everything the scoring engine reads, assembled up front.
///
/// A score is a pure function of this snapshot: attached events with weights,
/// stat rows for enrolled members, and (when strict attendance is considered)
/// the attendee sets of strict events. Nothing touches the store once a
/// snapshot exists.
pub struct RankListSnapshot {
    pub rank_list_id: RankListId,
    pub upsolve_weight: f64,
    pub consider_strict_attendance: bool,
    events: Vec<WeightedEvent>,
    members: Vec<UserId>,
    stats: HashMap<(UserId, EventId), StatCounts>,
    attendance: HashSet<(UserId, EventId)>,
}

impl RankListSnapshot {
    /// Assemble the snapshot for one rank list.
    ///
    /// Stat rows are restricted to (enrolled member x attached event) pairs.
    /// The attendance set is populated only when the rank list considers
    /// strict attendance, and only for events flagged strict.
    pub fn assemble(list: &RankList, data: &ClubData) -> Self {
        let events: Vec<WeightedEvent> = list
            .events
            .iter()
            .map(|attachment| WeightedEvent {
                event_id: attachment.event_id,
                weight: attachment.weight,
                strict_attendance: data
                    .event(attachment.event_id)
                    .map(|event| event.strict_attendance)
                    .unwrap_or(false),
            })
            .collect();

        let member_set: HashSet<UserId> = list.members.iter().copied().collect();
        let event_ids: HashSet<EventId> = events.iter().map(|e| e.event_id).collect();

        let mut stats = HashMap::new();
        for stat in &data.stats {
            if member_set.contains(&stat.user_id) && event_ids.contains(&stat.event_id) {
                stats.insert(
                    (stat.user_id, stat.event_id),
                    StatCounts {
                        solve_count: stat.solve_count,
                        upsolve_count: stat.upsolve_count,
                    },
                );
            }
        }

        let mut attendance = HashSet::new();
        if list.consider_strict_attendance {
            for event in &events {
                if !event.strict_attendance {
                    continue;
                }
                if let Some(full) = data.event(event.event_id) {
                    for attendee in &full.attendees {
                        if member_set.contains(attendee) {
                            attendance.insert((*attendee, event.event_id));
                        }
                    }
                }
            }
        }

        Self {
            rank_list_id: list.id,
            upsolve_weight: list.upsolve_weight,
            consider_strict_attendance: list.consider_strict_attendance,
            events,
            members: list.members.clone(),
            stats,
            attendance,
        }
    }

    /// Attached events in attachment order; also the summation order.
    pub fn events(&self) -> &[WeightedEvent] {
        &self.events
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// The stat row for (user, event), if one exists. Absent means zero
    /// activity for that event.
    pub fn stat(&self, user_id: UserId, event_id: EventId) -> Option<StatCounts> {
        self.stats.get(&(user_id, event_id)).copied()
    }

    /// Whether the user's in-window solves count as solves for this event:
    /// strict attendance is not considered, the event is not strict, or the
    /// user is a recorded attendee.
    pub fn attendance_satisfied(&self, user_id: UserId, event: &WeightedEvent) -> bool {
        !self.consider_strict_attendance
            || !event.strict_attendance
            || self.attendance.contains(&(user_id, event.event_id))
    }
}
