use std::collections::HashSet;

use super::registry::ClubData;

/// Validate a loaded data directory before any command uses it.
/// Returns all validation errors at once (not just the first).
pub fn validate_club_data(data: &ClubData) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut event_ids = HashSet::new();
    for event in &data.events {
        if !event_ids.insert(event.id) {
            errors.push(format!("events: duplicate id {}", event.id));
        }
    }

    let mut user_ids = HashSet::new();
    for user in &data.users {
        if !user_ids.insert(user.id) {
            errors.push(format!("users: duplicate id {}", user.id));
        }
    }

    let mut list_ids = HashSet::new();
    let mut list_keywords = HashSet::new();
    for list in &data.rank_lists {
        let label = &list.keyword;

        if !list_ids.insert(list.id) {
            errors.push(format!("rank_lists: duplicate id {}", list.id));
        }
        if !list_keywords.insert(list.keyword.to_ascii_lowercase()) {
            errors.push(format!("rank_lists: duplicate keyword '{}'", list.keyword));
        }

        if !list.upsolve_weight.is_finite()
            || !(0.0..=1.0).contains(&list.upsolve_weight)
        {
            errors.push(format!(
                "rank_lists[{}].upsolve_weight: must be within [0, 1], got {}",
                label, list.upsolve_weight
            ));
        }

        let mut attached = HashSet::new();
        for (i, attachment) in list.events.iter().enumerate() {
            if !attached.insert(attachment.event_id) {
                errors.push(format!(
                    "rank_lists[{}].events[{}]: duplicate attachment for event {}",
                    label, i, attachment.event_id
                ));
            }
            if !event_ids.contains(&attachment.event_id) {
                errors.push(format!(
                    "rank_lists[{}].events[{}]: unknown event {}",
                    label, i, attachment.event_id
                ));
            }
            if !attachment.weight.is_finite() || attachment.weight < 0.0 {
                errors.push(format!(
                    "rank_lists[{}].events[{}].weight: must be a non-negative number, got {}",
                    label, i, attachment.weight
                ));
            }
        }

        let mut members = HashSet::new();
        for member in &list.members {
            if !members.insert(*member) {
                errors.push(format!(
                    "rank_lists[{}].members: duplicate member {}",
                    label, member
                ));
            }
        }
    }

    // At most one stat row may exist per (event, user) pair.
    let mut stat_keys = HashSet::new();
    for (i, stat) in data.stats.iter().enumerate() {
        if !stat_keys.insert((stat.event_id, stat.user_id)) {
            errors.push(format!(
                "solve_stats[{}]: duplicate row for event {} / user {}",
                i, stat.event_id, stat.user_id
            ));
        }
        if !event_ids.contains(&stat.event_id) {
            errors.push(format!(
                "solve_stats[{}]: unknown event {}",
                i, stat.event_id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
