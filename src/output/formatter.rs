use std::cmp::Ordering;
use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::model::{RankList, User, UserId};
use crate::scoring::ScoreResult;
use crate::store::{ClubData, ScoreBoard};

/// One standings line: a stored score joined with the user record and stat
/// totals over the rank list's attached events.
pub struct StandingRow<'a> {
    pub user_id: UserId,
    pub user: Option<&'a User>,
    pub score: f64,
    pub solve_total: u32,
    pub upsolve_total: u32,
    /// Attached events whose stat row carries `participation = true`.
    pub present_count: usize,
}

impl StandingRow<'_> {
    fn display_name(&self) -> String {
        match self.user {
            Some(user) => user.display_name().to_string(),
            None => format!("user#{}", self.user_id),
        }
    }
}

/// Build display rows for one rank list from the stored board.
/// Sorted by score descending, user id ascending for ties.
pub fn build_standings<'a>(
    list: &RankList,
    data: &'a ClubData,
    board: &ScoreBoard,
) -> Vec<StandingRow<'a>> {
    let mut rows: Vec<StandingRow<'a>> = board
        .rows_for(list.id)
        .into_iter()
        .map(|row| {
            let mut solve_total = 0;
            let mut upsolve_total = 0;
            let mut present_count = 0;

            for attachment in &list.events {
                let stat = data
                    .stats
                    .iter()
                    .find(|s| s.user_id == row.user_id && s.event_id == attachment.event_id);
                if let Some(stat) = stat {
                    solve_total += stat.solve_count;
                    upsolve_total += stat.upsolve_count;
                    if stat.participation {
                        present_count += 1;
                    }
                }
            }

            StandingRow {
                user_id: row.user_id,
                user: data.user(row.user_id),
                score: row.score,
                solve_total,
                upsolve_total,
                present_count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.user_id.cmp(&b.user_id))
    });

    rows
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score compactly: up to two decimals, trailing zeros trimmed
/// ("11", "3.5", "0.25").
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.2}", score);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format standings as a ranked table: rank, score, user, then compact stat
/// totals ("5s 2u 1p" = solves, upsolves, events present).
/// Rank column: 3 chars, right-aligned. Score column: 7 chars, right-aligned.
pub fn format_standings_table(rows: &[StandingRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No scores recorded. Run `clubrank recompute` first.".to_string();
    }

    let term_width = get_terminal_width();
    let rank_width = 3;
    let score_width = 7;
    let separator = "  ";

    // Stat totals column is fixed-width so names stay aligned.
    let stats_width = "999s 999u 99p".len();
    let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + stats_width;

    let name_budget = match term_width {
        Some(width) if width > fixed_width + 10 => width - fixed_width,
        Some(_) => 20, // very narrow terminal
        None => usize::MAX, // pipe, don't truncate
    };

    let name_width = rows
        .iter()
        .map(|row| row.display_name().chars().count().min(name_budget))
        .max()
        .unwrap_or(0);

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            // 1-based rank, right-aligned with trailing dot
            let rank_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>width$}", format_score(row.score), width = score_width);
            let name = truncate_name(&row.display_name(), name_budget);
            let name_padded = format!("{:<width$}", name, width = name_width);
            let stats = format!(
                "{}s {}u {}p",
                row.solve_total, row.upsolve_total, row.present_count
            );

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    name_padded,
                    separator,
                    stats.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, score_padded, separator, name_padded, separator, stats
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: rank, user_id, name, score, solves, upsolves, present (no headers, no colors)
pub fn format_tsv(rows: &[StandingRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                idx + 1,
                row.user_id,
                row.display_name(),
                format_score(row.score),
                row.solve_total,
                row.upsolve_total,
                row.present_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the rank-list overview for the `lists` command, one line per list.
pub fn format_rank_lists(lists: &[&RankList], use_colors: bool) -> String {
    if lists.is_empty() {
        return "No rank lists in the data directory.".to_string();
    }

    lists
        .iter()
        .map(|list| {
            let strict = if list.consider_strict_attendance {
                ", strict attendance"
            } else {
                ""
            };
            let summary = format!(
                "{} events, {} members, upsolve x{}{}",
                list.events.len(),
                list.members.len(),
                format_score(list.upsolve_weight),
                strict
            );

            if use_colors {
                format!(
                    "{:>3}  {}  {}  {}",
                    list.id.dimmed(),
                    list.keyword.bold(),
                    list.title,
                    summary.dimmed()
                )
            } else {
                format!("{:>3}  {}  {}  {}", list.id, list.keyword, list.title, summary)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a per-event score breakdown (verbose single-user recompute).
pub fn format_breakdown(result: &ScoreResult, data: &ClubData, use_colors: bool) -> String {
    let mut lines: Vec<String> = result
        .events
        .iter()
        .map(|event| {
            let title = data
                .event(event.event_id)
                .map(|e| e.title.clone())
                .unwrap_or_else(|| format!("event {}", event.event_id));
            let attendance = if event.attendance_satisfied {
                ""
            } else {
                ", attendance missed"
            };
            let line = format!(
                "  {} (x{}): {} solves, {} upsolves{} -> {}",
                title,
                format_score(event.weight),
                event.solve_count,
                event.upsolve_count,
                attendance,
                format_score(event.contribution)
            );
            if use_colors && !event.attendance_satisfied {
                line.yellow().to_string()
            } else {
                line
            }
        })
        .collect();

    let total = format!("  Total: {}", format_score(result.total));
    if use_colors {
        lines.push(total.bold().to_string());
    } else {
        lines.push(total);
    }

    lines.join("\n")
}
