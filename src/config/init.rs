use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{TimeZone, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::model::{Event, EventAttachment, RankList, SolveStat, User};
use crate::store::{ClubData, Registry};

/// Create a starter config file and data directory without prompting.
///
/// Refuses to overwrite an existing config or an already-initialized data
/// directory unless `force` is set. With `demo`, the data directory is
/// seeded with a small rank list so every command has something to show.
pub fn run_init(
    config_path: Option<PathBuf>,
    data_dir: PathBuf,
    demo: bool,
    force: bool,
) -> Result<()> {
    let config_path = config_path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    let registry = Registry::open(&data_dir);
    if registry.is_initialized() && !force {
        anyhow::bail!(
            "Data directory already initialized at {}. Pass --force to overwrite.",
            data_dir.display()
        );
    }

    let config = Config {
        data_dir: Some(data_dir.display().to_string()),
        default_rank_list: demo.then(|| "intro-2025".to_string()),
    };
    write_config(&config_path, &config)?;

    let data = if demo { demo_data() } else { ClubData::empty() };
    registry.write(&data)?;

    println!("Config written to {}", config_path.display());
    println!("Data directory ready at {}", data_dir.display());
    if demo {
        println!("Seeded demo records. Try `clubrank recompute intro-2025`.");
    } else {
        println!("Drop the platform's export files into the data directory to get started.");
    }

    Ok(())
}

fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to serialize config")?;
    file.commit()
        .with_context(|| format!("Failed to write config to {}", path.display()))
}

/// The demo data set written by `init --demo`. Small but exercises every
/// scoring rule: a strict event with a missed attendance, a lax event, and
/// a member with no stats at all.
pub fn demo_data() -> ClubData {
    ClubData {
        rank_lists: vec![RankList {
            id: 1,
            keyword: "intro-2025".to_string(),
            title: "Intro Track 2025".to_string(),
            upsolve_weight: 0.25,
            consider_strict_attendance: true,
            events: vec![
                EventAttachment {
                    event_id: 10,
                    weight: 2.0,
                },
                EventAttachment {
                    event_id: 11,
                    weight: 1.0,
                },
            ],
            members: vec![100, 101, 102],
        }],
        events: vec![
            Event {
                id: 10,
                title: "Weekly Contest 1".to_string(),
                starting_at: Utc.with_ymd_and_hms(2025, 9, 12, 14, 30, 0).unwrap(),
                strict_attendance: true,
                attendees: vec![100],
            },
            Event {
                id: 11,
                title: "Practice Session 1".to_string(),
                starting_at: Utc.with_ymd_and_hms(2025, 9, 19, 14, 30, 0).unwrap(),
                strict_attendance: false,
                attendees: vec![],
            },
        ],
        users: vec![
            User {
                id: 100,
                handle: "alice".to_string(),
                name: Some("Alice A.".to_string()),
            },
            User {
                id: 101,
                handle: "bob".to_string(),
                name: None,
            },
            User {
                id: 102,
                handle: "carol".to_string(),
                name: None,
            },
        ],
        stats: vec![
            SolveStat {
                event_id: 10,
                user_id: 100,
                solve_count: 5,
                upsolve_count: 2,
                participation: true,
            },
            SolveStat {
                event_id: 10,
                user_id: 101,
                solve_count: 5,
                upsolve_count: 2,
                participation: false,
            },
            SolveStat {
                event_id: 11,
                user_id: 100,
                solve_count: 3,
                upsolve_count: 0,
                participation: true,
            },
        ],
    }
}
