use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::model::{Event, EventId, RankList, RankListId, SolveStat, User, UserId};

const RANK_LISTS_FILE: &str = "rank_lists.json";
const EVENTS_FILE: &str = "events.json";
const USERS_FILE: &str = "users.json";
const SOLVE_STATS_FILE: &str = "solve_stats.json";
const SCORES_FILE: &str = "scores.json";

/// Handle to a club data directory.
///
/// The directory is produced by the platform's export: `rank_lists.json`,
/// `events.json`, `users.json` and `solve_stats.json` are read-only inputs
/// here. The only file this tool owns is `scores.json`.
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the score board owned by this tool.
    pub fn scores_path(&self) -> PathBuf {
        self.root.join(SCORES_FILE)
    }

    /// Load the whole data directory into memory.
    ///
    /// A missing individual file is treated as an empty collection (a fresh
    /// export may not have stats yet); a missing directory is an error.
    pub fn load(&self) -> Result<ClubData> {
        if !self.root.is_dir() {
            anyhow::bail!(
                "Data directory not found at {}. Run `clubrank init` or pass --data-dir.",
                self.root.display()
            );
        }

        Ok(ClubData {
            rank_lists: self.load_collection(RANK_LISTS_FILE)?,
            events: self.load_collection(EVENTS_FILE)?,
            users: self.load_collection(USERS_FILE)?,
            stats: self.load_collection(SOLVE_STATS_FILE)?,
        })
    }

    fn load_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file =
            File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;

        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse {}: invalid JSON", path.display()))
    }

    /// Whether the directory already holds an exported data set.
    pub fn is_initialized(&self) -> bool {
        self.root.join(RANK_LISTS_FILE).exists()
    }

    /// Write every collection file, each committed atomically.
    ///
    /// Only `init` uses this, to seed a new data directory; normal operation
    /// treats the export files as read-only.
    pub fn write(&self, data: &ClubData) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create data directory {}", self.root.display()))?;

        self.write_collection(RANK_LISTS_FILE, &data.rank_lists)?;
        self.write_collection(EVENTS_FILE, &data.events)?;
        self.write_collection(USERS_FILE, &data.users)?;
        self.write_collection(SOLVE_STATS_FILE, &data.stats)?;
        Ok(())
    }

    fn write_collection<T: Serialize>(&self, name: &str, items: &[T]) -> Result<()> {
        let path = self.root.join(name);
        let mut file = AtomicWriteFile::open(&path)
            .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

        serde_json::to_writer_pretty(&mut file, items)
            .with_context(|| format!("Failed to serialize {}", name))?;

        file.commit()
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// In-memory snapshot of the data directory. All reads the aggregator needs
/// happen against this; nothing re-touches the filesystem mid-computation.
#[derive(Debug)]
pub struct ClubData {
    pub rank_lists: Vec<RankList>,
    pub events: Vec<Event>,
    pub users: Vec<User>,
    pub stats: Vec<SolveStat>,
}

impl ClubData {
    /// A data set with no records, the shape `init` writes without --demo.
    pub fn empty() -> Self {
        Self {
            rank_lists: Vec::new(),
            events: Vec::new(),
            users: Vec::new(),
            stats: Vec::new(),
        }
    }

    pub fn rank_list(&self, id: RankListId) -> Option<&RankList> {
        self.rank_lists.iter().find(|list| list.id == id)
    }

    /// Resolve a rank list from a CLI selector: a numeric id, or a keyword
    /// (case-insensitive).
    pub fn find_rank_list(&self, selector: &str) -> Option<&RankList> {
        if let Ok(id) = selector.parse::<RankListId>() {
            if let Some(list) = self.rank_list(id) {
                return Some(list);
            }
        }
        self.rank_lists
            .iter()
            .find(|list| list.keyword.eq_ignore_ascii_case(selector))
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn write_test_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        fs::write(
            dir.join("rank_lists.json"),
            r#"[{
                "id": 1,
                "keyword": "intro-2025",
                "title": "Intro Track 2025",
                "upsolve_weight": 0.25,
                "consider_strict_attendance": true,
                "events": [{"event_id": 10, "weight": 2.0}],
                "members": [100, 101]
            }]"#,
        )
        .unwrap();

        fs::write(
            dir.join("events.json"),
            r#"[{
                "id": 10,
                "title": "Weekly Contest 1",
                "starting_at": "2025-09-12T14:30:00Z",
                "strict_attendance": true,
                "attendees": [100]
            }]"#,
        )
        .unwrap();

        fs::write(
            dir.join("users.json"),
            r#"[{"id": 100, "handle": "alice"}, {"id": 101, "handle": "bob"}]"#,
        )
        .unwrap();

        fs::write(
            dir.join("solve_stats.json"),
            r#"[{"event_id": 10, "user_id": 100, "solve_count": 5, "upsolve_count": 2, "participation": true}]"#,
        )
        .unwrap();

        dir
    }

    #[test]
    fn test_load_full_directory() {
        let dir = write_test_dir("clubrank_test_registry_full");
        let data = Registry::open(&dir).load().unwrap();

        assert_eq!(data.rank_lists.len(), 1);
        assert_eq!(data.events.len(), 1);
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.stats.len(), 1);
        assert_eq!(data.rank_lists[0].events[0].weight, 2.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_empty_collection() {
        let dir = write_test_dir("clubrank_test_registry_no_stats");
        fs::remove_file(dir.join("solve_stats.json")).unwrap();

        let data = Registry::open(&dir).load().unwrap();
        assert!(data.stats.is_empty());
        assert_eq!(data.rank_lists.len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = env::temp_dir().join("clubrank_test_registry_absent");
        let _ = fs::remove_dir_all(&dir);

        let result = Registry::open(&dir).load();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Data directory not found"));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = write_test_dir("clubrank_test_registry_bad_json");
        fs::write(dir.join("events.json"), "not json").unwrap();

        let result = Registry::open(&dir).load();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("invalid JSON"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_find_rank_list_by_id_and_keyword() {
        let dir = write_test_dir("clubrank_test_registry_find");
        let data = Registry::open(&dir).load().unwrap();

        assert!(data.find_rank_list("1").is_some());
        assert!(data.find_rank_list("intro-2025").is_some());
        assert!(data.find_rank_list("INTRO-2025").is_some());
        assert!(data.find_rank_list("missing").is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_then_load_roundtrip() {
        let source = write_test_dir("clubrank_test_registry_write_src");
        let data = Registry::open(&source).load().unwrap();

        let dest = env::temp_dir().join("clubrank_test_registry_write_dst");
        let _ = fs::remove_dir_all(&dest);

        let registry = Registry::open(&dest);
        assert!(!registry.is_initialized());
        registry.write(&data).unwrap();
        assert!(registry.is_initialized());

        let reloaded = registry.load().unwrap();
        assert_eq!(reloaded.rank_lists.len(), data.rank_lists.len());
        assert_eq!(reloaded.events.len(), data.events.len());
        assert_eq!(reloaded.users.len(), data.users.len());
        assert_eq!(reloaded.stats.len(), data.stats.len());

        let _ = fs::remove_dir_all(&source);
        let _ = fs::remove_dir_all(&dest);
    }

    #[test]
    fn test_scores_path_inside_data_dir() {
        let registry = Registry::open("/tmp/club-data");
        assert_eq!(
            registry.scores_path(),
            PathBuf::from("/tmp/club-data/scores.json")
        );
    }
}
