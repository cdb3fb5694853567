use serde::{Deserialize, Serialize};

/// Optional settings file (~/.config/clubrank/config.yaml). Every field has
/// a flag-level override; a missing file means the defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Club data directory (overridden by --data-dir).
    pub data_dir: Option<String>,
    /// Rank list selector used when a command omits one (id or keyword).
    pub default_rank_list: Option<String>,
}
