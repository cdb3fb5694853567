pub mod formatter;

pub use formatter::{
    build_standings, format_breakdown, format_rank_lists, format_score, format_standings_table,
    format_tsv, should_use_colors, StandingRow,
};
