use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use clubrank::config::{self, Config};
use clubrank::model::{RankList, UserId};
use clubrank::output;
use clubrank::recompute::{recompute_rank_list, recompute_user};
use clubrank::store::{
    load_score_board, save_score_board, validate_club_data, ClubData, Registry,
};

const EXIT_SUCCESS: i32 = 0;
/// A recompute reported a non-fatal failure (no events, user not enrolled).
const EXIT_RECOMPUTE: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List rank lists in the data directory (default if no subcommand)
    Lists,
    /// Recompute scores for a rank list (all members, or one with --user)
    Recompute {
        /// Rank list id or keyword (defaults to default_rank_list from config)
        rank_list: Option<String>,
        /// Recompute a single enrolled user instead of every member
        #[arg(long)]
        user: Option<UserId>,
    },
    /// Print stored standings for a rank list
    Standings {
        /// Rank list id or keyword (defaults to default_rank_list from config)
        rank_list: Option<String>,
        /// Emit tab-separated rows for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Create a starter config and data directory
    Init {
        /// Seed the data directory with demo records
        #[arg(long)]
        demo: bool,
        /// Overwrite an existing config or data directory
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "clubrank")]
#[command(about = "Rank-list score recomputation for the club's contest data", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/clubrank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the club data directory (overrides the config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Lists);
    let start_time = Instant::now();

    let config_path = cli.config.map(PathBuf::from);

    // Init runs before any data is loaded; it creates what the rest reads.
    if let Commands::Init { demo, force } = &command {
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(config::get_default_data_dir);
        if let Err(e) = config::init::run_init(config_path, data_dir, *demo, *force) {
            eprintln!("Init error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let data_dir = config::resolve_data_dir(cli.data_dir.clone(), &config);
    let registry = Registry::open(&data_dir);

    let data = match registry.load() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Data error: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    // Validate the whole export before any command touches it.
    if let Err(errors) = validate_club_data(&data) {
        eprintln!("Data directory errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_DATA);
    }

    if cli.verbose {
        eprintln!(
            "Loaded {} rank lists, {} events, {} users, {} stat rows from {}",
            data.rank_lists.len(),
            data.events.len(),
            data.users.len(),
            data.stats.len(),
            data_dir.display()
        );
    }

    let use_colors = output::should_use_colors();

    match command {
        Commands::Lists => {
            let lists: Vec<&RankList> = data.rank_lists.iter().collect();
            println!("{}", output::format_rank_lists(&lists, use_colors));
        }
        Commands::Standings { rank_list, tsv } => {
            let list = resolve_rank_list(&data, rank_list, &config);

            let board = match load_score_board(&registry.scores_path()) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Data error: {:#}", e);
                    std::process::exit(EXIT_DATA);
                }
            };

            let rows = output::build_standings(list, &data, &board);
            if tsv {
                let out = output::format_tsv(&rows);
                if !out.is_empty() {
                    println!("{}", out);
                }
            } else {
                println!("{}", output::format_standings_table(&rows, use_colors));
            }
        }
        Commands::Recompute { rank_list, user } => {
            let list = resolve_rank_list(&data, rank_list, &config);

            let mut board = match load_score_board(&registry.scores_path()) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Data error: {:#}", e);
                    std::process::exit(EXIT_DATA);
                }
            };

            let outcome = match user {
                Some(user_id) => recompute_user(&data, list, user_id, &mut board, cli.verbose),
                None => recompute_rank_list(&data, list, &mut board, cli.verbose),
            };

            if !outcome.success() {
                eprintln!("{}", outcome.message);
                std::process::exit(EXIT_RECOMPUTE);
            }

            // The board only reaches disk on success, in one atomic replace.
            if let Err(e) = save_score_board(&registry.scores_path(), &board) {
                eprintln!("Data error: {:#}", e);
                std::process::exit(EXIT_DATA);
            }

            println!("{}", outcome.message);
            if cli.verbose {
                if let Some(result) = &outcome.breakdown {
                    println!("{}", output::format_breakdown(result, &data, use_colors));
                }
                eprintln!(
                    "Processed {} users in {:?}",
                    outcome.processed_users,
                    start_time.elapsed()
                );
            }
        }
        Commands::Init { .. } => unreachable!("handled above"),
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Resolve the rank-list selector from the argument or the config default.
/// A missing selector is a config error; an unknown one is a data error.
fn resolve_rank_list<'a>(
    data: &'a ClubData,
    selector: Option<String>,
    config: &Config,
) -> &'a RankList {
    let selector = match selector.or_else(|| config.default_rank_list.clone()) {
        Some(s) => s,
        None => {
            eprintln!("No rank list given and no default_rank_list in config.");
            eprintln!("Pass an id or keyword, e.g. `clubrank standings intro-2025`.");
            std::process::exit(EXIT_CONFIG);
        }
    };

    match data.find_rank_list(&selector) {
        Some(list) => list,
        None => {
            eprintln!("Rank list '{}' not found in the data directory.", selector);
            std::process::exit(EXIT_DATA);
        }
    }
}
