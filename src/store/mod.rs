pub mod registry;
pub mod scores;
pub mod validate;

pub use registry::{ClubData, Registry};
pub use scores::{load_score_board, save_score_board, ScoreBoard, ScoreRow};
pub use validate::validate_club_data;
