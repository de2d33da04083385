mod board;
mod bot_controller;
mod types;
mod win_detector;

pub use board::{BOARD_SIZE, Board, CELL_COUNT, MoveError};
pub use bot_controller::{
    BotSettings, DRAW_SCORE, LOSS_SCORE, WIN_SCORE, choose_move, select_move, terminal_score,
};
pub use types::{Mark, Role};
pub use win_detector::{Outcome, WINNING_LINES, check_win, check_win_with_line, evaluate};
