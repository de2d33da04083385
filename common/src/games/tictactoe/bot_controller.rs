use rand::Rng;
use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::types::Mark;
use super::win_detector::{Outcome, evaluate};

pub const WIN_SCORE: i32 = 10;
pub const LOSS_SCORE: i32 = -WIN_SCORE;
pub const DRAW_SCORE: i32 = 0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotSettings {
    /// Chance in `[0, 1]` that the bot plays a uniformly random legal cell
    /// instead of the minimax choice. Zero keeps the bot deterministic.
    #[serde(default)]
    pub blunder_probability: f64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            blunder_probability: 0.0,
        }
    }
}

impl BotSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.blunder_probability) {
            return Err(format!(
                "Blunder probability must be between 0 and 1, got {}",
                self.blunder_probability
            ));
        }
        Ok(())
    }
}

pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    mover: Mark,
    settings: &BotSettings,
    rng: &mut R,
) -> Option<usize> {
    if settings.blunder_probability > 0.0 && rng.random_bool(settings.blunder_probability) {
        return board.available_moves().choose(rng).copied();
    }
    select_move(board, mover, mover.opponent())
}

pub fn select_move(board: &Board, mover: Mark, opponent: Mark) -> Option<usize> {
    let mut board = *board;
    if evaluate(&board).is_terminal() {
        return None;
    }

    let mut best_move = None;
    let mut best_score = i32::MIN;

    for cell in board.available_moves() {
        board.set_cell(cell, mover);
        let score = minimax(&mut board, mover, opponent, false);
        board.clear_cell(cell);

        if score > best_score {
            best_score = score;
            best_move = Some(cell);
        }
    }

    best_move
}

pub fn terminal_score(board: &Board, mover: Mark, opponent: Mark) -> Option<i32> {
    match evaluate(board) {
        Outcome::InProgress => None,
        Outcome::Draw => Some(DRAW_SCORE),
        Outcome::Won { mark, .. } if mark == mover => Some(WIN_SCORE),
        Outcome::Won { mark, .. } if mark == opponent => Some(LOSS_SCORE),
        Outcome::Won { .. } => Some(DRAW_SCORE),
    }
}

fn minimax(board: &mut Board, mover: Mark, opponent: Mark, is_maximizing: bool) -> i32 {
    if let Some(score) = terminal_score(board, mover, opponent) {
        return score;
    }

    let (mark, mut best) = if is_maximizing {
        (mover, i32::MIN)
    } else {
        (opponent, i32::MAX)
    };

    for cell in board.available_moves() {
        board.set_cell(cell, mark);
        let score = minimax(board, mover, opponent, !is_maximizing);
        board.clear_cell(cell);

        best = if is_maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}
