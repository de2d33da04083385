use std::fmt;

use common::games::tictactoe::MoveError;

/// A user action the session refused. Always recoverable; reported to the actor only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Declined {
    RoundResolved,
    NoRoleAvailable,
    NotYourTurn,
    CellOutOfRange(usize),
    CellOccupied(usize),
    MatchStarted,
    AutomatedAlreadyActive,
    AutomatedNotActive,
    NameReserved,
}

impl From<MoveError> for Declined {
    fn from(error: MoveError) -> Self {
        match error {
            MoveError::OutOfRange(cell) => Declined::CellOutOfRange(cell),
            MoveError::Occupied(cell) => Declined::CellOccupied(cell),
        }
    }
}

impl fmt::Display for Declined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declined::RoundResolved => write!(f, "The round is over, reset to play again."),
            Declined::NoRoleAvailable => write!(f, "Both roles are taken, you are watching."),
            Declined::NotYourTurn => write!(f, "It is not your turn."),
            Declined::CellOutOfRange(cell) => write!(f, "Cell {} does not exist.", cell),
            Declined::CellOccupied(cell) => write!(f, "Cell {} is already taken.", cell),
            Declined::MatchStarted => write!(f, "Game already started, cannot change role."),
            Declined::AutomatedAlreadyActive => write!(f, "The AI opponent is already playing."),
            Declined::AutomatedNotActive => write!(f, "The AI opponent is not playing."),
            Declined::NameReserved => write!(f, "That name is reserved."),
        }
    }
}
