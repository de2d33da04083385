use std::fmt;

use crate::proto;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn to_proto(&self) -> i32 {
        match self {
            Mark::X => proto::Mark::X.into(),
            Mark::O => proto::Mark::O.into(),
        }
    }

    /// Wire value for an optional mark: an empty cell or an unset turn maps to `MARK_NONE`.
    pub fn option_to_proto(mark: Option<Mark>) -> i32 {
        match mark {
            Some(mark) => mark.to_proto(),
            None => proto::Mark::None.into(),
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Observer,
    Player(Mark),
}

impl Role {
    pub fn mark(&self) -> Option<Mark> {
        match self {
            Role::Observer => None,
            Role::Player(mark) => Some(*mark),
        }
    }

    pub fn to_proto(&self) -> i32 {
        match self {
            Role::Observer => proto::Role::Observer.into(),
            Role::Player(Mark::X) => proto::Role::X.into(),
            Role::Player(Mark::O) => proto::Role::O.into(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Observer => write!(f, "observer"),
            Role::Player(mark) => write!(f, "{}", mark),
        }
    }
}
