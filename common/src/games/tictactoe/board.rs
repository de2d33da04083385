use std::fmt;

use super::types::Mark;

pub const BOARD_SIZE: usize = 3;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveError {
    OutOfRange(usize),
    Occupied(usize),
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfRange(cell) => write!(f, "Cell {} is out of range", cell),
            MoveError::Occupied(cell) => write!(f, "Cell {} is already marked", cell),
        }
    }
}

/// Row-major 3x3 grid; cell `i` sits at row `i / 3`, column `i % 3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Mark>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Mark>; CELL_COUNT] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_valid_move(&self, index: usize) -> bool {
        index < CELL_COUNT && self.cells[index].is_none()
    }

    pub fn apply_move(&mut self, index: usize, mark: Mark) -> Result<(), MoveError> {
        if index >= CELL_COUNT {
            return Err(MoveError::OutOfRange(index));
        }
        if self.cells[index].is_some() {
            return Err(MoveError::Occupied(index));
        }
        self.cells[index] = Some(mark);
        Ok(())
    }

    pub(crate) fn set_cell(&mut self, index: usize, mark: Mark) {
        self.cells[index] = Some(mark);
    }

    pub(crate) fn clear_cell(&mut self, index: usize) {
        self.cells[index] = None;
    }

    pub fn available_moves(&self) -> Vec<usize> {
        (0..CELL_COUNT).filter(|&i| self.cells[i].is_none()).collect()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    pub fn to_proto(&self) -> Vec<i32> {
        self.cells.iter().map(|&cell| Mark::option_to_proto(cell)).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.cells.chunks(BOARD_SIZE).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let symbol = match cell {
                    Some(mark) => mark.to_string(),
                    None => ".".to_string(),
                };
                write!(f, "{}", symbol)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();

        assert_eq!(board.filled_count(), 0);
        assert_eq!(board.available_moves(), (0..9).collect::<Vec<_>>());
        assert!(!board.is_full());
    }

    #[test]
    fn test_apply_move_places_mark() {
        let mut board = Board::new();

        board.apply_move(4, Mark::X).unwrap();

        assert_eq!(board.cell(4), Some(Mark::X));
        assert_eq!(board.filled_count(), 1);
        assert!(!board.available_moves().contains(&4));
    }

    #[test]
    fn test_apply_move_rejects_occupied_cell() {
        let mut board = Board::new();
        board.apply_move(0, Mark::X).unwrap();

        let result = board.apply_move(0, Mark::O);

        assert_eq!(result, Err(MoveError::Occupied(0)));
        assert_eq!(board.cell(0), Some(Mark::X));
    }

    #[test]
    fn test_apply_move_rejects_out_of_range() {
        let mut board = Board::new();

        let result = board.apply_move(9, Mark::X);

        assert_eq!(result, Err(MoveError::OutOfRange(9)));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_to_proto_maps_every_cell() {
        let mut board = Board::new();
        board.apply_move(0, Mark::X).unwrap();
        board.apply_move(8, Mark::O).unwrap();

        let cells = board.to_proto();

        assert_eq!(cells.len(), CELL_COUNT);
        assert_eq!(cells[0], i32::from(crate::proto::Mark::X));
        assert_eq!(cells[8], i32::from(crate::proto::Mark::O));
        assert_eq!(cells[4], i32::from(crate::proto::Mark::None));
    }

    #[test]
    fn test_display_renders_rows() {
        let mut board = Board::new();
        board.apply_move(0, Mark::X).unwrap();
        board.apply_move(4, Mark::O).unwrap();

        assert_eq!(board.to_string(), "X..\n.O.\n...");
    }
}
