use super::board::Board;
use super::types::Mark;
use crate::proto;

/// Rows, then columns, then the two diagonals. The order decides which line is
/// reported when more than one is complete.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won { mark: Mark, line: [usize; 3] },
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Won { mark, .. } => Some(*mark),
            _ => None,
        }
    }

    pub fn winning_line(&self) -> Option<[usize; 3]> {
        match self {
            Outcome::Won { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn to_proto(&self) -> i32 {
        match self {
            Outcome::InProgress => proto::Outcome::InProgress.into(),
            Outcome::Won { mark: Mark::X, .. } => proto::Outcome::XWon.into(),
            Outcome::Won { mark: Mark::O, .. } => proto::Outcome::OWon.into(),
            Outcome::Draw => proto::Outcome::Draw.into(),
        }
    }
}

pub fn check_win_with_line(board: &Board) -> Option<(Mark, [usize; 3])> {
    WINNING_LINES.iter().find_map(|&[a, b, c]| {
        let mark = board.cell(a)?;
        if board.cell(b) == Some(mark) && board.cell(c) == Some(mark) {
            Some((mark, [a, b, c]))
        } else {
            None
        }
    })
}

pub fn check_win(board: &Board) -> Option<Mark> {
    check_win_with_line(board).map(|(mark, _)| mark)
}

pub fn evaluate(board: &Board) -> Outcome {
    if let Some((mark, line)) = check_win_with_line(board) {
        return Outcome::Won { mark, line };
    }
    if board.is_full() {
        return Outcome::Draw;
    }
    Outcome::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::board::CELL_COUNT;

    fn board_from(layout: &str) -> Board {
        let mut cells = [None; CELL_COUNT];
        for (i, c) in layout.chars().filter(|c| !c.is_whitespace()).enumerate() {
            cells[i] = match c {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        Board::from_cells(cells)
    }

    fn all_boards() -> Vec<Board> {
        let mut boards = Vec::new();
        for code in 0..3usize.pow(CELL_COUNT as u32) {
            let mut cells = [None; CELL_COUNT];
            let mut rest = code;
            for cell in cells.iter_mut() {
                *cell = match rest % 3 {
                    1 => Some(Mark::X),
                    2 => Some(Mark::O),
                    _ => None,
                };
                rest /= 3;
            }
            boards.push(Board::from_cells(cells));
        }
        boards
    }

    fn complete_lines(board: &Board, mark: Mark) -> usize {
        WINNING_LINES
            .iter()
            .filter(|line| line.iter().all(|&i| board.cell(i) == Some(mark)))
            .count()
    }

    fn collect_reachable(board: Board, to_move: Mark, out: &mut Vec<Board>) {
        out.push(board);
        if evaluate(&board).is_terminal() {
            return;
        }
        for cell in board.available_moves() {
            let mut next = board;
            next.apply_move(cell, to_move).unwrap();
            collect_reachable(next, to_move.opponent(), out);
        }
    }

    #[test]
    fn test_empty_board_in_progress() {
        assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn test_row_win_reports_line() {
        let board = board_from("XXX OO. ...");

        assert_eq!(evaluate(&board), Outcome::Won { mark: Mark::X, line: [0, 1, 2] });
    }

    #[test]
    fn test_column_win_reports_line() {
        let board = board_from("XO. XO. .O.");

        assert_eq!(evaluate(&board), Outcome::Won { mark: Mark::O, line: [1, 4, 7] });
    }

    #[test]
    fn test_anti_diagonal_win_reports_line() {
        let board = board_from("XXO .O. OX.");

        assert_eq!(evaluate(&board), Outcome::Won { mark: Mark::O, line: [2, 4, 6] });
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = board_from("XOX XOO OXX");

        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn test_win_on_last_cell_is_not_draw() {
        let board = board_from("XOX OXO OXX");

        assert_eq!(evaluate(&board).winner(), Some(Mark::X));
    }

    #[test]
    fn test_simultaneous_lines_report_first_in_scan_order() {
        let board = board_from("XXX XXX ...");

        assert_eq!(evaluate(&board).winning_line(), Some([0, 1, 2]));
    }

    #[test]
    fn test_draw_iff_full_and_no_line_for_all_boards() {
        for board in all_boards() {
            let has_line =
                complete_lines(&board, Mark::X) > 0 || complete_lines(&board, Mark::O) > 0;
            let expected_draw = board.is_full() && !has_line;

            assert_eq!(evaluate(&board) == Outcome::Draw, expected_draw, "board:\n{}", board);
        }
    }

    #[test]
    fn test_reachable_boards_have_at_most_one_winning_mark() {
        let mut reachable = Vec::new();
        collect_reachable(Board::new(), Mark::X, &mut reachable);

        assert!(reachable.len() > 5000);
        for board in reachable {
            let x_lines = complete_lines(&board, Mark::X);
            let o_lines = complete_lines(&board, Mark::O);
            assert!(x_lines == 0 || o_lines == 0, "board:\n{}", board);
        }
    }

    #[test]
    fn test_outcome_to_proto() {
        assert_eq!(Outcome::Draw.to_proto(), i32::from(proto::Outcome::Draw));
        assert_eq!(
            Outcome::Won { mark: Mark::O, line: [0, 1, 2] }.to_proto(),
            i32::from(proto::Outcome::OWon)
        );
    }
}
