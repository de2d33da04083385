use criterion::{Criterion, criterion_group, criterion_main};
use common::games::tictactoe::{Board, Mark, evaluate, select_move};

fn bench_minimax_empty_board(c: &mut Criterion) {
    c.bench_function("minimax_3x3_single_move_empty", |b| {
        b.iter(|| select_move(&Board::new(), Mark::X, Mark::O));
    });
}

fn bench_minimax_after_opening(c: &mut Criterion) {
    c.bench_function("minimax_3x3_single_move_after_corner", |b| {
        let mut board = Board::new();
        board.apply_move(0, Mark::X).unwrap();

        b.iter(|| select_move(&board, Mark::O, Mark::X));
    });
}

fn bench_minimax_self_play(c: &mut Criterion) {
    c.bench_function("minimax_3x3_full_self_play", |b| {
        b.iter(|| {
            let mut board = Board::new();
            let mut to_move = Mark::X;
            while !evaluate(&board).is_terminal() {
                let Some(cell) = select_move(&board, to_move, to_move.opponent()) else {
                    break;
                };
                board.apply_move(cell, to_move).unwrap();
                to_move = to_move.opponent();
            }
            board
        });
    });
}

criterion_group!(
    benches,
    bench_minimax_empty_board,
    bench_minimax_after_opening,
    bench_minimax_self_play
);
criterion_main!(benches);
