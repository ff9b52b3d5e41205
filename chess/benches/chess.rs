use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raychess::{
    eval, movegen,
    moves::{self, Move},
    Color, MoveTable, Position, Promotion,
};

// Plies of random play from the initial position
const POSITIONS: [(&str, usize); 4] = [
    ("initial", 0),
    ("opening", 8),
    ("middle", 30),
    ("late", 80),
];

fn positions(table: &MoveTable) -> Vec<(&'static str, Position, Color)> {
    let mut rng = StdRng::seed_from_u64(0xbe4c);
    POSITIONS
        .iter()
        .map(|&(name, plies)| {
            let mut pos = Position::initial();
            let mut side = Color::White;
            for _ in 0..plies {
                let succ = movegen::expand_with(table, &pos, side, Promotion::Queen);
                if succ.is_empty() {
                    break;
                }
                pos = succ[rng.gen_range(0..succ.len())].clone();
                side = side.inv();
            }
            (name, pos, side)
        })
        .collect()
}

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");
    group.bench_function("build", |b| b.iter(|| black_box(MoveTable::build())));
    let table = MoveTable::build();
    let data = table.encode();
    group.bench_function("encode", |b| b.iter(|| black_box(table.encode().len())));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(MoveTable::decode(&data).is_ok()))
    });
}

fn bench_gen_moves(c: &mut Criterion) {
    let table = MoveTable::build();
    let mut group = c.benchmark_group("gen_moves");
    for (name, pos, side) in positions(&table) {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::gen_moves(&table, &pos, side).len()))
        });
    }
}

fn bench_expand(c: &mut Criterion) {
    let table = MoveTable::build();
    let mut group = c.benchmark_group("expand");
    for (name, pos, side) in positions(&table) {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::expand(&table, &pos, side).len()))
        });
    }
}

fn bench_make_move_checked(c: &mut Criterion) {
    let table = MoveTable::build();
    let mut group = c.benchmark_group("make_move_checked");
    for (name, pos, side) in positions(&table) {
        let mvs: Vec<Move> = movegen::gen_moves(&table, &pos, side).to_vec();
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &mvs {
                    black_box(
                        moves::make_move(&table, &pos, *mv)
                            .as_ref()
                            .map(|p| p.zobrist_hash())
                            .unwrap_or(0),
                    );
                }
            })
        });
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let table = MoveTable::build();
    let mut group = c.benchmark_group("evaluate");
    for (name, pos, side) in positions(&table) {
        group.bench_function(name, |b| b.iter(|| black_box(eval::evaluate(&pos, side))));
    }
}

fn bench_perft(c: &mut Criterion) {
    let table = MoveTable::build();
    let pos = Position::initial();
    c.bench_function("perft_3", |b| {
        b.iter(|| black_box(movegen::perft(&table, &pos, Color::White, 3)))
    });
}

criterion_group!(
    chess,
    bench_table,
    bench_gen_moves,
    bench_expand,
    bench_make_move_checked,
    bench_evaluate,
    bench_perft,
);

criterion_main!(chess);
