//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full MCTS search with varying iteration counts
//! - Search from different game phases (opening, midgame, near-terminal)
//! - Tree operations (expansion, backpropagation, rebase)
//! - Playouts on their own
//! - Search configurations (bounds, proof, root parallelism)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::GameState;
use mcts::{playout, run_mcts, BackpropMode, MctsConfig, MctsTree};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn tictactoe_after(moves: &[u8]) -> games_tictactoe::State {
    games_tictactoe::State::from_moves(moves).unwrap()
}

fn connect4_after(moves: &[u8]) -> games_connect4::State {
    games_connect4::State::from_moves(moves).unwrap()
}

// =============================================================================
// Full MCTS Search Benchmarks
// =============================================================================

fn bench_mcts_search_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_iterations");

    for iterations in [50u32, 100, 200, 400, 800, 1600] {
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_with_input(
            BenchmarkId::new("tictactoe", iterations),
            &iterations,
            |b, &iterations| {
                let state = games_tictactoe::State::new();
                let config = MctsConfig::default()
                    .with_iterations(iterations)
                    .with_prove(false);
                b.iter(|| black_box(run_mcts(&state, config.clone(), 42).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_mcts_connect4(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_connect4");

    for iterations in [100u32, 400, 1600] {
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_with_input(
            BenchmarkId::new("opening", iterations),
            &iterations,
            |b, &iterations| {
                let state = games_connect4::State::new();
                let config = MctsConfig::default().with_iterations(iterations);
                b.iter(|| black_box(run_mcts(&state, config.clone(), 42).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_mcts_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_phases");
    let config = MctsConfig::default().with_iterations(400).with_prove(false);

    let phases: [(&str, &[u8]); 3] = [
        ("opening", &[]),
        ("midgame", &[4, 0, 8]),
        ("endgame", &[7, 4, 0, 5, 3, 2]),
    ];
    for (name, moves) in phases {
        let state = tictactoe_after(moves);
        group.bench_function(BenchmarkId::new("tictactoe", name), |b| {
            b.iter(|| black_box(run_mcts(&state, config.clone(), 7).unwrap()));
        });
    }

    let phases: [(&str, &[u8]); 2] = [
        ("opening", &[]),
        ("midgame", &[3, 3, 2, 4, 4, 2, 5, 1, 1, 0]),
    ];
    for (name, moves) in phases {
        let state = connect4_after(moves);
        group.bench_function(BenchmarkId::new("connect4", name), |b| {
            b.iter(|| black_box(run_mcts(&state, config.clone(), 7).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");
    let state = games_connect4::State::new();

    group.bench_function("expand_root", |b| {
        b.iter(|| {
            let mut tree = MctsTree::new(&state, (0.0, 1.0));
            black_box(tree.expand(tree.root(), &state).unwrap())
        });
    });

    group.bench_function("backpropagate_depth_8", |b| {
        // Build a single line eight plies deep
        let mut tree = MctsTree::new(&state, (0.0, 1.0));
        let mut line_state = state.clone();
        let mut node = tree.root();
        for column in [3u8, 3, 2, 2, 4, 4, 0, 0] {
            tree.expand(node, &line_state).unwrap();
            node = tree.get(node).child_ids()[column as usize];
            line_state.apply_move(&column).unwrap();
        }
        let mode = BackpropMode {
            bounds: true,
            prove: true,
        };
        b.iter(|| tree.backpropagate(black_box(node), &[1.0, 0.0], mode));
    });

    group.bench_function("rebase", |b| {
        let mut tree = MctsTree::new(&state, (0.0, 1.0));
        tree.expand(tree.root(), &state).unwrap();
        for (i, &child) in tree.get(tree.root()).child_ids().to_vec().iter().enumerate() {
            let mut child_state = state.clone();
            child_state.apply_move(&(i as u8)).unwrap();
            tree.expand(child, &child_state).unwrap();
        }
        b.iter(|| black_box(tree.clone().rebase(&3).unwrap()));
    });

    group.finish();
}

fn bench_playouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_playouts");

    group.bench_function("tictactoe", |b| {
        let state = games_tictactoe::State::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        b.iter(|| black_box(playout(&state, None, &mut rng).unwrap()));
    });

    group.bench_function("connect4", |b| {
        let state = games_connect4::State::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        b.iter(|| black_box(playout(&state, None, &mut rng).unwrap()));
    });

    group.finish();
}

// =============================================================================
// Configuration Benchmarks
// =============================================================================

fn bench_mcts_configs(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_configs");
    let state = connect4_after(&[3, 3, 2]);

    let configs = [
        ("plain", MctsConfig::default().with_prove(false)),
        ("prove", MctsConfig::default()),
        ("bounds", MctsConfig::default().with_bounds(0.1, 0.1)),
        ("root_parallel_4", MctsConfig::default().with_root_threads(4)),
    ];
    for (name, config) in configs {
        let config = config.with_iterations(400);
        group.bench_function(name, |b| {
            b.iter(|| black_box(run_mcts(&state, config.clone(), 3).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mcts_search_iterations,
    bench_mcts_connect4,
    bench_mcts_game_phases,
    bench_tree_operations,
    bench_playouts,
    bench_mcts_configs,
);

criterion_main!(benches);
