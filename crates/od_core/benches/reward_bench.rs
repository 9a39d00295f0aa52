use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use od_core::config::ShapingConfig;
use od_core::engine::perception::{PerceptionTag, Sighting};
use od_core::engine::reward::combat;
use od_core::{AgentAction, Dungeon, DungeonConfig, MultiAgentEnvironment};

/// Bravery term on both sides of the panic threshold
fn bench_bravery(c: &mut Criterion) {
    let shaping = ShapingConfig::default();
    c.bench_function("bravery_term", |b| {
        b.iter(|| {
            combat::bravery(black_box(0.7), black_box(2.5), &shaping)
                + combat::bravery(black_box(-0.4), black_box(8.0), &shaping)
        });
    });
}

/// Full per-tick shaping for one agent
fn bench_step_reward(c: &mut Criterion) {
    let dungeon = Dungeon::new(DungeonConfig::deterministic(1)).unwrap();
    let mut calc = dungeon.calculator(0).unwrap().clone();
    let threat = dungeon.perceive(0, PerceptionTag::Target);

    c.bench_function("step_reward", |b| {
        b.iter(|| {
            let world = dungeon.snapshot();
            calc.step_reward(&dungeon.config().rewards, &world, black_box(threat))
        });
    });
    c.bench_function("step_reward_unseen", |b| {
        b.iter(|| {
            let world = dungeon.snapshot();
            calc.step_reward(&dungeon.config().rewards, &world, black_box(Sighting::unseen()))
        });
    });
}

/// Whole orchestrator ticks with a straight-ahead policy
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("dungeon_tick");
    for agents in [1usize, 3] {
        let mut cfg = DungeonConfig::deterministic(9);
        cfg.episode.number_of_agents = agents;
        let actions = vec![AgentAction::new(0.1, 1.0); agents];

        group.bench_with_input(BenchmarkId::from_parameter(agents), &actions, |b, actions| {
            let mut dungeon = Dungeon::new(cfg.clone()).unwrap();
            b.iter(|| dungeon.step(black_box(actions)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bravery, bench_step_reward, bench_tick);
criterion_main!(benches);
