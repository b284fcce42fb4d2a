//! Scenario synthesis benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rv_core::{Outcome, PayoutTable, Resolution};
use rv_synth::{
    BlackjackRules, BlackjackSynthesizer, ChartGame, PaySchedule, PokerSynthesizer, SlotMachine,
    Synthesizer,
};

fn outcome_for(table: &PayoutTable, index: usize) -> Outcome {
    let m = table.get(index).unwrap();
    Outcome::reconcile(Resolution::new(index, m), 1.0, table).unwrap()
}

fn bench_blackjack(c: &mut Criterion) {
    let table = PayoutTable::new(vec![0.0, 1.0, 2.0, 2.5]).unwrap();
    let synth = BlackjackSynthesizer::new(table.clone(), BlackjackRules::default()).unwrap();
    let push = outcome_for(&table, 1);
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("blackjack_push", |b| {
        b.iter(|| synth.synthesize(black_box(&push), &mut rng))
    });
}

fn bench_poker_fallback(c: &mut Criterion) {
    let synth = PokerSynthesizer::new(PaySchedule::jacks_or_better()).unwrap();
    let royal = outcome_for(synth.table(), 9);
    let mut rng = StdRng::seed_from_u64(2);

    c.bench_function("poker_royal_flush", |b| {
        b.iter(|| synth.synthesize(black_box(&royal), &mut rng))
    });
}

fn bench_slots_loss(c: &mut Criterion) {
    let values: Vec<f64> = (0..64).map(|i| if i % 4 == 0 { 1.0 } else { 0.0 }).collect();
    let machine = SlotMachine::new(PayoutTable::new(values).unwrap(), 5).unwrap();
    let loss = outcome_for(machine.table(), 1);
    let mut rng = StdRng::seed_from_u64(3);

    c.bench_function("slots_5_reel_loss", |b| {
        b.iter(|| machine.synthesize(black_box(&loss), &mut rng))
    });
}

fn bench_chart(c: &mut Criterion) {
    let game = ChartGame::new(50.0).unwrap();
    let win = outcome_for(game.table(), 1);
    let mut rng = StdRng::seed_from_u64(4);

    c.bench_function("chart_win_50x", |b| {
        b.iter(|| game.synthesize(black_box(&win), &mut rng))
    });
}

criterion_group!(
    benches,
    bench_blackjack,
    bench_poker_fallback,
    bench_slots_loss,
    bench_chart
);
criterion_main!(benches);
