//! Crash chart: candles climb until the crash point

use serde::Serialize;

use rv_core::{Outcome, RvResult};
use rv_stage::{Cue, CueEvent, DelayPlanner, RevealScript, RevealStep, TimingConfig};
use rv_synth::{Candle, ChartGame, CrashChart, RejectionSampler};

use crate::game::{FlightMode, GameFamily, settle_cue};
use crate::presentation::Presentation;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartView {
    pub target: f64,
    pub candles: Vec<Candle>,
    /// Latest close
    pub current: f64,
    pub passed_target: bool,
    pub crash_point: Option<f64>,
    pub cashed_out: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartAction {
    Arm { target: f64 },
    Candle(Candle),
    PassTarget,
    Crash(f64),
    Settle { cashed_out: bool },
}

impl Presentation for ChartView {
    type Action = ChartAction;

    fn apply(&mut self, action: &ChartAction) {
        match action {
            ChartAction::Arm { target } => {
                self.target = *target;
                self.current = 1.0;
            }
            ChartAction::Candle(candle) => {
                self.candles.push(*candle);
                self.current = candle.close;
            }
            ChartAction::PassTarget => self.passed_target = true,
            ChartAction::Crash(point) => self.crash_point = Some(*point),
            ChartAction::Settle { cashed_out } => self.cashed_out = Some(*cashed_out),
        }
    }
}

pub struct ChartRound {
    game: ChartGame,
}

impl ChartRound {
    pub fn new(target: f64) -> RvResult<Self> {
        Ok(Self {
            game: ChartGame::new(target)?,
        })
    }
}

impl GameFamily for ChartRound {
    type Synth = ChartGame;
    type View = ChartView;

    fn name(&self) -> &'static str {
        "chart"
    }

    fn flight(&self) -> FlightMode {
        FlightMode::Minimum
    }

    fn synthesizer(&self) -> &ChartGame {
        &self.game
    }

    fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.game = self.game.with_sampler(sampler);
        self
    }

    fn script(
        &self,
        chart: &CrashChart,
        outcome: &Outcome,
        timing: &TimingConfig,
    ) -> RevealScript<ChartAction> {
        let mut plan = DelayPlanner::new(timing.clone());
        let total = chart.candles.len().max(1) as f32;
        let mut passed = false;

        let mut steps = vec![RevealStep::new(
            plan.after(0.0),
            ChartAction::Arm {
                target: chart.target,
            },
        )];
        for (i, candle) in chart.candles.iter().enumerate() {
            // Tick pitch rises with the chart
            let rate = 1.0 + 0.5 * (i as f32 / total);
            steps.push(
                RevealStep::new(plan.chart_tick(), ChartAction::Candle(*candle))
                    .with_cue(CueEvent::new(Cue::Tick).with_rate(rate)),
            );
            if !passed && candle.close >= chart.target {
                passed = true;
                steps.push(
                    RevealStep::new(plan.after(0.0), ChartAction::PassTarget).with_cue(Cue::Moon),
                );
            }
        }
        steps.push(
            RevealStep::new(plan.chart_tick(), ChartAction::Crash(chart.crash_point))
                .with_cue(Cue::Crash),
        );
        steps.push(
            RevealStep::new(
                plan.settle(),
                ChartAction::Settle {
                    cashed_out: chart.reached_target(),
                },
            )
            .with_cue(settle_cue(outcome, false)),
        );
        RevealScript::new(steps, outcome.payout_amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rv_core::Resolution;
    use rv_synth::Synthesizer;

    fn play(round: &ChartRound, index: usize, m: f64) -> (CrashChart, RevealScript<ChartAction>) {
        let table = round.synthesizer().table().clone();
        let outcome = Outcome::reconcile(Resolution::new(index, m), 1.0, &table).unwrap();
        let mut rng = StdRng::seed_from_u64(index as u64 + 30);
        let chart = round.synthesizer().synthesize(&outcome, &mut rng).scenario;
        let script = round.script(&chart, &outcome, &TimingConfig::turbo());
        (chart, script)
    }

    #[test]
    fn test_winning_chart_passes_target_once() {
        let round = ChartRound::new(2.0).unwrap();
        let (chart, script) = play(&round, 1, 2.0);
        let cues = script.cue_sequence();
        assert_eq!(cues.iter().filter(|c| **c == Cue::Moon).count(), 1);
        assert_eq!(&cues[cues.len() - 2..], &[Cue::Crash, Cue::Win]);

        let mut view = ChartView::default();
        for step in script.steps() {
            view.apply(&step.action);
        }
        assert!(view.passed_target);
        assert_eq!(view.cashed_out, Some(true));
        assert_eq!(view.current, chart.crash_point);
    }

    #[test]
    fn test_losing_chart_never_moons() {
        let round = ChartRound::new(3.0).unwrap();
        let (chart, script) = play(&round, 0, 0.0);
        assert!(chart.crash_point < 3.0);
        let cues = script.cue_sequence();
        assert!(!cues.contains(&Cue::Moon));
        assert_eq!(cues.last(), Some(&Cue::Lose));
        assert_eq!(script.payout(), 0.0);
    }
}
