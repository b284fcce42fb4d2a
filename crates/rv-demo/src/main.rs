//! RevealForge demo driver
//!
//! Usage:
//!   rv-demo blackjack --rounds 5          - Deal five hands
//!   rv-demo slots --reels 5 --table 0,1,0,5,20
//!   rv-demo wheel --latency-ms 400        - Slow oracle, spin-first
//!   rv-demo chart --target 2.5 --profile turbo
//!
//! Each settled state is printed as one JSON line. Cues go to the log
//! (`RUST_LOG=info` to see them).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use rv_core::PayoutTable;
use rv_cue::{LogSink, SoundRegistry, create_cue_dispatcher};
use rv_reveal::{
    BlackjackGame, ChartRound, EngineConfig, GameFamily, GameSession, PlayReceipt, PokerGame,
    PresentationState, SimulatedOracle, SlotsGame, WheelGame,
};
use rv_stage::TimingProfile;
use rv_synth::{DEFAULT_REELS, PaySchedule};

const DEFAULT_SLOT_TABLE: &[f64] = &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 5.0, 0.0, 25.0];
const DEFAULT_WHEEL_TABLE: &[f64] = &[0.0, 1.5, 0.0, 2.0, 0.0, 1.5, 0.0, 3.0, 0.0, 10.0];

#[derive(Parser)]
#[command(name = "rv-demo", about = "RevealForge reveal demo")]
struct Cli {
    #[command(subcommand)]
    game: Game,

    /// Rounds to play
    #[arg(short, long, global = true, default_value_t = 3)]
    rounds: u32,

    /// Wager per round
    #[arg(short, long, global = true, default_value_t = 1.0)]
    wager: f64,

    /// Seed for the oracle and the cosmetic choices
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Simulated oracle round trip
    #[arg(long, global = true, default_value_t = 250)]
    latency_ms: u64,

    /// Engine config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Timing profile, overrides the config file
    #[arg(short, long, global = true)]
    profile: Option<Profile>,

    /// Silence audio cues (particle bursts still fire)
    #[arg(long, global = true)]
    mute: bool,
}

#[derive(Subcommand)]
enum Game {
    /// Two-card blackjack
    Blackjack,
    /// Five-card draw, Jacks or Better
    Poker,
    /// Single-line slot machine
    Slots {
        #[arg(long, default_value_t = DEFAULT_REELS)]
        reels: usize,
        /// Comma-separated multipliers
        #[arg(long, value_delimiter = ',')]
        table: Option<Vec<f64>>,
    },
    /// Prize wheel, one pocket per table entry
    Wheel {
        /// Comma-separated multipliers
        #[arg(long, value_delimiter = ',')]
        table: Option<Vec<f64>>,
    },
    /// Crash chart with a cash-out target
    Chart {
        #[arg(short, long, default_value_t = 2.0)]
        target: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
    Studio,
    Instant,
}

impl From<Profile> for TimingProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Normal => TimingProfile::Normal,
            Profile::Turbo => TimingProfile::Turbo,
            Profile::Studio => TimingProfile::Studio,
            Profile::Instant => TimingProfile::Instant,
        }
    }
}

#[derive(Serialize)]
struct RoundReport<'a, S, V> {
    round: u32,
    receipt: &'a PlayReceipt<S>,
    state: &'a PresentationState<V>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.game {
        Game::Blackjack => run(BlackjackGame::standard()?, &cli, config).await,
        Game::Poker => run(PokerGame::new(PaySchedule::jacks_or_better())?, &cli, config).await,
        Game::Slots { reels, table } => {
            let table = table_or(table, DEFAULT_SLOT_TABLE)?;
            run(SlotsGame::new(table, *reels)?, &cli, config).await
        }
        Game::Wheel { table } => {
            let table = table_or(table, DEFAULT_WHEEL_TABLE)?;
            run(WheelGame::new(table), &cli, config).await
        }
        Game::Chart { target } => run(ChartRound::new(*target)?, &cli, config).await,
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.timing_profile = profile.into();
    }
    Ok(config)
}

fn table_or(custom: &Option<Vec<f64>>, default: &[f64]) -> Result<PayoutTable> {
    let values = custom.clone().unwrap_or_else(|| default.to_vec());
    PayoutTable::new(values).context("Invalid payout table")
}

async fn run<G: GameFamily>(game: G, cli: &Cli, config: EngineConfig) -> Result<()> {
    let (cues, processor) = create_cue_dispatcher(
        config.cue_queue_capacity,
        SoundRegistry::default_casino(),
        Box::new(LogSink),
        Box::new(LogSink),
    );
    cues.set_muted(cli.mute);
    let cue_task = tokio::spawn(processor.run(Duration::from_millis(5)));

    let oracle = SimulatedOracle::new(cli.seed.unwrap_or_else(rand::random))
        .with_latency(Duration::from_millis(cli.latency_ms));

    let mut session = GameSession::new(game, Arc::new(oracle), config, Some(cues.clone()));
    if let Some(seed) = cli.seed {
        session = session.with_seed(seed);
    }
    log::info!(
        "Playing {} rounds of {} at {} per round",
        cli.rounds,
        session.game().name(),
        cli.wager
    );

    let mut paid = 0.0;
    for round in 1..=cli.rounds {
        match session.play_to_settle(cli.wager).await {
            Ok((receipt, Some(state))) => {
                paid += receipt.outcome.payout_amount();
                let report = RoundReport {
                    round,
                    receipt: &receipt,
                    state: &state,
                };
                println!("{}", serde_json::to_string(&report)?);
            }
            Ok((receipt, None)) => {
                log::warn!("Round {} (epoch {}) never settled", round, receipt.epoch);
            }
            Err(err) => log::error!("Round {} failed: {}", round, err),
        }
    }

    let stats = cues.stats();
    log::info!(
        "Wagered {}, paid {}; cues queued {} delivered {} dropped {} stale {}",
        cli.wager * f64::from(cli.rounds),
        paid,
        stats.queued,
        stats.delivered,
        stats.dropped,
        stats.stale
    );

    session.teardown();
    drop(session);
    drop(cues);
    cue_task.await.context("Cue processor panicked")?;
    Ok(())
}
