use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vigil_core::{ActorId, PresenceSensor, VigilConfig};
use vigil_memory::{ConsolidationPhase, CoreSnapshot, Relationship, Resumption, SalienceCore};

mod scenario;

use scenario::{Director, Scenario, Stage};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scripted scenario through the salience core
    Run(RunArgs),
    /// Print the default configuration as TOML
    Defaults,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to a TOML config file
    #[arg(short, long, env = "VIGIL_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Scenario::Encounter)]
    scenario: Scenario,

    /// Emit JSON logs and a JSON report instead of a text summary
    #[arg(long)]
    json: bool,

    /// Seed for scenario jitter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Override simulation.duration_secs
    #[arg(long)]
    duration: Option<f32>,

    /// Sleep between ticks to run in wall-clock time
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Serialize)]
struct TransitionRecord {
    at_secs: f32,
    from: ConsolidationPhase,
    to: ConsolidationPhase,
}

#[derive(Debug, Serialize)]
struct RunReport {
    scenario: Scenario,
    seed: u64,
    duration_secs: f32,
    ticks: usize,
    transitions: Vec<TransitionRecord>,
    resumptions: Vec<Resumption>,
    relationships: Vec<(ActorId, Relationship)>,
    #[serde(rename = "final")]
    final_state: CoreSnapshot,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Defaults => {
            let text = toml::to_string_pretty(&VigilConfig::default())
                .context("Failed to serialize default config")?;
            println!("{}", text);
            Ok(())
        }
        Command::Run(args) => {
            init_tracing(args.json);
            run(args).await
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => VigilConfig::load(path)?,
        None => VigilConfig::load_or_default("vigil.toml"),
    };
    if let Some(duration) = args.duration {
        config.simulation.duration_secs = duration;
    }
    if args.realtime {
        config.simulation.realtime = true;
    }

    let sim = config.simulation.clone();
    let dt = 1.0 / sim.tick_hz;
    let ticks = (sim.duration_secs * sim.tick_hz).round().max(0.0) as usize;

    info!(
        "Running {:?} for {:.0}s at {:.0} Hz (seed {})",
        args.scenario, sim.duration_secs, sim.tick_hz, args.seed
    );

    let mut core = SalienceCore::with_config(&config);
    let mut stage = Stage::default();
    let mut director = Director::new(args.scenario, args.seed, sim.duration_secs);
    for (actor, trust) in director.prior_relationships() {
        core.memory_mut().record_encounter(&actor);
        core.memory_mut().adjust_trust(&actor, trust);
    }

    // Stand-in for a presentation layer following the phase broadcast.
    let mut phases = core.subscribe_phase();
    let observer = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            debug!("Presentation layer observed phase {:?}", phase);
        }
    });

    let mut transitions = Vec::new();
    let mut resumptions = Vec::new();
    let mut focus = None;

    for i in 0..ticks {
        let t = i as f32 * dt;
        let state = director.direct(t, &mut stage);

        for actor in stage.take_departures() {
            core.memory_mut().record_encounter(&actor);
        }
        if let Some((actor, delta)) = stage.trust_delta(dt) {
            core.memory_mut().adjust_trust(&actor, delta);
        }
        let trust = stage
            .closest_actor()
            .map_or(0.0, |actor| core.memory().trust(&actor));

        let report = core.tick(dt, &stage.senses(state, trust));

        if let Some(transition) = report.transition {
            transitions.push(TransitionRecord {
                at_secs: t,
                from: transition.from,
                to: transition.to,
            });
        }
        if let Some(resumption) = core.take_pending_resumption() {
            info!(
                "Resumed after {:.1}s idle, woken by {}",
                resumption.idle_duration,
                resumption
                    .actor
                    .as_ref()
                    .map_or("nobody".to_string(), ActorId::to_string)
            );
            resumptions.push(resumption);
        }
        if report.attention_fired && core.attention().focus_slot() != focus {
            focus = core.attention().focus_slot();
            info!("t={:.1}s focus -> {:?}", t, focus);
        }

        if sim.realtime {
            tokio::time::sleep(Duration::from_secs_f32(dt)).await;
        } else if i % 256 == 0 {
            tokio::task::yield_now().await;
        }
    }

    if args.scenario == Scenario::Crowd {
        info!("{} guest arrivals", director.guests());
    }

    let mut relationships: Vec<(ActorId, Relationship)> = core
        .memory()
        .iter()
        .map(|(actor, relationship)| (actor.clone(), *relationship))
        .collect();
    relationships.sort_by(|a, b| a.0.cmp(&b.0));

    let report = RunReport {
        scenario: args.scenario,
        seed: args.seed,
        duration_secs: sim.duration_secs,
        ticks,
        transitions,
        resumptions,
        relationships,
        final_state: core.snapshot(),
    };

    drop(core);
    observer.await.context("Phase observer task failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let snapshot = &report.final_state;
    println!(
        "Scenario {:?} (seed {}): {} ticks, {:.1}s simulated",
        report.scenario, report.seed, report.ticks, snapshot.elapsed_secs
    );

    println!("Phase transitions:");
    for t in &report.transitions {
        println!("  {:>7.1}s  {:?} -> {:?}", t.at_secs, t.from, t.to);
    }
    for r in &report.resumptions {
        println!(
            "Resumption: {} after {:.1}s idle",
            r.actor.as_ref().map_or("unknown actor".to_string(), ActorId::to_string),
            r.idle_duration
        );
    }

    println!(
        "Consolidation: phase {:?}, {} passes total",
        snapshot.consolidation.phase, snapshot.consolidation.total_consolidations
    );
    println!(
        "Attention: focus {:?}, remaining budget {:.2}, {} attended",
        snapshot.attention.focus_slot,
        snapshot.attention.remaining_budget,
        snapshot.attention.attended_count
    );
    println!(
        "Curiosity: aggregate {:.2}, bias {:.3}",
        snapshot.novelty.aggregate_curiosity, snapshot.novelty.curiosity_bias
    );
    println!(
        "Gain ({:?}): {:?}",
        snapshot.gain.state,
        snapshot.gain.current.as_array()
    );

    if !report.relationships.is_empty() {
        println!("Relationships:");
        for (actor, r) in &report.relationships {
            println!(
                "  {:<12} trust {:+.3}  encounters {}",
                actor.as_str(),
                r.trust,
                r.encounters
            );
        }
    }
}
