//! Kingdom Pressure Simulator
//!
//! Builds a small demo realm, drives the pressure engine for a number of
//! ticks with a scripted player, and prints what the kingdoms feel.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use pressure_engine::{
    default_barks, default_catalog, BarkPools, EngineConfig, EngineError, PressureEngine, Realm,
    SimpleRealm, TemplateCatalog,
};
use pressure_events::Tick;

mod script;
mod setup;

use script::{PlayerMove, PlayerScript};
use setup::{create_realm, kingdom_name, AVALON};

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "pressure_sim")]
#[command(about = "Drives the kingdom pressure engine over a demo realm")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 5000)]
    ticks: u64,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Template catalog (TOML) replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Extra bark pools (TOML) merged over the built-in ones
    #[arg(long)]
    barks: Option<PathBuf>,

    /// Snapshot file to resume from and save to
    #[arg(long)]
    save: Option<PathBuf>,

    /// Interval between status reports (in ticks)
    #[arg(long, default_value_t = 500)]
    report_interval: u64,

    /// Log filter, e.g. "debug" or "pressure_engine=debug"
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(filter) => tracing_subscriber::EnvFilter::new(filter),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn run(args: &Args) -> Result<(), EngineError> {
    println!("Kingdom Pressure Simulator");
    println!("==========================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Report interval: {}", args.report_interval);
    println!();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(path) = &args.save {
        config.persistence.path = Some(path.clone());
    }

    let catalog = match &args.catalog {
        Some(path) => TemplateCatalog::from_file(path)?,
        None => default_catalog(),
    };
    println!("Loaded {} event templates", catalog.len());

    let mut barks = default_barks();
    if let Some(path) = &args.barks {
        barks.merge(BarkPools::from_file(path)?);
    }

    let mut engine = PressureEngine::new(config, catalog, barks, args.seed);
    if let Some(path) = &args.save {
        let restored = engine.load_snapshot(path)?;
        println!("Resumed {} events from {}", restored, path.display());
    }
    let start = engine.resume_tick();
    let end = start.saturating_add(args.ticks);
    if start > 0 {
        println!("Continuing from tick {}", start);
    }

    println!("Creating realm...");
    let mut realm = create_realm();
    for id in realm.kingdom_ids() {
        println!("  {} ({:?})", kingdom_name(&realm, id), realm.controller(id));
    }
    println!("Schedulers: {}", engine.scheduler_names().join(", "));

    let mut script = PlayerScript::new(AVALON, args.seed.wrapping_add(1), 150, 700);
    let report_interval = args.report_interval.max(1);
    let mut notice_count = 0usize;
    let mut action_count = 0usize;
    let mut rejected_count = 0usize;

    println!();
    println!("Starting simulation...");
    println!();

    for now in start..end {
        for m in script.moves(&realm, now) {
            match m {
                PlayerMove::Policy(policy) => match engine.enact_policy(&realm, AVALON, policy, now) {
                    Ok(_) => println!("[Tick {:>5}] Avalon enacts {}", now, policy),
                    Err(e) => println!("[Tick {:>5}] Avalon cannot enact {}: {}", now, policy, e),
                },
                PlayerMove::Action(request) => match engine.apply_action(&mut realm, &request, now) {
                    Ok(applied) => {
                        action_count += 1;
                        println!(
                            "[Tick {:>5}] Avalon {} {}{}",
                            now,
                            applied.action,
                            kingdom_name(&realm, applied.target),
                            applied
                                .bark
                                .as_deref()
                                .map(|line| format!(": \"{}\"", line))
                                .unwrap_or_default()
                        );
                    }
                    Err(e) => {
                        rejected_count += 1;
                        tracing::debug!("Scripted action refused: {}", e);
                    }
                },
            }
        }

        if now % INCOME_INTERVAL == 0 {
            collect_income(&engine, &mut realm, now);
        }

        let report = engine.tick(&mut realm, now);
        for notice in &report.notices {
            notice_count += 1;
            let causer = notice
                .causer
                .map(|k| kingdom_name(&realm, k))
                .unwrap_or_else(|| "the world".to_string());
            println!(
                "[Tick {:>5}] {} -> {}: {}{}",
                now,
                causer,
                kingdom_name(&realm, notice.causee),
                notice.type_id,
                notice
                    .bark
                    .as_deref()
                    .map(|line| format!(" ({})", line))
                    .unwrap_or_default()
            );
        }

        if now > start && now % report_interval == 0 {
            print_report(&engine, &realm, now, end);
        }
    }

    if let Err(e) = engine.flush(end) {
        eprintln!("Warning: Could not write final snapshot: {}", e);
    }

    println!();
    println!("Simulation complete. Ran {} ticks.", args.ticks);
    println!(
        "{} pressure events generated, {} player actions applied, {} refused.",
        notice_count, action_count, rejected_count
    );
    println!("{} events still active.", engine.store().event_count());
    Ok(())
}

const INCOME_INTERVAL: Tick = 100;
const BASE_GOLD_INCOME: f64 = 20.0;
const BASE_FOOD_INCOME: f64 = 12.0;

/// Pays every kingdom its economy-scaled gold and food.
fn collect_income(engine: &PressureEngine, realm: &mut SimpleRealm, now: Tick) {
    for id in realm.kingdom_ids() {
        let gold = engine.apply_economy(id, BASE_GOLD_INCOME, now);
        let food = engine.apply_economy(id, BASE_FOOD_INCOME, now);
        if let Some(ledger) = realm.ledger_mut(id) {
            ledger.gold += gold;
            ledger.food += food;
        }
    }
}

fn print_report(engine: &PressureEngine, realm: &SimpleRealm, now: Tick, total: Tick) {
    println!();
    println!("Tick {} / {}", now, total);
    for id in realm.kingdom_ids() {
        let mods = engine.mods(id, now);
        let (gold, food) = realm.ledger(id).map_or((0.0, 0.0), |l| (l.gold, l.food));
        println!(
            "  {:<8} econ x{:.3} happy {:+.2} sec {:+.2} gold {:.0} food {:.0} ({} events)",
            kingdom_name(realm, id),
            mods.economy_mult,
            mods.happiness_delta,
            mods.security_delta,
            gold,
            food,
            engine.events(id).len()
        );
    }
    for id in realm.ai_kingdoms() {
        println!(
            "  Avalon sees {:<8} at {:+.1}",
            kingdom_name(realm, id),
            engine.relation_between(realm, AVALON, id, now)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressure_engine::type_ids;

    #[test]
    fn test_income_follows_economy() {
        let mut engine = PressureEngine::with_defaults(EngineConfig::default(), 1);
        let mut realm = create_realm();
        let before = *realm.ledger(AVALON).unwrap();

        engine
            .enact_policy(&realm, AVALON, type_ids::PUSH_PRODUCTION, 0)
            .unwrap();
        collect_income(&engine, &mut realm, 0);

        let after = realm.ledger(AVALON).unwrap();
        assert!((after.gold - before.gold - BASE_GOLD_INCOME * 1.12).abs() < 1e-9);
        assert!((after.food - before.food - BASE_FOOD_INCOME * 1.12).abs() < 1e-9);
    }
}
