//! plinko-drop: headless drop runner
//!
//! Usage:
//!   plinko-drop --seed 12345 --drops 100 --stake 1.0
//!   plinko-drop --config board.json --drops 10 --json

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use plinko_drop::{
    DropReport, OutcomeGenerator, OutcomeServer, OutcomeService, PlinkoConfig, Session,
};

/// Simulated frame rate of the headless loop
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames allowed per drop before the run is declared stuck
const FRAMES_PER_DROP: usize = 600;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_opt::<u64>(&args, "--seed");
    let drops = parse_arg(&args, "--drops", 100usize);
    let stake = parse_arg(&args, "--stake", 1.0f64);
    let json_mode = args.iter().any(|a| a == "--json");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => PlinkoConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => {
            let config = PlinkoConfig::default();
            config.validate()?;
            config
        }
    };

    let generator = OutcomeGenerator::new(&config)?;
    let server = match seed {
        Some(seed) => OutcomeServer::with_seed(generator, seed),
        None => OutcomeServer::new(generator),
    };

    if json_mode {
        for _ in 0..drops {
            let response = server.request_outcome()?;
            println!("{}", serde_json::to_string(&response)?);
        }
        return Ok(());
    }

    println!("plinko-drop");
    match seed {
        Some(seed) => println!("  seed:   {seed}"),
        None => println!("  seed:   (os entropy)"),
    }
    println!("  drops:  {drops}");
    println!("  stake:  {stake}");
    println!("  table:  v{}", config.table.version);
    println!();

    let service: Arc<dyn OutcomeService> = Arc::new(server);
    let mut session = Session::new(&config)?;
    let mut requested = 0;
    let mut reports: Vec<DropReport> = Vec::with_capacity(drops);
    let mut frames = 0;
    while requested < drops || !session.is_idle() {
        while requested < drops && session.in_flight() < session.max_in_flight() {
            session.request_drop(Arc::clone(&service))?;
            requested += 1;
        }
        if session.active_balls() == 0 {
            // Nothing falling yet: block on the pending batch instead of spinning frames
            session.wait_for_requests(REQUEST_TIMEOUT);
            if session.in_flight() > 0 {
                bail!("{} outcome requests never resolved", session.in_flight());
            }
        }

        if frames >= FRAMES_PER_DROP * drops.max(1) {
            bail!("{} balls still falling after {frames} frames", session.active_balls());
        }
        for report in session.update(FRAME_DT) {
            println!(
                "ball {:>4}  sink {:>2}  x{:<4}  payout {:.2}{}",
                report.ball_id,
                report.sink,
                report.multiplier,
                report.payout(stake),
                if report.reconciled() { "" } else { "  (MISMATCH)" }
            );
            reports.push(report);
        }
        frames += 1;
    }

    print_summary(&reports, &session, stake, drops);
    Ok(())
}

fn print_summary(reports: &[DropReport], session: &Session, stake: f64, drops: usize) {
    let settled = reports.len();
    let reconciled = reports.iter().filter(|r| r.reconciled()).count();
    let total_payout: f64 = reports.iter().map(|r| r.payout(stake)).sum();
    let wagered = stake * drops as f64;

    println!();
    println!("=== Summary ===");
    println!("  settled:     {settled}/{drops}");
    println!("  escaped:     {}", session.escaped());
    if settled > 0 {
        println!(
            "  on target:   {reconciled}/{settled} ({:.1}%)",
            100.0 * reconciled as f64 / settled as f64
        );
    }
    println!("  wagered:     {wagered:.2}");
    println!("  paid out:    {total_payout:.2}");
    if wagered > 0.0 {
        println!("  return:      {:.4}", total_payout / wagered);
    }
    println!("  theoretical: {:.4}", session.table().expected_return());
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_opt(args, flag).unwrap_or(default)
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}
