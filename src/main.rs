use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use goal2goal::config::{EngineConfig, MAX_SIMULATIONS, clamp_sim_threads};
use goal2goal::simulation::with_sim_pool;
use goal2goal::{MatchPrediction, TeamMatchStats, predict};

const VALUE_FLAGS: &[&str] = &["--match", "--simulations", "--seed", "--league-avg", "--threads"];

#[derive(Debug, Deserialize)]
struct TeamEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    stats: TeamMatchStats,
}

#[derive(Debug, Deserialize)]
struct MatchCase {
    team_a: TeamEntry,
    team_b: TeamEntry,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let path = parse_path_arg().unwrap_or_else(|| PathBuf::from("tests/fixtures/match_case.json"));
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let case: MatchCase =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;

    let mut cfg = EngineConfig::from_env();
    if let Some(n) = parse_u64_arg("--simulations") {
        cfg.run.simulation_count = n.clamp(1, MAX_SIMULATIONS);
    }
    if let Some(seed) = parse_u64_arg("--seed") {
        cfg.run.random_seed = Some(seed);
    }
    if let Some(avg) = parse_f64_arg("--league-avg") {
        cfg.run.league_average_goals = avg;
    }
    if let Some(threads) = parse_usize_arg("--threads") {
        cfg.sim_threads = Some(clamp_sim_threads(threads));
    }

    let pool = cfg.sim_pool();
    let run = cfg.run;
    let prediction = with_sim_pool(&pool, || {
        predict(&case.team_a.stats, &case.team_b.stats, &run)
    })
    .map_err(|err| anyhow!("{} ({})", err, err.kind()))?;

    if has_flag("--json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&prediction).context("serialize prediction")?
        );
    } else if has_flag("--flat") {
        println!(
            "{}",
            serde_json::to_string_pretty(&prediction.simulation.flatten())
                .context("serialize flat report")?
        );
    } else {
        let name_a = case.team_a.name.as_deref().unwrap_or("Team A");
        let name_b = case.team_b.name.as_deref().unwrap_or("Team B");
        print_summary(name_a, name_b, &prediction);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(name_a: &str, name_b: &str, p: &MatchPrediction) {
    let sim = &p.simulation;
    println!("{name_a} vs {name_b}");
    println!(
        "  lambda       {:.3} / {:.3}{}",
        p.team_a.lambda,
        p.team_b.lambda,
        if p.team_a.clamped || p.team_b.clamped {
            "  (clamped)"
        } else {
            ""
        }
    );
    println!(
        "  BTTS (sim)   {:.2}%  [{:.2}, {:.2}]  n={} seed={}",
        sim.btts.probability,
        sim.btts.confidence_interval.lower,
        sim.btts.confidence_interval.upper,
        sim.simulations,
        sim.seed
    );
    println!(
        "  BTTS models  poisson {:.2}%  logistic {:.2}%  -> {:.2}% ({:?}, {:?} confidence)",
        p.models.poisson,
        p.models.logistic,
        p.models.final_probability,
        p.models.recommended,
        p.models.confidence
    );
    println!(
        "  1X2          {:.2}% / {:.2}% / {:.2}%",
        sim.results.team_a_win, sim.results.draw, sim.results.team_b_win
    );
    println!(
        "  O/U 2.5      {:.2}% / {:.2}%",
        sim.over_under.over, sim.over_under.under
    );
    println!(
        "  goals        {:.2}±{:.2} / {:.2}±{:.2}  total {:.2}",
        sim.goals.team_a_avg,
        sim.goals.team_a_std,
        sim.goals.team_b_avg,
        sim.goals.team_b_std,
        sim.goals.total_avg
    );
    let top = sim
        .top_scorelines
        .iter()
        .take(5)
        .map(|s| format!("{} {:.2}%", s.score.label(), s.probability))
        .collect::<Vec<_>>()
        .join(", ");
    println!("  top scores   {top}");
    println!(
        "  volatility   {} (cv {:.2}, std {:.2})",
        sim.volatility.level.label(),
        sim.volatility.coefficient,
        sim.volatility.std
    );
}

fn parse_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut skip_next = false;
    for (idx, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(path) = arg.strip_prefix("--match=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--match"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn parse_f64_arg(name: &str) -> Option<f64> {
    parse_arg(name).and_then(|raw| raw.trim().parse::<f64>().ok())
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    parse_arg(name).and_then(|raw| raw.trim().parse::<u64>().ok())
}

fn parse_usize_arg(name: &str) -> Option<usize> {
    parse_arg(name).and_then(|raw| raw.trim().parse::<usize>().ok())
}

fn parse_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            return Some(raw.to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
        {
            return Some(next.clone());
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
