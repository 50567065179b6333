use songpath::experiments::reference::{self, ReferenceConfig};
use songpath::observer::LoopAdapter;

fn main() {
    // Logs go to stderr so `report` and `landscape` emit clean JSON on stdout.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("run");

    let result = match command {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "run" => parse_config(&args[2.min(args.len())..]).and_then(|cfg| run(&cfg)),
        "report" => parse_config(&args[2.min(args.len())..]).and_then(|cfg| report(&cfg)),
        "sweep" => parse_sweep(&args[2.min(args.len())..]).and_then(|(cfg, n)| sweep(&cfg, n)),
        "landscape" => landscape(),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("songpath: reward-modulated Hebbian learning in a songbird-like pathway");
    println!();
    println!("USAGE:");
    println!("  songpath [COMMAND] [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("  run [TRIALS] [SEED]     Run the reference experiment (default)");
    println!("  report [TRIALS] [SEED]  Run, then print reward/trajectory JSON for plotting");
    println!("  sweep [SEEDS] [TRIALS]  Run seeds 0..SEEDS and report which ones improved");
    println!("  landscape               Print the reward landscape grid as JSON");
    println!("  help                    Show this help");
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn parse_config(args: &[String]) -> CliResult<ReferenceConfig> {
    let mut cfg = ReferenceConfig::default();
    if let Some(t) = args.first() {
        cfg.trials = t.parse().map_err(|_| format!("invalid trial count: {t}"))?;
    }
    if let Some(s) = args.get(1) {
        cfg.seed = s.parse().map_err(|_| format!("invalid seed: {s}"))?;
    }
    Ok(cfg)
}

fn parse_sweep(args: &[String]) -> CliResult<(ReferenceConfig, u64)> {
    let mut cfg = ReferenceConfig::default();
    let mut seeds = 10;
    if let Some(n) = args.first() {
        seeds = n.parse().map_err(|_| format!("invalid seed count: {n}"))?;
    }
    if let Some(t) = args.get(1) {
        cfg.trials = t.parse().map_err(|_| format!("invalid trial count: {t}"))?;
    }
    Ok((cfg, seeds))
}

fn run(cfg: &ReferenceConfig) -> CliResult<()> {
    let (_, outcome) = reference::run(cfg)?;
    let s = outcome.summary;

    println!();
    println!("========================================");
    println!("RESULTS (seed {})", outcome.seed);
    println!("========================================");
    println!("  Trials:             {}", s.trials);
    println!("  Mean reward:        {:.3}", s.mean_reward);
    println!(
        "  Early/late reward:  {:.3} -> {:.3} (over {} trials)",
        outcome.early_mean_reward, outcome.late_mean_reward, cfg.summary_window
    );
    println!(
        "  Distance to peak:   {:.3} -> {:.3}",
        outcome.initial_distance, outcome.final_distance
    );
    println!(
        "  Final action:       ({:+.3}, {:+.3})  reward {:.3}",
        s.final_action[0], s.final_action[1], s.final_reward
    );
    println!();
    if outcome.improved() {
        println!("SUCCESS: the pathway climbed the reward hill.");
    } else {
        println!("STALLED: no improvement; the start may sit in the landscape's flat tail.");
        println!("   Try another seed (`songpath sweep` shows which seeds learn).");
    }
    Ok(())
}

fn report(cfg: &ReferenceConfig) -> CliResult<()> {
    let (lp, _) = reference::run(cfg)?;
    let snapshot = LoopAdapter::new(&lp).snapshot(20, cfg.summary_window);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn sweep(cfg: &ReferenceConfig, seeds: u64) -> CliResult<()> {
    let outcomes = reference::sweep(cfg, 0..seeds)?;
    let improved = outcomes.iter().filter(|o| o.improved()).count();
    for o in &outcomes {
        println!(
            "seed={:<4} early={:.3} late={:.3} dist {:.3} -> {:.3} {}",
            o.seed,
            o.early_mean_reward,
            o.late_mean_reward,
            o.initial_distance,
            o.final_distance,
            if o.improved() { "improved" } else { "stalled" }
        );
    }
    println!("{improved}/{} seeds improved", outcomes.len());
    Ok(())
}

fn landscape() -> CliResult<()> {
    let lp = ReferenceConfig::default().build()?;
    let grid = LoopAdapter::new(&lp).landscape_grid(50)?;
    println!("{}", serde_json::to_string_pretty(&grid)?);
    Ok(())
}
