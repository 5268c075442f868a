//! PCN CLI — run plasmid copy number sweeps and inspect their logs
//!
//! Commands:
//!   pcn init-config <path>  — write a default sweep config
//!   pcn run [config]        — run (or resume) a sweep
//!   pcn stats <log>         — summarise a replicate log
//!   pcn clean [dir]         — remove staged logs of interrupted runs
//!   pcn demo                — run a small sweep in a temp directory

use pcn_core::analysis::{GenerationSeries, MutationTable};
use pcn_core::campaign::{run_sweep, CampaignConfig, CampaignReport, CampaignStatus};
use pcn_core::storage::FsResultStore;
use std::env;
use std::process;

const DEFAULT_CONFIG: &str = "pcn-config.json";

fn print_usage() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║        PCN v0.1 — Plasmid Copy Number Simulator              ║
║        Mutation supply vs. segregational loss                ║
╚══════════════════════════════════════════════════════════════╝

Usage: pcn <command> [options]

Commands:
  init-config [path]   Write a default config (default: {DEFAULT_CONFIG})
  run [config]         Run or resume the sweep described by a config
  stats <log-file>     Summarise a committed replicate log
  clean [dir]          Remove staged logs left by interrupted runs
  demo                 Run a small sweep in a temporary directory

Examples:
  pcn init-config sweep.json
  pcn run sweep.json
  pcn stats pcn-results/logs/d60_g24_mu1.8e-6_pcn100_r0__a3.log
"#
    );
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "init-config" => cmd_init_config(&args[2..]),
        "run" => cmd_run(&args[2..]).await,
        "stats" => cmd_stats(&args[2..]),
        "clean" => cmd_clean(&args[2..]),
        "demo" => cmd_demo().await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("  Error: {}", e);
        process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn cmd_init_config(args: &[String]) -> CliResult {
    let path = args.first().map(String::as_str).unwrap_or(DEFAULT_CONFIG);
    CampaignConfig::default().save(path)?;
    println!("  Wrote default config to {}", path);
    Ok(())
}

async fn cmd_run(args: &[String]) -> CliResult {
    let path = args.first().map(String::as_str).unwrap_or(DEFAULT_CONFIG);
    let config = CampaignConfig::load(path)?;
    println!(
        "\n  Sweep: {} days x {} generations, mu={:e}, pcn {:?}",
        config.simulation.num_days,
        config.simulation.generations_per_day,
        config.simulation.mutation_rate,
        config.plasmid_copy_numbers,
    );
    let reports = run_sweep(&config).await?;
    print_reports(&reports);
    Ok(())
}

fn cmd_stats(args: &[String]) -> CliResult {
    let Some(path) = args.first() else {
        eprintln!("Usage: pcn stats <log-file>");
        return Ok(());
    };
    let table = MutationTable::import_file(path)?;
    let series = GenerationSeries::from_table(&table);

    println!("\n  Log {}", path);
    println!("  {}", "=".repeat(40));
    println!("  Generations:      {}", series.generations());
    println!("  Days:             {}", table.days());
    println!("  New mutations:    {}", series.total_new());
    println!("  Lost mutations:   {}", series.total_lost());
    println!(
        "  Final carriers:   {} ({} fixed)",
        series.muts.last().copied().unwrap_or(0),
        series.fixed.last().copied().unwrap_or(0),
    );
    println!(
        "  Peak mutated:     {} copies",
        series.mutated_copies.iter().max().copied().unwrap_or(0)
    );
    Ok(())
}

fn cmd_clean(args: &[String]) -> CliResult {
    let dir = match args.first() {
        Some(dir) => dir.clone(),
        None => CampaignConfig::default().output_dir.display().to_string(),
    };
    let removed = FsResultStore::open(&dir)?.clear_staged()?;
    println!("  Removed {} staged logs from {}", removed, dir);
    Ok(())
}

async fn cmd_demo() -> CliResult {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║              PCN v0.1 — Demo Sweep                           ║
║     5 days x 24 generations, mu=1e-3, pcn 1 / 10 / 50        ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
    let dir = env::temp_dir().join(format!("pcn-demo-{}", uuid::Uuid::new_v4()));
    let config = CampaignConfig::demo(&dir);

    println!("Step 1: Fresh sweep");
    println!("{}", "-".repeat(60));
    let reports = run_sweep(&config).await?;
    print_reports(&reports);

    println!("\nStep 2: Same sweep again (served from cache)");
    println!("{}", "-".repeat(60));
    let reports = run_sweep(&config).await?;
    print_reports(&reports);

    println!("\n  Results kept in {}", dir.display());
    Ok(())
}

fn print_reports(reports: &[CampaignReport]) {
    for report in reports {
        println!("  {}", report.summary());
        println!("    {}", report.dataset.summary());
        if let CampaignStatus::Incomplete { obtained, requested } = report.status {
            println!(
                "    attempt budget exhausted: only {} of {} informative replicates",
                obtained, requested
            );
        }
    }
}
