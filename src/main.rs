//! Loan Valuation CLI
//!
//! Command-line interface for projecting loan cash flows and solving IRRs

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use loan_valuation::loan::{load_loan, load_loan_tape};
use loan_valuation::projection::Annualization;
use loan_valuation::{report, LoanValuer, StressScenario, ValuationConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Cash-flow projection and IRR valuation for amortizing consumer loans
#[derive(Parser)]
#[command(name = "loan-valuation", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Directory holding charged_off.csv and prepay.csv
    #[arg(long, global = true)]
    curves: Option<PathBuf>,

    /// How the monthly IRR is annualized
    #[arg(long, value_enum, global = true)]
    annualization: Option<Annualization>,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a single loan described by a JSON file
    Value {
        /// Loan terms JSON file
        #[arg(long)]
        loan: PathBuf,

        /// Write the schedule to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the valuation as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Value every loan on a CSV loan tape in parallel
    Batch {
        /// Loan tape CSV file
        #[arg(long)]
        tape: PathBuf,

        /// Write per-loan results to this CSV file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Re-value a loan under a grid of default and prepay multipliers
    Stress {
        /// Loan terms JSON file
        #[arg(long)]
        loan: PathBuf,

        #[arg(long, value_delimiter = ',', default_value = "1.0")]
        default_multipliers: Vec<f64>,

        #[arg(long, value_delimiter = ',', default_value = "1.0")]
        prepay_multipliers: Vec<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = ValuationConfig::from_env().context("invalid environment configuration")?;
    if let Some(dir) = cli.common.curves {
        config.curves_dir = dir;
    }
    if let Some(annualization) = cli.common.annualization {
        config.irr.annualization = annualization;
    }

    let start = Instant::now();
    let valuer = LoanValuer::from_config(&config)
        .with_context(|| format!("failed to load curves from {}", config.curves_dir.display()))?;
    log::info!("loaded curves in {:?}", start.elapsed());

    match cli.command {
        Commands::Value { loan, output, json } => {
            let terms = load_loan(&loan).with_context(|| format!("failed to load loan {}", loan.display()))?;
            let valuation = valuer.value(&terms)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                writeln!(out, "{}", report::to_json(&valuation)?)?;
            } else {
                report::write_valuation(&mut out, &valuation)?;
            }

            if let Some(path) = output {
                report::save_schedule_csv(&path, &valuation.schedule)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log::info!("schedule written to {}", path.display());
            }
        }
        Commands::Batch { tape, output } => {
            let loans = load_loan_tape(&tape).with_context(|| format!("failed to load tape {}", tape.display()))?;
            log::info!("loaded {} loans from {}", loans.len(), tape.display());

            let run_start = Instant::now();
            let outcomes = valuer.value_batch(&loans);
            let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
            log::info!(
                "valued {} loans in {:?}, {} failed",
                outcomes.len(),
                run_start.elapsed(),
                failures
            );

            match output {
                Some(path) => {
                    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
                    report::write_batch_csv(BufWriter::new(file), &outcomes)?;
                }
                None => report::write_batch_csv(io::stdout().lock(), &outcomes)?,
            }
        }
        Commands::Stress {
            loan,
            default_multipliers,
            prepay_multipliers,
        } => {
            if default_multipliers.iter().chain(&prepay_multipliers).any(|m| *m < 0.0) {
                bail!("multipliers must be non-negative");
            }
            let terms = load_loan(&loan).with_context(|| format!("failed to load loan {}", loan.display()))?;

            let scenarios: Vec<StressScenario> = default_multipliers
                .iter()
                .flat_map(|&d| {
                    prepay_multipliers.iter().map(move |&p| StressScenario {
                        default_multiplier: d,
                        prepay_multiplier: p,
                    })
                })
                .collect();

            let results = valuer.value_scenarios(&terms, &scenarios);

            println!("{:>10} {:>10} {:>12}", "DefaultX", "PrepayX", "IRR");
            println!("{}", "-".repeat(34));
            for (scenario, result) in scenarios.iter().zip(results) {
                match result {
                    Ok(valuation) => println!(
                        "{:>10.3} {:>10.3} {:>12.4}",
                        scenario.default_multiplier, scenario.prepay_multiplier, valuation.irr.display_pct
                    ),
                    Err(e) => println!(
                        "{:>10.3} {:>10.3} {:>12}  ({})",
                        scenario.default_multiplier, scenario.prepay_multiplier, "n/a", e
                    ),
                }
            }
        }
    }

    Ok(())
}
