mod ledger;
mod pipeline;
mod rules;
mod source;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use pipeline::RunOutput;
use rules::RuleSet;

#[derive(Parser)]
#[command(name = "invoice_miner", about = "Extract vendor invoices from document text into a ledger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

const DEFAULT_LEDGER: &str = "data/ledger.sqlite";

#[derive(Subcommand)]
enum Commands {
    /// Create an empty ledger database
    Init {
        #[arg(default_value = DEFAULT_LEDGER)]
        ledger: PathBuf,
    },
    /// Extract records and print them without touching the ledger
    Extract {
        /// Input document (.pdf, or form-feed-separated plain text)
        input: PathBuf,
        /// Rule-set JSON (defaults to the built-in tables)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Extract records and append them to the ledger
    Run {
        /// Input document (.pdf, or form-feed-separated plain text)
        input: PathBuf,
        #[arg(short, long, default_value = DEFAULT_LEDGER)]
        ledger: PathBuf,
        /// Rule-set JSON (defaults to the built-in tables)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Show ledger statistics
    Stats {
        #[arg(default_value = DEFAULT_LEDGER)]
        ledger: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { ledger } => {
            ledger::init(&ledger)?;
            println!("Created ledger at {}", ledger.display());
            Ok(())
        }
        Commands::Extract { input, rules } => {
            let rules = load_rules(rules.as_deref())?;
            let output = extract_from(&input, &rules)?;
            print_summary(&output);
            print_records(&output);
            Ok(())
        }
        Commands::Run { input, ledger, rules } => {
            let rules = load_rules(rules.as_deref())?;
            let output = extract_from(&input, &rules)?;
            print_summary(&output);
            print_records(&output);

            if output.records.is_empty() {
                println!("\nNo records to add.");
                return Ok(());
            }

            println!("\nAdding records to the ledger...");
            let source_name = input
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("input");
            let outcome = ledger::append_run(&ledger, &output.records, source_name)?;
            if outcome.diverted {
                println!(
                    "Ledger was locked; wrote {} record(s) to {} instead",
                    outcome.records_added,
                    outcome.destination.display()
                );
            } else {
                println!(
                    "Added {} record(s) to {}",
                    outcome.records_added,
                    outcome.destination.display()
                );
            }
            println!("Logged run to history");
            Ok(())
        }
        Commands::Stats { ledger } => {
            let s = ledger::stats(&ledger)?;
            println!("Invoices: {}", s.invoices);
            println!("Runs:     {}", s.runs);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_rules(path: Option<&Path>) -> anyhow::Result<RuleSet> {
    match path {
        Some(p) => RuleSet::load(p),
        None => Ok(RuleSet::builtin()),
    }
}

fn extract_from(input: &Path, rules: &RuleSet) -> anyhow::Result<RunOutput> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Reading {}...", input.display()));
    pb.enable_steady_tick(Duration::from_millis(80));
    let pages = source::load_pages(input);
    pb.finish_and_clear();

    let pages = pages?;
    println!("Read {} page(s)", pages.len());
    Ok(pipeline::process(&pages, rules))
}

fn print_summary(output: &RunOutput) {
    println!("\nSummary:");
    println!("  - Invoice documents:     {}", output.candidates);
    println!("  - Non-invoice documents: {}", output.rejected);
    for m in &output.merges {
        println!("  - Combined pages {} and {}", m.first, m.second);
    }
}

fn print_records(output: &RunOutput) {
    if output.records.is_empty() {
        println!("\nNo invoice records extracted.");
        return;
    }

    println!(
        "\n{:>3} | {:<5} | {:<25} | {:<40} | {:<12} | {:<10} | {:>10}",
        "#", "Pages", "Vendor", "Service", "Invoice #", "Due Date", "Amount"
    );
    println!("{}", "-".repeat(123));

    for (i, r) in output.records.iter().enumerate() {
        println!(
            "{:>3} | {:<5} | {:<25} | {:<40} | {:<12} | {:<10} | {:>10}",
            i + 1,
            page_range(&r.pages),
            truncate(r.vendor_name.as_deref().unwrap_or("-"), 25),
            truncate(r.service_type.as_deref().unwrap_or("-"), 40),
            r.invoice_number.as_deref().unwrap_or("-"),
            r.invoice_date.as_deref().unwrap_or("-"),
            r.invoice_amount.as_deref().unwrap_or("-"),
        );
    }
    println!("{}", "-".repeat(123));
}

/// Human page numbers: [0] → "1", [0, 1] → "1-2".
fn page_range(pages: &[usize]) -> String {
    match (pages.first(), pages.last()) {
        (Some(a), Some(b)) if a != b => format!("{}-{}", a + 1, b + 1),
        (Some(a), _) => format!("{}", a + 1),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
