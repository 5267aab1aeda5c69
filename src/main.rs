//! Loan Amortization CLI
//!
//! Command-line interface for generating repayment schedules and metrics

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use loan_amort::interactive::run_interactive;
use loan_amort::loan::load_loans;
use loan_amort::report::{
    cumulative_series, render_metrics, render_schedule_table, to_json, write_metrics_csv, write_schedule_csv,
    write_series_csv,
};
use loan_amort::{BatchRunner, LoanSpec, LoanStructure, PeriodKey, ScheduleConfig, ScheduleEngine};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

/// Loan amortization schedules and summary metrics
#[derive(Parser)]
#[command(name = "loan_amort", version, about)]
struct Cli {
    /// Runs the interactive prompt when omitted
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// JSON schedule config (currency_decimals, extra_payment_policy)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print full amortization schedule
    Amortize(LoanArgs),
    /// Print loan summary metrics
    Metrics(LoanArgs),
    /// Print cumulative interest and principal series for charting
    Series(LoanArgs),
    /// Summarize every loan of a CSV loan book in parallel
    Batch(BatchArgs),
    /// Collect parameters at a prompt and pick outputs from a menu
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("term").required(true).args(["years", "term_periods"])))]
struct LoanArgs {
    /// Loan principal (e.g. 250000)
    #[arg(short = 'P', long)]
    principal: f64,

    /// Annual rate as decimal (e.g. 0.05)
    #[arg(short = 'r', long)]
    rate: f64,

    /// Term in years (e.g. 30)
    #[arg(short = 'y', long)]
    years: Option<u32>,

    /// Term as a number of payment periods
    #[arg(short = 'n', long)]
    term_periods: Option<u32>,

    /// Payments per year
    #[arg(short = 'k', long, default_value_t = 12)]
    per_year: u32,

    /// Date of first payment (YYYY-MM-DD)
    #[arg(long)]
    first_date: Option<NaiveDate>,

    /// amortizing, bullet or interest-only
    #[arg(long, default_value = "amortizing")]
    structure: LoanStructure,

    /// Extra principal as PERIOD=AMOUNT or YYYY-MM-DD=AMOUNT (repeatable)
    #[arg(long = "extra", value_parser = parse_extra_payment)]
    extra: Vec<(PeriodKey, f64)>,
}

impl LoanArgs {
    fn to_spec(&self) -> loan_amort::Result<LoanSpec> {
        let mut spec = match (self.years, self.term_periods) {
            (Some(years), _) => LoanSpec::from_years(self.principal, self.rate, years, self.per_year, self.structure)?,
            (None, Some(n)) => LoanSpec::new(self.principal, self.rate, n, self.per_year, self.structure),
            (None, None) => LoanSpec::new(self.principal, self.rate, 0, self.per_year, self.structure),
        };

        if let Some(date) = self.first_date {
            spec = spec.with_first_payment_date(date);
        }
        for &(key, amount) in &self.extra {
            spec = spec.with_extra_payment(key, amount);
        }
        Ok(spec)
    }
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Loan-book CSV (loan_id,principal,annual_rate,term_periods[,periods_per_year,structure,first_payment_date])
    #[arg(short, long)]
    input: PathBuf,
}

fn parse_extra_payment(s: &str) -> Result<(PeriodKey, f64), String> {
    let (key, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PERIOD=AMOUNT, got `{}`", s))?;
    let key = key.parse::<PeriodKey>().map_err(|e| e.to_string())?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad amount `{}`: {}", amount, e))?;
    Ok((key, amount))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ScheduleConfig::from_json_path(path)
            .map_err(|e| anyhow!("loading config {}: {}", path.display(), e))?,
        None => ScheduleConfig::default(),
    };
    log::debug!("schedule config: {:?}", config);

    let engine = ScheduleEngine::new(config.clone());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Amortize(args) => {
            let schedule = engine.generate(&args.to_spec()?)?;
            match cli.format {
                OutputFormat::Table => write!(out, "{}", render_schedule_table(&schedule))?,
                OutputFormat::Csv => write_schedule_csv(&schedule, &mut out)?,
                OutputFormat::Json => writeln!(out, "{}", to_json(&schedule)?)?,
            }
        }
        Commands::Metrics(args) => {
            let metrics = engine.generate(&args.to_spec()?)?.summary();
            match cli.format {
                OutputFormat::Table => write!(out, "{}", render_metrics(&metrics))?,
                OutputFormat::Csv => write_metrics_csv(&metrics, &mut out)?,
                OutputFormat::Json => writeln!(out, "{}", to_json(&metrics)?)?,
            }
        }
        Commands::Series(args) => {
            let schedule = engine.generate(&args.to_spec()?)?;
            let series = cumulative_series(&schedule.records);
            match cli.format {
                OutputFormat::Json => writeln!(out, "{}", to_json(&series)?)?,
                OutputFormat::Table | OutputFormat::Csv => write_series_csv(&series, &mut out)?,
            }
        }
        Commands::Batch(args) => {
            let loans = load_loans(&args.input)
                .map_err(|e| anyhow!("loading loan book {}: {}", args.input.display(), e))?;
            let rows = BatchRunner::with_config(config).summarize_book(&loans);
            write_batch(&rows, cli.format, &mut out)?;
        }
        Commands::Interactive => {
            let stdin = io::stdin();
            run_interactive(stdin.lock(), &mut out, &engine).context("interactive session")?;
        }
    }

    out.flush()?;
    Ok(())
}

type BatchRows = [(String, loan_amort::Result<loan_amort::BatchSummaryRow>)];

fn write_batch<W: Write>(rows: &BatchRows, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let values: Vec<serde_json::Value> = rows
            .iter()
            .map(|(loan_id, row)| match row {
                Ok(row) => serde_json::to_value(row),
                Err(e) => Ok(serde_json::json!({ "loan_id": loan_id, "error": e.to_string() })),
            })
            .collect::<Result<_, _>>()?;
        writeln!(out, "{}", serde_json::to_string_pretty(&values)?)?;
        return Ok(());
    }

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "loan_id",
        "structure",
        "level_payment",
        "num_payments",
        "total_payment",
        "total_interest",
        "total_principal",
        "average_payment",
        "error",
    ])?;

    for (loan_id, row) in rows {
        let record = match row {
            Ok(row) => vec![
                loan_id.clone(),
                row.structure.to_string(),
                format!("{:.2}", row.level_payment),
                row.metrics.num_payments.to_string(),
                format!("{:.2}", row.metrics.total_payment),
                format!("{:.2}", row.metrics.total_interest),
                format!("{:.2}", row.metrics.total_principal),
                format!("{:.2}", row.metrics.average_payment),
                String::new(),
            ],
            Err(e) => {
                let mut record = vec![loan_id.clone()];
                record.extend(std::iter::repeat(String::new()).take(7));
                record.push(e.to_string());
                record
            }
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
