//! Rendering of schedules and metrics for terminals, CSV files and charts
//!
//! Everything here reads a finished `Schedule`; nothing feeds back into it.

use crate::metrics::LoanMetrics;
use crate::schedule::{round_to, PeriodRecord, Schedule, DEFAULT_CURRENCY_DECIMALS};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column headers of the tabular export, `date` only on dated schedules
pub fn schedule_headers(with_dates: bool) -> Vec<&'static str> {
    let mut headers = vec!["period"];
    if with_dates {
        headers.push("date");
    }
    headers.extend(["beginning_balance", "payment", "interest", "principal_paid", "ending_balance"]);
    headers
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

/// Write the schedule as CSV, one row per period
pub fn write_schedule_csv<W: Write>(schedule: &Schedule, writer: W) -> csv::Result<()> {
    let with_dates = schedule.has_dates();
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(schedule_headers(with_dates))?;

    for row in schedule {
        let mut record = vec![row.period.to_string()];
        if with_dates {
            record.push(format_date(row.date));
        }
        record.extend([
            money(row.beginning_balance),
            money(row.payment),
            money(row.interest),
            money(row.principal_paid),
            money(row.ending_balance),
        ]);
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Fixed-width text table: a header line then one line per period
pub fn render_schedule_table(schedule: &Schedule) -> String {
    let with_dates = schedule.has_dates();
    let mut out = String::new();

    let _ = write!(out, "{:>6} ", "Period");
    if with_dates {
        let _ = write!(out, "{:>12} ", "Date");
    }
    let _ = writeln!(
        out,
        "{:>14} {:>10} {:>10} {:>10} {:>14}",
        "Beginning", "Payment", "Interest", "Principal", "Balance"
    );

    for row in schedule {
        let _ = write!(out, "{:>6} ", row.period);
        if with_dates {
            let _ = write!(out, "{:>12} ", format_date(row.date));
        }
        let _ = writeln!(
            out,
            "{:>14.2} {:>10.2} {:>10.2} {:>10.2} {:>14.2}",
            row.beginning_balance, row.payment, row.interest, row.principal_paid, row.ending_balance
        );
    }

    out
}

/// `name: value` lines, one per metric
pub fn render_metrics(metrics: &LoanMetrics) -> String {
    let mut out = String::new();
    for (name, value) in metrics.fields() {
        if name == "num_payments" {
            let _ = writeln!(out, "{:15}: {}", name, metrics.num_payments);
        } else {
            let _ = writeln!(out, "{:15}: {:.2}", name, value);
        }
    }
    out
}

/// Write metrics as `metric,value` CSV rows, money to two decimals
pub fn write_metrics_csv<W: Write>(metrics: &LoanMetrics, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["metric", "value"])?;

    for (name, value) in metrics.fields() {
        let value = if name == "num_payments" {
            metrics.num_payments.to_string()
        } else {
            money(value)
        };
        wtr.write_record([name, value.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// One point of the chart feed: per-period values plus running totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub ending_balance: f64,
    pub interest: f64,
    pub principal_paid: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

/// Running sums of interest and principal across the schedule
pub fn cumulative_series(records: &[PeriodRecord]) -> Vec<SeriesPoint> {
    let mut cumulative_interest = 0.0;
    let mut cumulative_principal = 0.0;

    records
        .iter()
        .map(|row| {
            cumulative_interest += row.interest;
            cumulative_principal += row.principal_paid;
            SeriesPoint {
                period: row.period,
                date: row.date,
                ending_balance: row.ending_balance,
                interest: row.interest,
                principal_paid: row.principal_paid,
                cumulative_interest: round_to(cumulative_interest, DEFAULT_CURRENCY_DECIMALS),
                cumulative_principal: round_to(cumulative_principal, DEFAULT_CURRENCY_DECIMALS),
            }
        })
        .collect()
}

/// Write the chart feed as CSV; the x column is `date` when present, else `period`
pub fn write_series_csv<W: Write>(series: &[SeriesPoint], writer: W) -> csv::Result<()> {
    let with_dates = series.first().map(|p| p.date.is_some()).unwrap_or(false);
    let mut wtr = csv::Writer::from_writer(writer);

    let x = if with_dates { "date" } else { "period" };
    wtr.write_record([
        x,
        "ending_balance",
        "interest",
        "principal_paid",
        "cumulative_interest",
        "cumulative_principal",
    ])?;

    for point in series {
        let x = if with_dates {
            format_date(point.date)
        } else {
            point.period.to_string()
        };
        wtr.write_record([
            x,
            money(point.ending_balance),
            money(point.interest),
            money(point.principal_paid),
            money(point.cumulative_interest),
            money(point.cumulative_principal),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Pretty JSON for any serializable output
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
