//! Prompt-driven session: collect loan parameters once, then serve a menu
//!
//! The session only dispatches to the same library calls the subcommands use.
//! It is generic over its input and output so it can be driven from a buffer.

use crate::loan::{LoanSpec, LoanStructure};
use crate::report::{cumulative_series, render_metrics, render_schedule_table, write_series_csv};
use crate::schedule::{Schedule, ScheduleEngine};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

const MENU: &str = "
What would you like to do?
  1) Print amortization schedule
  2) Show summary metrics
  3) Print cumulative interest and principal series
  4) Exit
";

/// Menu entries of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Schedule,
    Metrics,
    Series,
    Exit,
}

impl Request {
    fn parse(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(Request::Schedule),
            "2" => Some(Request::Metrics),
            "3" => Some(Request::Series),
            "4" => Some(Request::Exit),
            _ => None,
        }
    }
}

struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Next trimmed line, `None` once input is exhausted
    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("reading input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt, then read; end of input is not an error here
    fn read_line_after(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        self.read_line()
    }

    fn ask(&mut self, prompt: &str) -> anyhow::Result<String> {
        match self.read_line_after(prompt)? {
            Some(answer) => Ok(answer),
            None => bail!("input closed while waiting for: {}", prompt.trim()),
        }
    }

    /// Ask until the answer parses; a blank answer takes `default` when given
    fn ask_parsed<T>(&mut self, prompt: &str, default: Option<T>) -> anyhow::Result<T>
    where
        T: FromStr + Copy,
        T::Err: Display,
    {
        loop {
            let answer = self.ask(prompt)?;
            if answer.is_empty() {
                if let Some(value) = default {
                    return Ok(value);
                }
            }
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "Invalid input `{}`: {}", answer, e)?,
            }
        }
    }

    fn ask_date(&mut self, prompt: &str) -> anyhow::Result<Option<NaiveDate>> {
        loop {
            let answer = self.ask(prompt)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                Ok(date) => return Ok(Some(date)),
                Err(e) => writeln!(self.output, "Invalid date `{}`: {}", answer, e)?,
            }
        }
    }

    fn collect_spec(&mut self) -> anyhow::Result<anyhow::Result<LoanSpec>> {
        let principal: f64 = self.ask_parsed("What is the loan principal? ", None)?;
        let rate: f64 = self.ask_parsed("What is the annual interest rate (decimal, e.g. 0.05)? ", None)?;
        let years: u32 = self.ask_parsed("What is the term in years? ", None)?;
        let per_year: u32 = self.ask_parsed("Payments per year [12]? ", Some(12))?;
        let structure: LoanStructure = self.ask_parsed(
            "Loan structure (amortizing, bullet, interest-only) [amortizing]? ",
            Some(LoanStructure::Amortizing),
        )?;
        let first_date = self.ask_date("What is the date of the first payment (YYYY-MM-DD, blank for none)? ")?;

        let spec = LoanSpec::from_years(principal, rate, years, per_year, structure).map(|spec| match first_date {
            Some(date) => spec.with_first_payment_date(date),
            None => spec,
        });
        Ok(spec.map_err(Into::into))
    }
}

/// Run a full interactive session until the user exits or input ends
pub fn run_interactive<R: BufRead, W: Write>(input: R, output: W, engine: &ScheduleEngine) -> anyhow::Result<()> {
    let mut prompter = Prompter { input, output };

    // Gather inputs until they describe a valid loan
    let schedule: Schedule = loop {
        match prompter.collect_spec()?.and_then(|spec| engine.generate(&spec).map_err(Into::into)) {
            Ok(schedule) => break schedule,
            Err(e) => writeln!(prompter.output, "Error: {}. Let's try again.\n", e)?,
        }
    };
    log::debug!("interactive session generated {} periods", schedule.len());

    loop {
        write!(prompter.output, "{}", MENU)?;
        let choice = match prompter.read_line_after("Enter 1, 2, 3 or 4: ")? {
            Some(choice) => choice,
            None => break,
        };

        match Request::parse(&choice) {
            Some(Request::Schedule) => write!(prompter.output, "{}", render_schedule_table(&schedule))?,
            Some(Request::Metrics) => write!(prompter.output, "{}", render_metrics(&schedule.summary()))?,
            Some(Request::Series) => {
                write_series_csv(&cumulative_series(&schedule.records), &mut prompter.output)?;
            }
            Some(Request::Exit) => {
                writeln!(prompter.output, "Goodbye!")?;
                break;
            }
            None => writeln!(prompter.output, "Invalid choice, please enter 1, 2, 3 or 4.")?,
        }
    }

    prompter.output.flush()?;
    Ok(())
}
