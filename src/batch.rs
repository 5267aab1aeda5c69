//! Batch runner for schedules over many loans
//!
//! Each loan's period loop is sequential, so the only parallelism is across
//! loans. Results come back in input order, and a loan that fails validation
//! does not stop the rest of the batch. Rows that cannot be parsed never get
//! here: `load_loans` rejects the whole book instead.

use crate::error::Result;
use crate::loan::{LoanRecord, LoanSpec, LoanStructure};
use crate::metrics::LoanMetrics;
use crate::schedule::{Schedule, ScheduleConfig, ScheduleEngine};
use rayon::prelude::*;
use serde::Serialize;

/// Outcome of one loan in a loan-book run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummaryRow {
    pub loan_id: String,
    pub structure: LoanStructure,
    /// Scheduled level payment, rounded to cents
    pub level_payment: f64,
    #[serde(flatten)]
    pub metrics: LoanMetrics,
}

/// Pre-configured runner for batch schedule generation
///
/// # Example
/// ```
/// use loan_amort::{BatchRunner, LoanSpec, LoanStructure};
///
/// let runner = BatchRunner::new();
/// let loans: Vec<_> = [0.03, 0.04, 0.05]
///     .iter()
///     .map(|&rate| LoanSpec::new(200_000.0, rate, 360, 12, LoanStructure::Amortizing))
///     .collect();
///
/// let schedules = runner.run_batch(&loans);
/// assert_eq!(schedules.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    engine: ScheduleEngine,
}

impl BatchRunner {
    /// Create runner with the default schedule config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScheduleConfig) -> Self {
        Self {
            engine: ScheduleEngine::new(config),
        }
    }

    /// Generate a single schedule
    pub fn run(&self, spec: &LoanSpec) -> Result<Schedule> {
        self.engine.generate(spec)
    }

    /// Generate schedules for many loans in parallel, in input order
    pub fn run_batch(&self, specs: &[LoanSpec]) -> Vec<Result<Schedule>> {
        specs.par_iter().map(|spec| self.engine.generate(spec)).collect()
    }

    /// Generate and summarize every loan of a loan book
    pub fn summarize_book(&self, loans: &[LoanRecord]) -> Vec<(String, Result<BatchSummaryRow>)> {
        log::info!("running {} loans", loans.len());

        let rows: Vec<_> = loans
            .par_iter()
            .map(|loan| {
                let row = self.engine.generate(&loan.spec).map(|schedule| BatchSummaryRow {
                    loan_id: loan.loan_id.clone(),
                    structure: schedule.structure,
                    level_payment: self.engine.config().round_money(schedule.level_payment),
                    metrics: schedule.summary(),
                });
                (loan.loan_id.clone(), row)
            })
            .collect();

        let failed = rows.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            log::warn!("{} of {} loans failed validation", failed, loans.len());
        }

        rows
    }
}
