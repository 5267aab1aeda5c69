//! Loan Amortization - repayment schedules and summary metrics for loans
//!
//! This library provides:
//! - Periodic repayment schedules for amortizing, bullet and interest-only loans
//! - Extra principal payments keyed by period number or payment date
//! - Final-period reconciliation so every schedule ends at exactly zero
//! - Summary metrics over a schedule
//! - Parallel batch runs over a loan book
//! - Table, CSV, JSON and chart-series rendering for callers

pub mod error;
pub mod loan;
pub mod schedule;
pub mod metrics;
pub mod batch;
pub mod report;
pub mod interactive;

// Re-export commonly used types
pub use error::{AmortError, Result};
pub use loan::{LoanSpec, LoanStructure, PeriodKey, LoanRecord};
pub use schedule::{generate, ScheduleEngine, ScheduleConfig, ExtraPaymentPolicy, PeriodRecord, Schedule};
pub use metrics::{summarize, LoanMetrics};
pub use batch::{BatchRunner, BatchSummaryRow};
