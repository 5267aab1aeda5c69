//! Schedule output structures

use crate::loan::LoanStructure;
use crate::metrics::{summarize, LoanMetrics};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single row of the repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-based period number
    pub period: u32,

    /// Payment date, present only when the loan has a first payment date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    pub beginning_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal_paid: f64,
    pub ending_balance: f64,
}

impl PeriodRecord {
    /// Create an empty row for a period
    pub fn new(period: u32) -> Self {
        Self {
            period,
            date: None,
            beginning_balance: 0.0,
            payment: 0.0,
            interest: 0.0,
            principal_paid: 0.0,
            ending_balance: 0.0,
        }
    }
}

/// Complete repayment schedule for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub structure: LoanStructure,

    /// Per-period rate used for interest
    pub periodic_rate: f64,

    /// Scheduled level payment before extras and final reconciliation
    pub level_payment: f64,

    /// Period rows in ascending period order
    pub records: Vec<PeriodRecord>,
}

impl Schedule {
    pub fn new(structure: LoanStructure, periodic_rate: f64, level_payment: f64) -> Self {
        Self {
            structure,
            periodic_rate,
            level_payment,
            records: Vec::new(),
        }
    }

    /// Add a period row
    pub fn add_row(&mut self, row: PeriodRecord) {
        self.records.push(row);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the rows carry payment dates
    pub fn has_dates(&self) -> bool {
        self.records.first().map(|r| r.date.is_some()).unwrap_or(false)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// Get summary statistics
    pub fn summary(&self) -> LoanMetrics {
        summarize(&self.records)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a PeriodRecord;
    type IntoIter = std::slice::Iter<'a, PeriodRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_omitted_from_json_when_absent() {
        let mut row = PeriodRecord::new(1);
        row.payment = 10.0;
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("date"));

        row.date = NaiveDate::from_ymd_opt(2025, 2, 1);
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains(r#""date":"2025-02-01""#));
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = Schedule::new(LoanStructure::Bullet, 0.01, 10.0);
        assert!(schedule.is_empty());
        assert!(!schedule.has_dates());
        assert_eq!(schedule.summary().num_payments, 0);
    }
}
