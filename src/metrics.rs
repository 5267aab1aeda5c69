//! Summary metrics over a generated schedule

use crate::schedule::{round_to, PeriodRecord, DEFAULT_CURRENCY_DECIMALS};
use serde::{Deserialize, Serialize};

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanMetrics {
    pub num_payments: usize,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub average_payment: f64,
}

impl LoanMetrics {
    /// Metric names and values in display order
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("num_payments", self.num_payments as f64),
            ("total_payment", self.total_payment),
            ("total_interest", self.total_interest),
            ("total_principal", self.total_principal),
            ("average_payment", self.average_payment),
        ]
    }
}

/// Fold a schedule into summary metrics
///
/// Totals are summed from the emitted rows and rounded once at the end. An empty
/// schedule yields zeros rather than an error.
pub fn summarize(records: &[PeriodRecord]) -> LoanMetrics {
    let num_payments = records.len();
    let total_payment: f64 = records.iter().map(|r| r.payment).sum();
    let total_interest: f64 = records.iter().map(|r| r.interest).sum();
    let total_principal: f64 = records.iter().map(|r| r.principal_paid).sum();

    let average_payment = if num_payments > 0 {
        total_payment / num_payments as f64
    } else {
        0.0
    };

    LoanMetrics {
        num_payments,
        total_payment: round_to(total_payment, DEFAULT_CURRENCY_DECIMALS),
        total_interest: round_to(total_interest, DEFAULT_CURRENCY_DECIMALS),
        total_principal: round_to(total_principal, DEFAULT_CURRENCY_DECIMALS),
        average_payment: round_to(average_payment, DEFAULT_CURRENCY_DECIMALS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{LoanSpec, LoanStructure};
    use crate::schedule::generate;

    fn row(period: u32, payment: f64, interest: f64, principal_paid: f64) -> PeriodRecord {
        PeriodRecord {
            payment,
            interest,
            principal_paid,
            ..PeriodRecord::new(period)
        }
    }

    #[test]
    fn test_empty_schedule() {
        let metrics = summarize(&[]);
        assert_eq!(metrics.num_payments, 0);
        assert_eq!(metrics.total_payment, 0.0);
        assert_eq!(metrics.average_payment, 0.0);
    }

    #[test]
    fn test_field_sums() {
        let rows = vec![
            row(1, 100.10, 10.05, 90.05),
            row(2, 100.10, 9.15, 90.95),
            row(3, 100.11, 8.24, 91.87),
        ];
        let metrics = summarize(&rows);

        assert_eq!(metrics.num_payments, 3);
        assert_eq!(metrics.total_payment, 300.31);
        assert_eq!(metrics.total_interest, 27.44);
        assert_eq!(metrics.total_principal, 272.87);
        assert_eq!(metrics.average_payment, 100.10);
    }

    #[test]
    fn test_zero_rate_loan_metrics() {
        let schedule = generate(&LoanSpec::new(1000.0, 0.0, 4, 4, LoanStructure::Amortizing)).unwrap();
        let metrics = schedule.summary();

        assert_eq!(metrics.num_payments, 4);
        assert_eq!(metrics.total_payment, 1000.0);
        assert_eq!(metrics.total_interest, 0.0);
        assert_eq!(metrics.total_principal, 1000.0);
        assert_eq!(metrics.average_payment, 250.0);
    }

    #[test]
    fn test_total_principal_matches_loan() {
        for structure in [LoanStructure::Amortizing, LoanStructure::Bullet, LoanStructure::InterestOnly] {
            let spec = LoanSpec::new(250_000.0, 0.065, 360, 12, structure);
            let metrics = generate(&spec).unwrap().summary();
            assert_eq!(metrics.total_principal, 250_000.0);
            assert_eq!(
                metrics.total_payment,
                round_to(metrics.total_interest + metrics.total_principal, 2)
            );
        }
    }

    #[test]
    fn test_bullet_interest_total() {
        let spec = LoanSpec::new(1000.0, 0.06, 12, 12, LoanStructure::Bullet);
        let metrics = generate(&spec).unwrap().summary();
        assert_eq!(metrics.total_interest, 60.0);
        assert_eq!(metrics.total_payment, 1060.0);
    }
}
