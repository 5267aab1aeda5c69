//! Loan parameter structures

use crate::error::{AmortError, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Repayment structure of a loan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanStructure {
    /// Level payments that retire principal every period
    #[default]
    Amortizing,
    /// Interest each period, all principal at maturity
    Bullet,
    /// Same cashflows as `Bullet`; kept as a separate name for callers
    InterestOnly,
}

impl LoanStructure {
    pub fn is_amortizing(&self) -> bool {
        matches!(self, LoanStructure::Amortizing)
    }

    /// Label used on the command line and in loan-book files
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStructure::Amortizing => "amortizing",
            LoanStructure::Bullet => "bullet",
            LoanStructure::InterestOnly => "interest-only",
        }
    }
}

impl fmt::Display for LoanStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStructure {
    type Err = AmortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amortizing" => Ok(LoanStructure::Amortizing),
            "bullet" => Ok(LoanStructure::Bullet),
            "interest-only" | "interest_only" | "interestonly" => Ok(LoanStructure::InterestOnly),
            other => Err(AmortError::UnsupportedStructure(other.to_string())),
        }
    }
}

/// Identifies a period by its 1-based index or by its payment date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Index(u32),
    Date(NaiveDate),
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Index(index) => write!(f, "{}", index),
            PeriodKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = AmortError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(index) = s.parse::<u32>() {
            return Ok(PeriodKey::Index(index));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(PeriodKey::Date)
            .map_err(|_| {
                AmortError::invalid(
                    "extra_payments",
                    format!("period key `{}` is neither a period number nor a YYYY-MM-DD date", s),
                )
            })
    }
}

/// Loan parameters supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct LoanSpec {
    /// Loan amount at period 0
    pub principal: f64,

    /// Nominal annual rate as a decimal fraction (0.05 = 5%)
    pub annual_rate: f64,

    /// Total number of payment periods
    pub term_periods: u32,

    /// Payment periods per year (12 for monthly)
    pub periods_per_year: u32,

    pub structure: LoanStructure,

    /// Date of the first payment; periods are plain ordinals without it
    pub first_payment_date: Option<NaiveDate>,

    /// Additional principal keyed by period, amortizing loans only
    pub extra_payments: BTreeMap<PeriodKey, f64>,
}

impl LoanSpec {
    pub fn new(
        principal: f64,
        annual_rate: f64,
        term_periods: u32,
        periods_per_year: u32,
        structure: LoanStructure,
    ) -> Self {
        Self {
            principal,
            annual_rate,
            term_periods,
            periods_per_year,
            structure,
            first_payment_date: None,
            extra_payments: BTreeMap::new(),
        }
    }

    /// Build a loan whose term is given in whole years
    pub fn from_years(
        principal: f64,
        annual_rate: f64,
        years: u32,
        periods_per_year: u32,
        structure: LoanStructure,
    ) -> Result<Self> {
        let term_periods = years.checked_mul(periods_per_year).ok_or_else(|| {
            AmortError::invalid(
                "term_periods",
                format!("{} years at {} periods per year overflows the period count", years, periods_per_year),
            )
        })?;
        Ok(Self::new(principal, annual_rate, term_periods, periods_per_year, structure))
    }

    pub fn with_first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    /// Add extra principal on a period; repeated keys accumulate
    pub fn with_extra_payment(mut self, key: PeriodKey, amount: f64) -> Self {
        *self.extra_payments.entry(key).or_insert(0.0) += amount;
        self
    }

    /// Periodic rate r = annual_rate / periods_per_year
    pub fn periodic_rate(&self) -> f64 {
        self.annual_rate / self.periods_per_year as f64
    }

    /// Whole months between consecutive payment dates
    pub fn months_between_payments(&self) -> u32 {
        12 / self.periods_per_year.max(1)
    }

    /// Check every precondition; nothing is computed when this fails
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(AmortError::invalid(
                "principal",
                format!("must be a positive amount, got {}", self.principal),
            ));
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(AmortError::invalid(
                "annual_rate",
                format!("must be a non-negative decimal fraction, got {}", self.annual_rate),
            ));
        }
        if self.term_periods == 0 {
            return Err(AmortError::invalid("term_periods", "must be at least 1"));
        }
        if self.periods_per_year == 0 {
            return Err(AmortError::invalid("periods_per_year", "must be at least 1"));
        }

        for (key, amount) in &self.extra_payments {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(AmortError::invalid(
                    "extra_payments",
                    format!("amount for period {} must be a non-negative amount, got {}", key, amount),
                ));
            }
            if *key == PeriodKey::Index(0) {
                return Err(AmortError::invalid("extra_payments", "period numbers start at 1"));
            }
        }

        self.date_step().map(|_| ())
    }

    /// First payment date and months per period, `None` when undated
    ///
    /// Dates only move forward, so checking the last period's date covers all of them.
    fn date_step(&self) -> Result<Option<(NaiveDate, u32)>> {
        let first = match self.first_payment_date {
            Some(date) => date,
            None => return Ok(None),
        };

        if self.periods_per_year == 0 || 12 % self.periods_per_year != 0 {
            return Err(AmortError::invalid(
                "periods_per_year",
                format!(
                    "payment dates need a whole number of months per period; {} periods per year does not divide 12",
                    self.periods_per_year
                ),
            ));
        }
        let step = self.months_between_payments();

        let last = self.term_periods.max(1);
        nth_payment_date(first, step, last - 1).ok_or_else(|| {
            AmortError::invalid(
                "first_payment_date",
                format!("payment date for period {} is out of range", last),
            )
        })?;

        Ok(Some((first, step)))
    }

    /// Payment date of every period, or `None` when no first date was given
    ///
    /// Each date is offset from the first payment date rather than chained from
    /// the previous one, so a 31st stays on the 31st where the month allows it.
    pub fn payment_dates(&self) -> Result<Option<Vec<NaiveDate>>> {
        let (first, step) = match self.date_step()? {
            Some(grid) => grid,
            None => return Ok(None),
        };

        let dates = (0..self.term_periods)
            .filter_map(|offset| nth_payment_date(first, step, offset))
            .collect();
        Ok(Some(dates))
    }
}

fn nth_payment_date(first: NaiveDate, step: u32, offset: u32) -> Option<NaiveDate> {
    offset
        .checked_mul(step)
        .and_then(|months| first.checked_add_months(Months::new(months)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly() -> LoanSpec {
        LoanSpec::new(250_000.0, 0.05, 360, 12, LoanStructure::Amortizing)
    }

    #[test]
    fn test_structure_from_str() {
        assert_eq!("Amortizing".parse::<LoanStructure>().unwrap(), LoanStructure::Amortizing);
        assert_eq!("bullet".parse::<LoanStructure>().unwrap(), LoanStructure::Bullet);
        assert_eq!("interest-only".parse::<LoanStructure>().unwrap(), LoanStructure::InterestOnly);
        assert_eq!("interest_only".parse::<LoanStructure>().unwrap(), LoanStructure::InterestOnly);

        let err = "balloon".parse::<LoanStructure>().unwrap_err();
        assert_eq!(err, AmortError::UnsupportedStructure("balloon".into()));
    }

    #[test]
    fn test_period_key_from_str() {
        assert_eq!("12".parse::<PeriodKey>().unwrap(), PeriodKey::Index(12));
        assert_eq!(
            "2025-03-01".parse::<PeriodKey>().unwrap(),
            PeriodKey::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
        assert!(matches!(
            "next tuesday".parse::<PeriodKey>(),
            Err(AmortError::InvalidParameter { field: "extra_payments", .. })
        ));
    }

    #[test]
    fn test_from_years() {
        let spec = LoanSpec::from_years(1000.0, 0.0, 1, 4, LoanStructure::Amortizing).unwrap();
        assert_eq!(spec.term_periods, 4);
        assert!(LoanSpec::from_years(1000.0, 0.0, u32::MAX, 12, LoanStructure::Amortizing).is_err());
    }

    #[test]
    fn test_extra_payments_accumulate() {
        let spec = monthly()
            .with_extra_payment(PeriodKey::Index(3), 100.0)
            .with_extra_payment(PeriodKey::Index(3), 50.0);
        assert_eq!(spec.extra_payments.get(&PeriodKey::Index(3)), Some(&150.0));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let cases: Vec<(LoanSpec, &str)> = vec![
            (LoanSpec { principal: 0.0, ..monthly() }, "principal"),
            (LoanSpec { principal: -10.0, ..monthly() }, "principal"),
            (LoanSpec { principal: f64::NAN, ..monthly() }, "principal"),
            (LoanSpec { annual_rate: -0.01, ..monthly() }, "annual_rate"),
            (LoanSpec { annual_rate: f64::INFINITY, ..monthly() }, "annual_rate"),
            (LoanSpec { term_periods: 0, ..monthly() }, "term_periods"),
            (LoanSpec { periods_per_year: 0, ..monthly() }, "periods_per_year"),
            (monthly().with_extra_payment(PeriodKey::Index(2), -1.0), "extra_payments"),
            (monthly().with_extra_payment(PeriodKey::Index(0), 1.0), "extra_payments"),
        ];

        for (spec, field) in cases {
            let err = spec.validate().unwrap_err();
            assert_eq!(err.field(), Some(field), "unexpected error {:?}", err);
        }
    }

    #[test]
    fn test_zero_rate_is_valid() {
        let spec = LoanSpec { annual_rate: 0.0, ..monthly() };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_payment_dates_quarterly() {
        let spec = LoanSpec::new(1000.0, 0.05, 4, 4, LoanStructure::Amortizing)
            .with_first_payment_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        let dates = spec.payment_dates().unwrap().unwrap();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 10, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_payment_dates_absent_without_first_date() {
        assert_eq!(monthly().payment_dates().unwrap(), None);
    }

    #[test]
    fn test_payment_dates_need_whole_months() {
        let spec = LoanSpec::new(1000.0, 0.05, 52, 52, LoanStructure::Amortizing)
            .with_first_payment_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let err = spec.validate().unwrap_err();
        assert_eq!(err.field(), Some("periods_per_year"));

        // Without dates, any period count per year is fine
        let undated = LoanSpec::new(1000.0, 0.05, 52, 52, LoanStructure::Amortizing);
        assert!(undated.validate().is_ok());
    }

    #[test]
    fn test_payment_dates_out_of_range() {
        let spec = LoanSpec::new(1000.0, 0.05, 24, 12, LoanStructure::Amortizing)
            .with_first_payment_date(NaiveDate::MAX);
        let err = spec.validate().unwrap_err();
        assert_eq!(err.field(), Some("first_payment_date"));
        assert!(spec.payment_dates().is_err());
    }

    #[test]
    fn test_last_payment_date_bounds_the_range() {
        let first = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let spec = LoanSpec::new(1000.0, 0.05, 360, 12, LoanStructure::Amortizing).with_first_payment_date(first);
        assert!(spec.validate().is_ok());

        let dates = spec.payment_dates().unwrap().unwrap();
        assert_eq!(dates.len(), 360);
        assert_eq!(dates[359], NaiveDate::from_ymd_opt(2054, 12, 15).unwrap());
        assert!(dates.windows(2).all(|w| w[0] < w[1]));

        // Last period lands exactly on the final representable month
        let max_first = NaiveDate::MAX.checked_sub_months(Months::new(2)).unwrap();
        let edge = LoanSpec::new(1000.0, 0.05, 3, 12, LoanStructure::Amortizing).with_first_payment_date(max_first);
        assert!(edge.validate().is_ok());
        assert_eq!(edge.payment_dates().unwrap().unwrap().len(), 3);

        let past = LoanSpec::new(1000.0, 0.05, 4, 12, LoanStructure::Amortizing).with_first_payment_date(max_first);
        assert_eq!(past.validate().unwrap_err().field(), Some("first_payment_date"));
    }
}
