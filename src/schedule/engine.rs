//! Core schedule engine for periodic loan repayment schedules

use super::config::{ExtraPaymentPolicy, ScheduleConfig};
use super::records::{PeriodRecord, Schedule};
use super::state::ScheduleState;
use crate::error::{AmortError, Result};
use crate::loan::{LoanSpec, LoanStructure, PeriodKey};
use chrono::NaiveDate;
use log::{debug, trace, warn};
use std::collections::BTreeMap;

/// Level payment per period for a loan structure
///
/// Amortizing loans use the annuity payment `P * r / (1 - (1 + r)^-n)`, which is
/// `P * r * (1+r)^n / ((1+r)^n - 1)` written so long terms stay finite. A zero
/// rate falls back to `P / n`. Bullet and interest-only loans pay `P * r`.
pub fn level_payment(principal: f64, periodic_rate: f64, term_periods: u32, structure: LoanStructure) -> f64 {
    match structure {
        LoanStructure::Amortizing => {
            if periodic_rate == 0.0 {
                principal / term_periods as f64
            } else {
                // 1 - (1+r)^-n via ln_1p/exp_m1; the direct form cancels to 0 for tiny r
                let annuity_factor = -(-(term_periods as f64) * periodic_rate.ln_1p()).exp_m1();
                principal * periodic_rate / annuity_factor
            }
        }
        LoanStructure::Bullet | LoanStructure::InterestOnly => principal * periodic_rate,
    }
}

/// Generate a schedule with the default configuration
pub fn generate(spec: &LoanSpec) -> Result<Schedule> {
    ScheduleEngine::default().generate(spec)
}

/// Main schedule engine
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    config: ScheduleConfig,
}

impl ScheduleEngine {
    /// Create a new schedule engine with the given config
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Build the full schedule for a loan
    ///
    /// All parameters are validated up front; on error no rows are produced.
    pub fn generate(&self, spec: &LoanSpec) -> Result<Schedule> {
        self.config.validate()?;
        spec.validate()?;
        let dates = spec.payment_dates()?;
        let extras = self.resolve_extra_payments(spec, dates.as_deref())?;

        let rate = spec.periodic_rate();
        let payment = level_payment(spec.principal, rate, spec.term_periods, spec.structure);

        debug!(
            "generating {} schedule: principal={} r={} n={} level_payment={}",
            spec.structure, spec.principal, rate, spec.term_periods, payment
        );

        let mut schedule = Schedule::new(spec.structure, rate, payment);
        schedule.records.reserve(spec.term_periods as usize);
        let mut state = ScheduleState::from_spec(spec);

        for _period in 1..=spec.term_periods {
            state.advance_period();

            let date = dates.as_ref().map(|d| d[state.index()]);
            let extra = extras.get(&state.period).copied().unwrap_or(0.0);

            let row = self.calculate_period(spec.structure, rate, payment, extra, date, &mut state);
            schedule.add_row(row);
        }

        Ok(schedule)
    }

    /// Calculate one period's split and roll the balance forward
    fn calculate_period(
        &self,
        structure: LoanStructure,
        rate: f64,
        level_payment: f64,
        extra: f64,
        date: Option<NaiveDate>,
        state: &mut ScheduleState,
    ) -> PeriodRecord {
        let balance = state.beginning_balance;
        let interest = balance * rate;

        // Final period repays whatever is left, absorbing accumulated drift
        let principal_paid = if state.is_final_period() {
            balance
        } else {
            match structure {
                LoanStructure::Amortizing => (level_payment - interest + extra).max(0.0).min(balance),
                LoanStructure::Bullet | LoanStructure::InterestOnly => 0.0,
            }
        };

        state.apply_principal(principal_paid);

        trace!(
            "period {}: balance={} interest={} principal={} extra={}",
            state.period, balance, interest, principal_paid, extra
        );

        // Rounded principal is the drop in rounded balance, so principal sums to
        // the loan amount and payment equals interest plus principal at cents.
        let beginning_balance = self.config.round_money(balance);
        let ending_balance = self.config.round_money(state.ending_balance);
        let interest = self.config.round_money(interest);
        let principal_paid = self.config.round_money(beginning_balance - ending_balance);

        PeriodRecord {
            period: state.period,
            date,
            beginning_balance,
            payment: self.config.round_money(interest + principal_paid),
            interest,
            principal_paid,
            ending_balance,
        }
    }

    /// Map extra payments onto period numbers, dropping keys with no period
    fn resolve_extra_payments(&self, spec: &LoanSpec, dates: Option<&[NaiveDate]>) -> Result<BTreeMap<u32, f64>> {
        let mut by_period = BTreeMap::new();
        if spec.extra_payments.is_empty() {
            return Ok(by_period);
        }

        if !spec.structure.is_amortizing() {
            match self.config.extra_payment_policy {
                ExtraPaymentPolicy::Reject => {
                    return Err(AmortError::invalid(
                        "extra_payments",
                        format!("extra payments only apply to amortizing loans, not {}", spec.structure),
                    ));
                }
                ExtraPaymentPolicy::Warn => {
                    warn!(
                        "ignoring {} extra payment(s) on {} loan",
                        spec.extra_payments.len(),
                        spec.structure
                    );
                }
                ExtraPaymentPolicy::Ignore => {}
            }
            return Ok(by_period);
        }

        for (key, amount) in &spec.extra_payments {
            let period = match key {
                PeriodKey::Index(index) if *index <= spec.term_periods => Some(*index),
                PeriodKey::Index(_) => None,
                PeriodKey::Date(date) => dates
                    .and_then(|d| d.binary_search(date).ok())
                    .map(|idx| idx as u32 + 1),
            };

            match period {
                Some(period) => *by_period.entry(period).or_insert(0.0) += amount,
                None => debug!("extra payment keyed to {} matches no period, ignored", key),
            }
        }

        Ok(by_period)
    }
}
