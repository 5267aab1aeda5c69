//! Running state of a loan while its schedule is built

use crate::loan::LoanSpec;

/// State of a loan at a point in time during schedule generation
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Current period (1-indexed, 0 before the first period)
    pub period: u32,

    /// Total number of periods
    pub term_periods: u32,

    /// Outstanding balance at the start of the current period, full precision
    pub beginning_balance: f64,

    /// Outstanding balance after the current period's payment, full precision
    pub ending_balance: f64,
}

impl ScheduleState {
    /// Initialize state from a loan at origination
    pub fn from_spec(spec: &LoanSpec) -> Self {
        Self {
            period: 0,
            term_periods: spec.term_periods,
            beginning_balance: spec.principal,
            ending_balance: spec.principal,
        }
    }

    /// Advance to next period; the opening balance is the prior closing balance
    pub fn advance_period(&mut self) {
        self.period += 1;
        self.beginning_balance = self.ending_balance;
    }

    pub fn is_final_period(&self) -> bool {
        self.period == self.term_periods
    }

    /// Record the principal paid this period, flooring the balance at zero
    pub fn apply_principal(&mut self, principal_paid: f64) {
        self.ending_balance = (self.beginning_balance - principal_paid).max(0.0);
    }

    /// Zero-based index of the current period
    pub fn index(&self) -> usize {
        self.period.saturating_sub(1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanStructure;

    #[test]
    fn test_state_rolls_balance_forward() {
        let spec = LoanSpec::new(1000.0, 0.12, 3, 12, LoanStructure::Amortizing);
        let mut state = ScheduleState::from_spec(&spec);
        assert_eq!(state.period, 0);

        state.advance_period();
        assert_eq!(state.period, 1);
        assert_eq!(state.beginning_balance, 1000.0);

        state.apply_principal(400.0);
        state.advance_period();
        assert_eq!(state.beginning_balance, 600.0);
        assert!(!state.is_final_period());

        state.apply_principal(700.0);
        assert_eq!(state.ending_balance, 0.0);

        state.advance_period();
        assert!(state.is_final_period());
        assert_eq!(state.index(), 2);
    }
}
