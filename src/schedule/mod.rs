//! Schedule generation for a single loan

mod config;
mod state;
mod engine;
mod records;

pub use config::{round_to, ExtraPaymentPolicy, ScheduleConfig, DEFAULT_CURRENCY_DECIMALS, MAX_CURRENCY_DECIMALS};
pub use state::ScheduleState;
pub use engine::{generate, level_payment, ScheduleEngine};
pub use records::{PeriodRecord, Schedule};
