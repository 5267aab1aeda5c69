//! Loan parameters and loan-book loading

mod data;
pub mod loader;

pub use data::{LoanSpec, LoanStructure, PeriodKey};
pub use loader::{load_loans, load_loans_from_reader, LoanRecord};
