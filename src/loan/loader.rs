//! Load a loan book from CSV

use super::{LoanSpec, LoanStructure};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the loan-book columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    loan_id: String,
    principal: f64,
    annual_rate: f64,
    term_periods: u32,
    #[serde(default = "default_periods_per_year")]
    periods_per_year: u32,
    #[serde(default)]
    structure: Option<String>,
    #[serde(default)]
    first_payment_date: Option<String>,
}

fn default_periods_per_year() -> u32 {
    12
}

impl CsvRow {
    fn into_record(self) -> Result<LoanRecord, Box<dyn Error>> {
        let structure = match self.structure.as_deref().map(str::trim) {
            None | Some("") => LoanStructure::Amortizing,
            Some(label) => label
                .parse::<LoanStructure>()
                .map_err(|e| format!("loan {}: {}", self.loan_id, e))?,
        };

        let mut spec = LoanSpec::new(
            self.principal,
            self.annual_rate,
            self.term_periods,
            self.periods_per_year,
            structure,
        );

        if let Some(date) = self.first_payment_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| format!("loan {}: bad first_payment_date `{}`: {}", self.loan_id, date, e))?;
            spec = spec.with_first_payment_date(parsed);
        }

        Ok(LoanRecord {
            loan_id: self.loan_id,
            spec,
        })
    }
}

/// A loan from a loan book, tagged with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    pub loan_id: String,
    pub spec: LoanSpec,
}

/// Load all loans from a CSV file
///
/// Loading is all-or-nothing: a row that does not parse (missing column, bad
/// number, unknown structure, malformed date) fails the whole book with an error
/// naming the loan. Values that parse but break a loan precondition, such as a
/// negative principal, load fine and are reported per loan when scheduled.
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>, Box<dyn Error>> {
    let reader = Reader::from_path(path)?;
    collect_loans(reader)
}

/// Load loans from any reader (e.g., string buffer, stdin)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRecord>, Box<dyn Error>> {
    collect_loans(Reader::from_reader(reader))
}

fn collect_loans<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanRecord>, Box<dyn Error>> {
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.into_record()?);
    }

    log::debug!("loaded {} loans", loans.len());
    Ok(loans)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = "\
loan_id,principal,annual_rate,term_periods,periods_per_year,structure,first_payment_date
A-1,250000,0.05,360,12,amortizing,2025-01-01
B-2,1000,0.04,8,4,bullet,
C-3,5000,0,12,12,Interest-Only,
";

    #[test]
    fn test_load_loans_from_reader() {
        let loans = load_loans_from_reader(BOOK.as_bytes()).expect("Failed to load loans");
        assert_eq!(loans.len(), 3);

        assert_eq!(loans[0].loan_id, "A-1");
        assert_eq!(loans[0].spec.term_periods, 360);
        assert_eq!(
            loans[0].spec.first_payment_date,
            Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );

        assert_eq!(loans[1].spec.structure, LoanStructure::Bullet);
        assert_eq!(loans[1].spec.periods_per_year, 4);
        assert_eq!(loans[1].spec.first_payment_date, None);

        assert_eq!(loans[2].spec.structure, LoanStructure::InterestOnly);
        assert_eq!(loans[2].spec.annual_rate, 0.0);
    }

    #[test]
    fn test_optional_columns_default() {
        let book = "loan_id,principal,annual_rate,term_periods\nX,100,0.1,12\n";
        let loans = load_loans_from_reader(book.as_bytes()).unwrap();
        assert_eq!(loans[0].spec.periods_per_year, 12);
        assert_eq!(loans[0].spec.structure, LoanStructure::Amortizing);
    }

    #[test]
    fn test_unknown_structure_fails() {
        let book = "loan_id,principal,annual_rate,term_periods,periods_per_year,structure\nX,100,0.1,12,12,balloon\n";
        let err = load_loans_from_reader(book.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("balloon"));
        assert!(err.to_string().contains("loan X"));
    }

    #[test]
    fn test_parse_error_fails_whole_book_but_invalid_values_load() {
        let unparsable = "loan_id,principal,annual_rate,term_periods,periods_per_year,structure
A,1000,0.05,12,12,bullet
B,1000,0.05,12,12,balloon
";
        assert!(load_loans_from_reader(unparsable.as_bytes()).is_err());

        let invalid = "loan_id,principal,annual_rate,term_periods
A,1000,0.05,12
B,-1000,0.05,12
";
        let loans = load_loans_from_reader(invalid.as_bytes()).unwrap();
        assert_eq!(loans.len(), 2);
        assert!(loans[1].spec.validate().is_err());
    }

    #[test]
    fn test_bad_date_fails() {
        let book = "loan_id,principal,annual_rate,term_periods,periods_per_year,structure,first_payment_date\nX,100,0.1,12,12,bullet,01/02/2025\n";
        let err = load_loans_from_reader(book.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("first_payment_date"));
    }
}
