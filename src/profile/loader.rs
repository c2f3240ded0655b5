//! Load optimization requests from a CSV file for batch runs

use super::ActivityProfile;
use crate::error::LoadError;
use csv::Reader;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

const REQUESTS_FILE: &str = "requests";

/// One principal + profile + bank selection to optimize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub request_id: u32,
    pub principal: Decimal,
    pub profile: ActivityProfile,
    /// Selected bank names; empty means every bank in the rate book
    pub banks: Vec<String>,
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "RequestID")]
    request_id: u32,
    #[serde(rename = "Principal")]
    principal: String,
    #[serde(rename = "SalaryCredit")]
    salary_credit: String,
    #[serde(rename = "MonthlySalary")]
    monthly_salary: Decimal,
    #[serde(rename = "CardSpend")]
    card_spend: Decimal,
    #[serde(rename = "BillPayments", default)]
    bill_payments: u32,
    #[serde(rename = "Insurance", default)]
    insurance: String,
    #[serde(rename = "Investments", default)]
    investments: String,
    #[serde(rename = "IncreasedBalance", default)]
    increased_balance: String,
    #[serde(rename = "GrewWealth", default)]
    grew_wealth: String,
    #[serde(rename = "Banks", default)]
    banks: String,
}

fn parse_flag(value: &str, column: &str, row: usize) -> Result<bool, LoadError> {
    match value.trim() {
        "Y" | "y" => Ok(true),
        "N" | "n" | "" => Ok(false),
        other => Err(LoadError::Parse {
            file: REQUESTS_FILE,
            row,
            message: format!("{column} must be Y or N, got {other:?}"),
        }),
    }
}

impl CsvRow {
    fn to_request(self, row: usize) -> Result<OptimizationRequest, LoadError> {
        // Amounts may carry thousands separators ("150,000")
        let principal: Decimal = self.principal.replace(',', "").trim().parse().map_err(|e| {
            LoadError::Parse {
                file: REQUESTS_FILE,
                row,
                message: format!("Principal {:?}: {e}", self.principal),
            }
        })?;

        let profile = ActivityProfile::new(
            parse_flag(&self.salary_credit, "SalaryCredit", row)?,
            self.monthly_salary,
            self.card_spend,
        )
        .with_bill_payments(self.bill_payments)
        .with_insurance(parse_flag(&self.insurance, "Insurance", row)?)
        .with_investments(parse_flag(&self.investments, "Investments", row)?)
        .with_increased_balance(parse_flag(&self.increased_balance, "IncreasedBalance", row)?)
        .with_grown_wealth(parse_flag(&self.grew_wealth, "GrewWealth", row)?);

        let banks = self
            .banks
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();

        Ok(OptimizationRequest {
            request_id: self.request_id,
            principal,
            profile,
            banks,
        })
    }
}

/// Load all requests from a CSV file
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<OptimizationRequest>, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_requests_from_reader(file)
}

/// Load requests from any reader (e.g., string buffer, stdin)
pub fn load_requests_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<OptimizationRequest>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut requests = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        requests.push(row.to_request(idx + 1)?);
    }

    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = "\
RequestID,Principal,SalaryCredit,MonthlySalary,CardSpend,BillPayments,Insurance,Investments,Banks
1,\"150,000\",Y,5000,800,3,N,N,UOB One;OCBC 360
2,20000,N,0,0,0,,,
";

    #[test]
    fn test_load_requests_from_reader() {
        let requests = load_requests_from_reader(SAMPLE.as_bytes()).expect("sample should parse");
        assert_eq!(requests.len(), 2);

        let first = &requests[0];
        assert_eq!(first.principal, dec!(150000));
        assert!(first.profile.has_salary_credit);
        assert_eq!(first.profile.bill_payments, 3);
        assert_eq!(first.banks, vec!["UOB One".to_string(), "OCBC 360".to_string()]);

        let second = &requests[1];
        assert_eq!(second.profile, ActivityProfile::inactive());
        assert!(second.banks.is_empty());
    }

    #[test]
    fn test_save_and_grow_columns() {
        let csv = "\
RequestID,Principal,SalaryCredit,MonthlySalary,CardSpend,IncreasedBalance,GrewWealth
3,100000,N,0,0,Y,N
";
        let requests = load_requests_from_reader(csv.as_bytes()).unwrap();
        assert!(requests[0].profile.increased_balance);
        assert!(!requests[0].profile.grew_wealth);
    }

    #[test]
    fn test_bad_flag_reports_row() {
        let csv = "\
RequestID,Principal,SalaryCredit,MonthlySalary,CardSpend
7,1000,maybe,0,0
";
        let err = load_requests_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { row: 1, .. }));
    }

    #[test]
    fn test_load_sample_file() {
        let requests = load_requests("data/sample_requests.csv").expect("Failed to load sample requests");
        assert!(!requests.is_empty());
        assert!(requests.iter().all(|r| r.principal >= Decimal::ZERO));
    }
}
