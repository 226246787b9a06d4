use anyhow::anyhow;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

/// Immutable payment record, appended once per processed payment and never
/// mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Human-readable receipt number, e.g. `PAY-1A2B3C4D`.
    pub payment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub payment_type: PaymentType,
    pub amount_paid: f64,
    /// Fee-structure amount for this payment type, snapshotted at payment
    /// time. Later fee-structure edits do not rewrite history.
    pub total_amount: f64,
    /// Sub-ledger pending amount after this payment was applied.
    pub pending_amount: f64,
    pub payment_method: PaymentMethod,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub payment_date: DateTime,
    /// Human label of the period, e.g. "January 2025" or "Year 2025".
    pub payment_period: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: PaymentStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub created_by: Option<String>,
}

impl Payment {
    /// Generate a receipt-style payment id: `PAY-` plus the first eight hex
    /// characters of a fresh UUID, uppercased.
    pub fn generate_payment_id() -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("PAY-{}", uuid[..8].to_uppercase())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Admission,
    Monthly,
    Annual,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Admission => "ADMISSION",
            PaymentType::Monthly => "MONTHLY",
            PaymentType::Annual => "ANNUAL",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Online,
    Cheque,
}

/// Settlement state of a payment or of a sub-ledger period.
///
/// The reconciliation engine only ever produces `Paid` and `Partial`.
/// `Pending` marks a freshly seeded, untouched sub-ledger; `Overdue` is
/// reserved for a due-date sweep that lives outside this service.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Partial => "PARTIAL",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Overdue => "OVERDUE",
        }
    }
}

/// Fully resolved payment period: which sub-ledger a payment targets.
///
/// Built fallibly from the wire fields (`payment_type` + optional
/// month/year) so that every downstream consumer can match exhaustively
/// without re-checking presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPeriod {
    Admission,
    Monthly { month: u32, year: i32 },
    Annual { year: i32 },
}

impl PaymentPeriod {
    pub fn from_parts(
        payment_type: PaymentType,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Self, AppError> {
        match payment_type {
            PaymentType::Admission => Ok(PaymentPeriod::Admission),
            PaymentType::Monthly => {
                let (month, year) = month.zip(year).ok_or_else(|| {
                    AppError::BadRequest(anyhow!("Month and year are required for monthly payment"))
                })?;
                if !(1..=12).contains(&month) {
                    return Err(AppError::BadRequest(anyhow!(
                        "Month must be between 1 and 12, got {}",
                        month
                    )));
                }
                Ok(PaymentPeriod::Monthly { month, year })
            }
            PaymentType::Annual => {
                let year = year.ok_or_else(|| {
                    AppError::BadRequest(anyhow!("Year is required for annual payment"))
                })?;
                Ok(PaymentPeriod::Annual { year })
            }
        }
    }

    pub fn payment_type(&self) -> PaymentType {
        match self {
            PaymentPeriod::Admission => PaymentType::Admission,
            PaymentPeriod::Monthly { .. } => PaymentType::Monthly,
            PaymentPeriod::Annual { .. } => PaymentType::Annual,
        }
    }

    /// Sub-ledger map key: `"MM-YYYY"` for monthly, `"YYYY"` for annual.
    pub fn ledger_key(&self) -> Option<String> {
        match self {
            PaymentPeriod::Admission => None,
            PaymentPeriod::Monthly { month, year } => Some(format!("{:02}-{}", month, year)),
            PaymentPeriod::Annual { year } => Some(year.to_string()),
        }
    }

    /// Human label stored on the payment record.
    pub fn label(&self) -> Option<String> {
        match self {
            PaymentPeriod::Admission => None,
            PaymentPeriod::Monthly { month, year } => {
                Some(format!("{} {}", month_name(*month), year))
            }
            PaymentPeriod::Annual { year } => Some(format!("Year {}", year)),
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            PaymentPeriod::Monthly { month, .. } => Some(*month),
            _ => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            PaymentPeriod::Admission => None,
            PaymentPeriod::Monthly { year, .. } | PaymentPeriod::Annual { year } => Some(*year),
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_period_needs_no_date_parts() {
        let period = PaymentPeriod::from_parts(PaymentType::Admission, None, None).unwrap();
        assert_eq!(period, PaymentPeriod::Admission);
        assert_eq!(period.ledger_key(), None);
        assert_eq!(period.label(), None);
    }

    #[test]
    fn monthly_period_requires_month_and_year() {
        let err = PaymentPeriod::from_parts(PaymentType::Monthly, None, Some(2025)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = PaymentPeriod::from_parts(PaymentType::Monthly, Some(3), None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn monthly_period_rejects_out_of_range_month() {
        let err =
            PaymentPeriod::from_parts(PaymentType::Monthly, Some(13), Some(2025)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = PaymentPeriod::from_parts(PaymentType::Monthly, Some(0), Some(2025)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn annual_period_requires_year() {
        let err = PaymentPeriod::from_parts(PaymentType::Annual, None, None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn ledger_keys_are_zero_padded() {
        let monthly = PaymentPeriod::from_parts(PaymentType::Monthly, Some(1), Some(2025)).unwrap();
        assert_eq!(monthly.ledger_key().unwrap(), "01-2025");
        assert_eq!(monthly.label().unwrap(), "January 2025");

        let annual = PaymentPeriod::from_parts(PaymentType::Annual, None, Some(2025)).unwrap();
        assert_eq!(annual.ledger_key().unwrap(), "2025");
        assert_eq!(annual.label().unwrap(), "Year 2025");
    }

    #[test]
    fn payment_id_has_receipt_format() {
        let id = Payment::generate_payment_id();
        assert!(id.starts_with("PAY-"));
        assert_eq!(id.len(), 12);
        assert!(id[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
