use std::collections::HashMap;

use anyhow::anyhow;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

use super::{FeeStructure, PaymentPeriod, PaymentStatus, Student};

/// One fee obligation period: monthly entries are keyed by `"MM-YYYY"`,
/// annual entries by `"YYYY"`. Entries are created lazily on the first
/// payment for the period, seeded with the fee-structure amount as of that
/// moment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FeeLedgerEntry {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    pub status: PaymentStatus,
    pub due_date: DateTime,
}

impl FeeLedgerEntry {
    fn new(total: f64, due_date: DateTime) -> Self {
        Self {
            total,
            paid: 0.0,
            pending: total,
            status: PaymentStatus::Pending,
            due_date,
        }
    }

    /// Apply a payment to this period.
    ///
    /// Pending is clamped at zero: overpayment is not tracked, refunded, or
    /// carried into the next period (known limitation, kept as-is).
    fn apply(&mut self, amount: f64) -> LedgerUpdate {
        self.paid += amount;
        self.pending = self.total - self.paid;

        if self.pending <= 0.0 {
            self.pending = 0.0;
            self.status = PaymentStatus::Paid;
        } else {
            self.status = PaymentStatus::Partial;
        }

        LedgerUpdate {
            pending_amount: self.pending,
            status: self.status,
        }
    }
}

/// Outcome of applying one payment to a sub-ledger, echoed onto the
/// payment record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerUpdate {
    pub pending_amount: f64,
    pub status: PaymentStatus,
}

/// Per-student running totals: the admission ledger, one entry per paid-at
/// monthly and annual period, and grand totals recomputed in full after
/// every payment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StudentFeeSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,

    pub admission_fee_total: f64,
    pub admission_fee_paid: f64,
    pub admission_fee_pending: f64,
    pub admission_fee_completed: bool,

    pub monthly_fees: HashMap<String, FeeLedgerEntry>,
    pub annual_fees: HashMap<String, FeeLedgerEntry>,

    pub total_fees_amount: f64,
    pub total_paid_amount: f64,
    pub total_pending_amount: f64,

    pub last_payment_date: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl StudentFeeSummary {
    /// Seed a fresh summary from the student's current fee structure. The
    /// admission ledger starts fully pending; period maps start empty.
    pub fn new(student: &Student, structure: &FeeStructure, now: DateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: student.student_id.clone(),
            student_name: student.full_name.clone(),
            class_name: student.class_name.clone(),
            admission_fee_total: structure.admission_fee,
            admission_fee_paid: 0.0,
            admission_fee_pending: structure.admission_fee,
            admission_fee_completed: false,
            monthly_fees: HashMap::new(),
            annual_fees: HashMap::new(),
            total_fees_amount: 0.0,
            total_paid_amount: 0.0,
            total_pending_amount: 0.0,
            last_payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one payment to the sub-ledger selected by `period`, then
    /// recompute the grand totals from scratch.
    pub fn apply_payment(
        &mut self,
        period: &PaymentPeriod,
        structure: &FeeStructure,
        amount: f64,
        now: DateTime,
    ) -> Result<LedgerUpdate, AppError> {
        let update = match period {
            PaymentPeriod::Admission => self.apply_admission(amount),
            PaymentPeriod::Monthly { month, year } => {
                let key = period
                    .ledger_key()
                    .ok_or_else(|| AppError::InternalError(anyhow!("monthly period without key")))?;
                let due_date = period_due_date(*year, *month, 5)?;
                self.monthly_fees
                    .entry(key)
                    .or_insert_with(|| FeeLedgerEntry::new(structure.monthly_fee, due_date))
                    .apply(amount)
            }
            PaymentPeriod::Annual { year } => {
                let key = period
                    .ledger_key()
                    .ok_or_else(|| AppError::InternalError(anyhow!("annual period without key")))?;
                let due_date = period_due_date(*year, 1, 31)?;
                self.annual_fees
                    .entry(key)
                    .or_insert_with(|| FeeLedgerEntry::new(structure.annual_fee, due_date))
                    .apply(amount)
            }
        };

        self.recompute_totals();
        self.last_payment_date = Some(now);
        self.updated_at = now;

        Ok(update)
    }

    fn apply_admission(&mut self, amount: f64) -> LedgerUpdate {
        self.admission_fee_paid += amount;
        self.admission_fee_pending = self.admission_fee_total - self.admission_fee_paid;

        let status = if self.admission_fee_pending <= 0.0 {
            self.admission_fee_pending = 0.0;
            self.admission_fee_completed = true;
            PaymentStatus::Paid
        } else {
            self.admission_fee_completed = false;
            PaymentStatus::Partial
        };

        LedgerUpdate {
            pending_amount: self.admission_fee_pending,
            status,
        }
    }

    /// Full recomputation over admission + every monthly + every annual
    /// entry. O(periods) per payment, which stays small per student.
    fn recompute_totals(&mut self) {
        let mut total_paid = self.admission_fee_paid;
        let mut total_pending = self.admission_fee_pending;

        for entry in self.monthly_fees.values() {
            total_paid += entry.paid;
            total_pending += entry.pending;
        }
        for entry in self.annual_fees.values() {
            total_paid += entry.paid;
            total_pending += entry.pending;
        }

        self.total_paid_amount = total_paid;
        self.total_pending_amount = total_pending;
        self.total_fees_amount = total_paid + total_pending;
    }
}

/// Midnight UTC on the given calendar day, as a bson timestamp.
fn period_due_date(year: i32, month: u32, day: u32) -> Result<DateTime, AppError> {
    let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            AppError::BadRequest(anyhow!("Invalid payment period: {:02}-{}", month, year))
        })?;
    Ok(DateTime::from_chrono(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
        naive,
        chrono::Utc,
    )))
}
