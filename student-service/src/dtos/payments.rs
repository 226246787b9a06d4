use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Payment, PaymentMethod, PaymentStatus, PaymentType, StudentFeeSummary};

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1, message = "Student ID is required"))]
    pub student_id: String,

    pub payment_type: PaymentType,

    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount_paid: f64,

    pub payment_method: PaymentMethod,

    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,

    // Only meaningful for MONTHLY (month + year) and ANNUAL (year) payments.
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub payment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub payment_type: PaymentType,
    pub amount_paid: f64,
    pub total_amount: f64,
    pub pending_amount: f64,
    pub payment_method: PaymentMethod,
    pub transaction_reference: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub remarks: Option<String>,
    pub payment_period: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            payment_id: payment.payment_id,
            student_id: payment.student_id,
            student_name: payment.student_name,
            payment_type: payment.payment_type,
            amount_paid: payment.amount_paid,
            total_amount: payment.total_amount,
            pending_amount: payment.pending_amount,
            payment_method: payment.payment_method,
            transaction_reference: payment.transaction_reference,
            payment_date: payment.payment_date.to_chrono(),
            remarks: payment.remarks,
            payment_period: payment.payment_period,
            status: payment.status,
            created_at: payment.created_at.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentReceiptResponse {
    pub receipt_number: String,
    pub student_id: String,
    pub student_name: String,
    pub payment_type: PaymentType,
    pub amount_paid: f64,
    pub pending_amount: f64,
    pub payment_method: PaymentMethod,
    pub transaction_reference: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub remarks: Option<String>,
    pub received_by: Option<String>,
}

impl From<Payment> for PaymentReceiptResponse {
    fn from(payment: Payment) -> Self {
        Self {
            receipt_number: payment.payment_id,
            student_id: payment.student_id,
            student_name: payment.student_name,
            payment_type: payment.payment_type,
            amount_paid: payment.amount_paid,
            pending_amount: payment.pending_amount,
            payment_method: payment.payment_method,
            transaction_reference: payment.transaction_reference,
            payment_date: payment.payment_date.to_chrono(),
            remarks: payment.remarks,
            received_by: payment.created_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentFeeSummaryResponse {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub admission_fee_total: f64,
    pub admission_fee_paid: f64,
    pub admission_fee_pending: f64,
    pub admission_fee_completed: bool,
    pub total_fees_amount: f64,
    pub total_paid_amount: f64,
    pub total_pending_amount: f64,
    pub last_payment_date: Option<DateTime<Utc>>,
}

impl From<StudentFeeSummary> for StudentFeeSummaryResponse {
    fn from(summary: StudentFeeSummary) -> Self {
        Self {
            student_id: summary.student_id,
            student_name: summary.student_name,
            class_name: summary.class_name,
            admission_fee_total: summary.admission_fee_total,
            admission_fee_paid: summary.admission_fee_paid,
            admission_fee_pending: summary.admission_fee_pending,
            admission_fee_completed: summary.admission_fee_completed,
            total_fees_amount: summary.total_fees_amount,
            total_paid_amount: summary.total_paid_amount,
            total_pending_amount: summary.total_pending_amount,
            last_payment_date: summary.last_payment_date.map(|d| d.to_chrono()),
        }
    }
}
