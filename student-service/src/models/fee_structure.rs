use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaymentType;

/// Per-class fee schedule. Payments snapshot the relevant amount at payment
/// time, so editing a structure never rewrites existing ledgers.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeeStructure {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub class_name: String,
    pub admission_fee: f64,
    pub monthly_fee: f64,
    pub annual_fee: f64,
    pub transport_fee: Option<f64>,
    pub exam_fee: Option<f64>,
    pub activity_fee: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub updated_by: Option<String>,
}

impl FeeStructure {
    /// The fee this structure charges for a given payment type.
    pub fn amount_for(&self, payment_type: PaymentType) -> f64 {
        match payment_type {
            PaymentType::Admission => self.admission_fee,
            PaymentType::Monthly => self.monthly_fee,
            PaymentType::Annual => self.annual_fee,
        }
    }
}
