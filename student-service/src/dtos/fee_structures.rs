use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::FeeStructure;

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct FeeStructureRequest {
    #[validate(length(min = 1, message = "Class name is required"))]
    pub class_name: String,

    #[validate(range(min = 0.0, message = "Admission fee must not be negative"))]
    pub admission_fee: f64,

    #[validate(range(min = 0.0, message = "Monthly fee must not be negative"))]
    pub monthly_fee: f64,

    #[validate(range(min = 0.0, message = "Annual fee must not be negative"))]
    pub annual_fee: f64,

    pub transport_fee: Option<f64>,
    pub exam_fee: Option<f64>,
    pub activity_fee: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FeeStructureResponse {
    pub id: Uuid,
    pub class_name: String,
    pub admission_fee: f64,
    pub monthly_fee: f64,
    pub annual_fee: f64,
    pub transport_fee: Option<f64>,
    pub exam_fee: Option<f64>,
    pub activity_fee: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl From<FeeStructure> for FeeStructureResponse {
    fn from(structure: FeeStructure) -> Self {
        Self {
            id: structure.id,
            class_name: structure.class_name,
            admission_fee: structure.admission_fee,
            monthly_fee: structure.monthly_fee,
            annual_fee: structure.annual_fee,
            transport_fee: structure.transport_fee,
            exam_fee: structure.exam_fee,
            activity_fee: structure.activity_fee,
            is_active: structure.is_active,
            created_at: structure.created_at.to_chrono(),
            updated_at: structure.updated_at.to_chrono(),
            updated_by: structure.updated_by,
        }
    }
}
