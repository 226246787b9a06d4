use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Student record. `student_id` is the human-readable natural key (e.g.
/// `S042`) used by every external lookup; the uuid `_id` is the surrogate.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub enrollment_date: Option<String>,
    pub class_name: String,
    pub weight: Option<String>,
    pub height: Option<String>,
    /// Supervising teacher's `teacher_id`.
    pub teacher_id: Option<String>,
    /// Stored photo file name and its content type, set on upload.
    pub photo_filename: Option<String>,
    pub photo_content_type: Option<String>,
}
