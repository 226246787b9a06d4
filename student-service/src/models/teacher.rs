use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Teacher record, keyed externally by the human-readable `teacher_id`
/// (e.g. `T001`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Teacher {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub teacher_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub subject: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<String>,
    pub date_of_birth: Option<String>,
}
