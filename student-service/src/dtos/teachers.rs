use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Teacher;

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CreateTeacherRequest {
    #[validate(length(min = 1, message = "Teacher ID is required"))]
    pub teacher_id: String,

    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Email should be valid"))]
    pub email: String,

    #[validate(length(min = 10, max = 15, message = "Phone should be 10-15 digits"))]
    pub phone: String,

    pub subject: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<String>,
    pub date_of_birth: Option<String>,
}

impl CreateTeacherRequest {
    pub fn into_model(self) -> Teacher {
        Teacher {
            id: Uuid::new_v4(),
            teacher_id: self.teacher_id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            subject: self.subject,
            address: self.address,
            hire_date: self.hire_date,
            date_of_birth: self.date_of_birth,
        }
    }
}

#[derive(Debug, Deserialize, Validate, Clone, Default)]
pub struct UpdateTeacherRequest {
    pub full_name: Option<String>,
    #[validate(email(message = "Email should be valid"))]
    pub email: Option<String>,
    #[validate(length(min = 10, max = 15, message = "Phone should be 10-15 digits"))]
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<String>,
    pub date_of_birth: Option<String>,
}

impl UpdateTeacherRequest {
    pub fn apply_to(self, teacher: &mut Teacher) {
        if let Some(full_name) = self.full_name {
            teacher.full_name = full_name;
        }
        if let Some(email) = self.email {
            teacher.email = email;
        }
        if let Some(phone) = self.phone {
            teacher.phone = phone;
        }
        if let Some(subject) = self.subject {
            teacher.subject = Some(subject);
        }
        if let Some(address) = self.address {
            teacher.address = Some(address);
        }
        if let Some(hire_date) = self.hire_date {
            teacher.hire_date = Some(hire_date);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            teacher.date_of_birth = Some(date_of_birth);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeacherResponse {
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

impl From<Teacher> for TeacherResponse {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            teacher_id: teacher.teacher_id,
            full_name: teacher.full_name,
            email: teacher.email,
            phone: teacher.phone,
            subject: teacher.subject,
            address: teacher.address,
            hire_date: teacher.hire_date,
            date_of_birth: teacher.date_of_birth,
        }
    }
}
