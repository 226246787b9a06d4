use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Student;

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "Student ID is required"))]
    pub student_id: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    pub full_name: Option<String>,

    #[validate(email(message = "Email should be valid"))]
    pub email: String,

    #[validate(length(min = 1, message = "Guardian name is required"))]
    pub guardian_name: String,

    #[validate(length(min = 10, max = 15, message = "Guardian contact should be 10-15 digits"))]
    pub guardian_contact: String,

    pub address: Option<String>,

    #[validate(length(min = 10, max = 15, message = "Phone number should be 10-15 digits"))]
    pub phone_number: Option<String>,

    pub date_of_birth: Option<String>,
    pub enrollment_date: Option<String>,

    #[validate(length(min = 1, message = "Class name is required"))]
    pub class_name: String,

    pub weight: Option<String>,
    pub height: Option<String>,

    #[validate(length(min = 1, message = "Teacher ID is required"))]
    pub teacher_id: String,
}

impl CreateStudentRequest {
    pub fn into_model(self) -> Student {
        let full_name = match self.full_name {
            Some(name) if !name.is_empty() => name,
            _ => format!("{} {}", self.first_name, self.last_name),
        };
        Student {
            id: Uuid::new_v4(),
            student_id: self.student_id,
            first_name: self.first_name,
            last_name: self.last_name,
            full_name,
            email: self.email,
            guardian_name: self.guardian_name,
            guardian_contact: self.guardian_contact,
            address: self.address,
            phone_number: self.phone_number,
            date_of_birth: self.date_of_birth,
            enrollment_date: self.enrollment_date,
            class_name: self.class_name,
            weight: self.weight,
            height: self.height,
            teacher_id: Some(self.teacher_id),
            photo_filename: None,
            photo_content_type: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, Clone, Default)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Email should be valid"))]
    pub email: Option<String>,
    pub guardian_name: Option<String>,
    #[validate(length(min = 10, max = 15, message = "Guardian contact should be 10-15 digits"))]
    pub guardian_contact: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 10, max = 15, message = "Phone number should be 10-15 digits"))]
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub enrollment_date: Option<String>,
    pub class_name: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub teacher_id: Option<String>,
}

impl UpdateStudentRequest {
    /// Overlay the provided fields onto an existing record. The derived
    /// full name follows whenever either name part changes.
    pub fn apply_to(self, student: &mut Student) {
        let name_changed = self.first_name.is_some() || self.last_name.is_some();
        if let Some(first_name) = self.first_name {
            student.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            student.last_name = last_name;
        }
        if name_changed {
            student.full_name = format!("{} {}", student.first_name, student.last_name);
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(guardian_name) = self.guardian_name {
            student.guardian_name = guardian_name;
        }
        if let Some(guardian_contact) = self.guardian_contact {
            student.guardian_contact = guardian_contact;
        }
        if let Some(address) = self.address {
            student.address = Some(address);
        }
        if let Some(phone_number) = self.phone_number {
            student.phone_number = Some(phone_number);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            student.date_of_birth = Some(date_of_birth);
        }
        if let Some(enrollment_date) = self.enrollment_date {
            student.enrollment_date = Some(enrollment_date);
        }
        if let Some(class_name) = self.class_name {
            student.class_name = class_name;
        }
        if let Some(weight) = self.weight {
            student.weight = Some(weight);
        }
        if let Some(height) = self.height {
            student.height = Some(height);
        }
        if let Some(teacher_id) = self.teacher_id {
            student.teacher_id = Some(teacher_id);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
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
    pub teacher_id: Option<String>,
    pub photo_filename: Option<String>,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            student_id: student.student_id,
            first_name: student.first_name,
            last_name: student.last_name,
            full_name: student.full_name,
            email: student.email,
            guardian_name: student.guardian_name,
            guardian_contact: student.guardian_contact,
            address: student.address,
            phone_number: student.phone_number,
            date_of_birth: student.date_of_birth,
            enrollment_date: student.enrollment_date,
            class_name: student.class_name,
            weight: student.weight,
            height: student.height,
            teacher_id: student.teacher_id,
            photo_filename: student.photo_filename,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkUpdateClassRequest {
    #[validate(length(min = 1, message = "Source class is required"))]
    pub from_class: String,
    #[validate(length(min = 1, message = "Target class is required"))]
    pub to_class: String,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdateClassResponse {
    pub moved: u64,
}
