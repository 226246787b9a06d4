//! MongoDB repositories.
//!
//! One repository per aggregate. All lookups go through the human-readable
//! natural keys (student_id, teacher_id, username, class_name, payment_id);
//! uniqueness is enforced by indexes created at startup.

use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOptions, IndexOptions, ReplaceOptions};
use mongodb::{Collection, Database, IndexModel};
use service_core::error::AppError;

use crate::models::{
    FeeStructure, Payment, Student, StudentFeeSummary, Teacher, User, UserRole,
};

fn unique_index(keys: mongodb::bson::Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build(),
        )
        .build()
}

fn plain_index(keys: mongodb::bson::Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

// =============================================================================
// Users
// =============================================================================

#[derive(Clone)]
pub struct UserRepository {
    users: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection("users"),
        }
    }

    pub async fn init_indexes(&self) -> Result<(), AppError> {
        self.users
            .create_indexes([unique_index(doc! { "username": 1 }, "username_idx")], None)
            .await?;
        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .find_one(doc! { "username": username }, None)
            .await?)
    }

    pub async fn insert(&self, user: &User) -> Result<(), AppError> {
        self.users.insert_one(user, None).await?;
        Ok(())
    }

    pub async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        self.users
            .update_one(
                doc! { "username": username },
                doc! { "$set": { "password_hash": password_hash } },
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn count_role(&self, role: UserRole) -> Result<u64, AppError> {
        Ok(self
            .users
            .count_documents(doc! { "role": role.as_str() }, None)
            .await?)
    }
}

// =============================================================================
// Students
// =============================================================================

#[derive(Clone)]
pub struct StudentRepository {
    students: Collection<Student>,
}

impl StudentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            students: db.collection("students"),
        }
    }

    pub async fn init_indexes(&self) -> Result<(), AppError> {
        self.students
            .create_indexes(
                [
                    unique_index(doc! { "student_id": 1 }, "student_id_idx"),
                    plain_index(doc! { "class_name": 1 }, "class_name_idx"),
                    plain_index(doc! { "teacher_id": 1 }, "teacher_id_idx"),
                ],
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn insert(&self, student: &Student) -> Result<(), AppError> {
        self.students.insert_one(student, None).await?;
        Ok(())
    }

    pub async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Student>, AppError> {
        Ok(self
            .students
            .find_one(doc! { "student_id": student_id }, None)
            .await?)
    }

    pub async fn find_all(&self) -> Result<Vec<Student>, AppError> {
        let cursor = self.students.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_class(&self, class_name: &str) -> Result<Vec<Student>, AppError> {
        let cursor = self
            .students
            .find(doc! { "class_name": class_name }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_teacher(&self, teacher_id: &str) -> Result<Vec<Student>, AppError> {
        let cursor = self
            .students
            .find(doc! { "teacher_id": teacher_id }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn replace(&self, student: &Student) -> Result<(), AppError> {
        self.students
            .replace_one(doc! { "student_id": &student.student_id }, student, None)
            .await?;
        Ok(())
    }

    pub async fn delete_by_student_id(&self, student_id: &str) -> Result<(), AppError> {
        self.students
            .delete_one(doc! { "student_id": student_id }, None)
            .await?;
        Ok(())
    }

    pub async fn count_in_class(&self, class_name: &str) -> Result<u64, AppError> {
        Ok(self
            .students
            .count_documents(doc! { "class_name": class_name }, None)
            .await?)
    }

    /// Move every student of `from_class` into `to_class`; returns how many
    /// records changed.
    pub async fn move_class(&self, from_class: &str, to_class: &str) -> Result<u64, AppError> {
        let result = self
            .students
            .update_many(
                doc! { "class_name": from_class },
                doc! { "$set": { "class_name": to_class } },
                None,
            )
            .await?;
        Ok(result.modified_count)
    }
}

// =============================================================================
// Teachers
// =============================================================================

#[derive(Clone)]
pub struct TeacherRepository {
    teachers: Collection<Teacher>,
}

impl TeacherRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            teachers: db.collection("teachers"),
        }
    }

    pub async fn init_indexes(&self) -> Result<(), AppError> {
        self.teachers
            .create_indexes(
                [unique_index(doc! { "teacher_id": 1 }, "teacher_id_idx")],
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn insert(&self, teacher: &Teacher) -> Result<(), AppError> {
        self.teachers.insert_one(teacher, None).await?;
        Ok(())
    }

    pub async fn find_by_teacher_id(&self, teacher_id: &str) -> Result<Option<Teacher>, AppError> {
        Ok(self
            .teachers
            .find_one(doc! { "teacher_id": teacher_id }, None)
            .await?)
    }

    pub async fn find_all(&self) -> Result<Vec<Teacher>, AppError> {
        let cursor = self.teachers.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_subject(&self, subject: &str) -> Result<Vec<Teacher>, AppError> {
        let cursor = self
            .teachers
            .find(doc! { "subject": subject }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn replace(&self, teacher: &Teacher) -> Result<(), AppError> {
        self.teachers
            .replace_one(doc! { "teacher_id": &teacher.teacher_id }, teacher, None)
            .await?;
        Ok(())
    }

    pub async fn delete_by_teacher_id(&self, teacher_id: &str) -> Result<(), AppError> {
        self.teachers
            .delete_one(doc! { "teacher_id": teacher_id }, None)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Fees: structures, payments, summaries
// =============================================================================

#[derive(Clone)]
pub struct FeeRepository {
    fee_structures: Collection<FeeStructure>,
    payments: Collection<Payment>,
    fee_summaries: Collection<StudentFeeSummary>,
}

impl FeeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            fee_structures: db.collection("fee_structures"),
            payments: db.collection("payments"),
            fee_summaries: db.collection("student_fee_summaries"),
        }
    }

    pub async fn init_indexes(&self) -> Result<(), AppError> {
        self.fee_structures
            .create_indexes(
                [unique_index(doc! { "class_name": 1 }, "class_name_idx")],
                None,
            )
            .await?;
        self.payments
            .create_indexes(
                [
                    unique_index(doc! { "payment_id": 1 }, "payment_id_idx"),
                    plain_index(
                        doc! { "student_id": 1, "payment_date": -1 },
                        "student_payments_idx",
                    ),
                ],
                None,
            )
            .await?;
        self.fee_summaries
            .create_indexes(
                [unique_index(doc! { "student_id": 1 }, "student_id_idx")],
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn find_structure_by_class(
        &self,
        class_name: &str,
    ) -> Result<Option<FeeStructure>, AppError> {
        Ok(self
            .fee_structures
            .find_one(doc! { "class_name": class_name }, None)
            .await?)
    }

    pub async fn find_active_structure_by_class(
        &self,
        class_name: &str,
    ) -> Result<Option<FeeStructure>, AppError> {
        Ok(self
            .fee_structures
            .find_one(doc! { "class_name": class_name, "is_active": true }, None)
            .await?)
    }

    pub async fn find_all_structures(&self) -> Result<Vec<FeeStructure>, AppError> {
        let cursor = self.fee_structures.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn upsert_structure(&self, structure: &FeeStructure) -> Result<(), AppError> {
        self.fee_structures
            .replace_one(
                doc! { "class_name": &structure.class_name },
                structure,
                ReplaceOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_structure_by_class(&self, class_name: &str) -> Result<(), AppError> {
        self.fee_structures
            .delete_one(doc! { "class_name": class_name }, None)
            .await?;
        Ok(())
    }

    pub async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError> {
        self.payments.insert_one(payment, None).await?;
        Ok(())
    }

    pub async fn find_payment_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<Payment>, AppError> {
        Ok(self
            .payments
            .find_one(doc! { "payment_id": payment_id }, None)
            .await?)
    }

    /// Payment history for one student, newest first.
    pub async fn find_payments_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Payment>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "payment_date": -1 })
            .build();
        let cursor = self
            .payments
            .find(doc! { "student_id": student_id }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_summary_by_student(
        &self,
        student_id: &str,
    ) -> Result<Option<StudentFeeSummary>, AppError> {
        Ok(self
            .fee_summaries
            .find_one(doc! { "student_id": student_id }, None)
            .await?)
    }

    pub async fn upsert_summary(&self, summary: &StudentFeeSummary) -> Result<(), AppError> {
        self.fee_summaries
            .replace_one(
                doc! { "student_id": &summary.student_id },
                summary,
                ReplaceOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }
}
