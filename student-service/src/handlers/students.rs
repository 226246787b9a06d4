//! Student CRUD with optional photo upload.
//!
//! Create and update take a multipart form: a `student` part holding the
//! JSON payload plus an optional `photo` image part. Teachers only reach
//! records assigned to them; everything else is admin-only.

use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::students::{
    BulkUpdateClassRequest, BulkUpdateClassResponse, CreateStudentRequest, StudentResponse,
    UpdateStudentRequest,
};
use crate::middleware::RequestContext;
use crate::services::storage::UploadedPhoto;
use crate::AppState;

/// Pull the `student` JSON part and the optional `photo` file part out of a
/// multipart form.
async fn read_student_form<T>(
    multipart: &mut Multipart,
) -> Result<(Option<T>, Option<UploadedPhoto>), AppError>
where
    T: serde::de::DeserializeOwned,
{
    let mut payload = None;
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("student") => {
                let raw = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow!("Failed to read student part: {}", e))
                })?;
                payload = Some(serde_json::from_str(&raw).map_err(|e| {
                    AppError::BadRequest(anyhow!("Invalid student JSON: {}", e))
                })?);
            }
            Some("photo") => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow!("Failed to read photo bytes: {}", e))
                })?;
                photo = Some(UploadedPhoto {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok((payload, photo))
}

/// POST /api/students (ADMIN only)
pub async fn create_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    ctx.require_admin()?;

    let (payload, photo) = read_student_form::<CreateStudentRequest>(&mut multipart).await?;
    let payload = payload.ok_or_else(|| AppError::BadRequest(anyhow!("Missing student part")))?;
    payload.validate()?;

    tracing::info!(student_id = %payload.student_id, "Creating student");

    if state
        .students
        .find_by_student_id(&payload.student_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!(
            "Student ID already exists: {}",
            payload.student_id
        )));
    }

    if state
        .teachers
        .find_by_teacher_id(&payload.teacher_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(anyhow!(
            "Teacher not found with ID: {}",
            payload.teacher_id
        )));
    }

    let mut student = payload.into_model();
    if let Some(photo) = photo {
        let filename = state.storage.store_photo(&photo, &student.student_id).await?;
        student.photo_filename = Some(filename);
        student.photo_content_type = Some(photo.content_type);
    }

    state.students.insert(&student).await?;
    tracing::info!(student_id = %student.student_id, "Student created");

    Ok((StatusCode::CREATED, Json(StudentResponse::from(student))))
}

/// GET /api/students (ADMIN only)
pub async fn list_students(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    ctx.require_admin()?;
    let students = state.students.find_all().await?;
    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

/// GET /api/students/class/{class_name} (ADMIN only)
pub async fn students_by_class(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(class_name): Path<String>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    ctx.require_admin()?;
    let students = state.students.find_by_class(&class_name).await?;
    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

/// GET /api/students/teacher/{teacher_id} — teachers see only their own
/// roster; admins see any.
pub async fn students_by_teacher(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    if ctx.is_teacher() {
        ctx.require_own_students(Some(&teacher_id))?;
    } else {
        ctx.require_admin()?;
    }

    let students = state.students.find_by_teacher(&teacher_id).await?;
    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

/// GET /api/students/{student_id} — admins, or the student's own teacher.
pub async fn get_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(student_id): Path<String>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = state
        .students
        .find_by_student_id(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Student not found with ID: {}", student_id)))?;

    if ctx.is_teacher() {
        ctx.require_own_students(student.teacher_id.as_deref())?;
    } else {
        ctx.require_admin()?;
    }

    Ok(Json(StudentResponse::from(student)))
}

/// PUT /api/students/{student_id} — partial update with optional photo
/// replacement. Teachers only update their own students.
pub async fn update_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(student_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<StudentResponse>, AppError> {
    let (payload, photo) = read_student_form::<UpdateStudentRequest>(&mut multipart).await?;
    let payload = payload.ok_or_else(|| AppError::BadRequest(anyhow!("Missing student part")))?;
    payload.validate()?;

    let mut student = state
        .students
        .find_by_student_id(&student_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow!("Cannot update. Student not found: {}", student_id))
        })?;

    if ctx.is_teacher() {
        ctx.require_own_students(student.teacher_id.as_deref())?;
    } else {
        ctx.require_admin()?;
    }

    if let Some(teacher_id) = payload.teacher_id.as_deref() {
        if state.teachers.find_by_teacher_id(teacher_id).await?.is_none() {
            return Err(AppError::BadRequest(anyhow!(
                "Teacher not found with ID: {}",
                teacher_id
            )));
        }
    }

    payload.apply_to(&mut student);

    if let Some(photo) = photo {
        // Replace: the previous file is removed once the new one is stored.
        let old_photo = student.photo_filename.take();
        let filename = state.storage.store_photo(&photo, &student.student_id).await?;
        student.photo_filename = Some(filename);
        student.photo_content_type = Some(photo.content_type);
        if let Some(old) = old_photo {
            state.storage.delete(&old).await;
        }
    }

    state.students.replace(&student).await?;
    tracing::info!(student_id = %student.student_id, "Student updated");

    Ok(Json(StudentResponse::from(student)))
}

/// DELETE /api/students/{student_id} (ADMIN only)
pub async fn delete_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(student_id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.require_admin()?;

    let student = state
        .students
        .find_by_student_id(&student_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow!("Cannot delete. Student not found: {}", student_id))
        })?;

    if let Some(photo) = student.photo_filename.as_deref() {
        state.storage.delete(photo).await;
    }

    state.students.delete_by_student_id(&student_id).await?;
    tracing::info!(student_id = %student_id, "Student deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/students/{student_id}/photo
pub async fn get_student_photo(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let student = state
        .students
        .find_by_student_id(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Student not found with ID: {}", student_id)))?;

    let filename = student
        .photo_filename
        .ok_or_else(|| AppError::NotFound(anyhow!("No photo for student: {}", student_id)))?;
    let content_type = student
        .photo_content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let data = state.storage.read(&filename).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}

/// PUT /api/students/bulk/class (ADMIN only) — promote a whole class.
pub async fn bulk_update_class(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<BulkUpdateClassRequest>,
) -> Result<Json<BulkUpdateClassResponse>, AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    tracing::info!(
        from_class = %payload.from_class,
        to_class = %payload.to_class,
        "Bulk class update"
    );

    if state.students.count_in_class(&payload.from_class).await? == 0 {
        return Err(AppError::NotFound(anyhow!(
            "No students found in class: {}",
            payload.from_class
        )));
    }

    let moved = state
        .students
        .move_class(&payload.from_class, &payload.to_class)
        .await?;

    tracing::info!(moved, "Bulk class update complete");

    Ok(Json(BulkUpdateClassResponse { moved }))
}
