/**
 * Lead Routes
 * Public contact / test-drive submission and their admin management
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::{Contact, TestDrive, CONTACT_COLUMNS, TEST_DRIVE_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::extract::{non_blank, present, ApiJson, ApiPath};
use crate::routes::auth::AuthAdmin;
use crate::routes::{ChangesResponse, CreatedResponse};
use crate::state::AppState;

const BOOKING_PREFIX: &str = "APEX-TD-";

/// Human-readable reference for a test drive: prefix plus the id padded to 6 digits.
pub fn booking_reference(id: i64) -> String {
    format!("{}{:06}", BOOKING_PREFIX, id)
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/contact
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub model_interest: Option<String>,
    pub message: Option<String>,
}

/// Request body for POST /api/test-drive
#[derive(Debug, Deserialize)]
pub struct TestDriveRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub model: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub message: String,
    pub id: i64,
    pub booking_reference: String,
}

/// Request body for PATCH on a lead
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

impl StatusUpdate {
    fn into_status(self) -> AppResult<String> {
        match self.status {
            Some(status) if !status.trim().is_empty() => Ok(status),
            _ => Err(AppError::BadRequest("Status is required".to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDriveListResponse {
    pub test_drives: Vec<TestDrive>,
}

// ============================================================================
// Public handlers
// ============================================================================

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    if !present(&payload.name) || !present(&payload.email) {
        return Err(AppError::BadRequest(
            "Name and email are required".to_string(),
        ));
    }

    let id = sqlx::query(
        "INSERT INTO contacts (name, email, phone, model_interest, message) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(non_blank(payload.phone))
    .bind(non_blank(payload.model_interest))
    .bind(non_blank(payload.message))
    .execute(&state.pool)
    .await?
    .last_insert_rowid();

    tracing::info!(contact_id = id, "contact submission received");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Contact submission received successfully".to_string(),
            id,
        }),
    ))
}

/// POST /api/test-drive
pub async fn book_test_drive(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TestDriveRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let required = [
        &payload.name,
        &payload.email,
        &payload.phone,
        &payload.model,
        &payload.preferred_date,
    ];
    if !required.into_iter().all(present) {
        return Err(AppError::BadRequest(
            "Required fields: name, email, phone, model, preferred_date".to_string(),
        ));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO test_drives (name, email, phone, model, preferred_date, preferred_time, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.model)
    .bind(&payload.preferred_date)
    .bind(non_blank(payload.preferred_time))
    .bind(non_blank(payload.notes))
    .execute(&state.pool)
    .await?
    .last_insert_rowid();

    let reference = booking_reference(id);
    tracing::info!(test_drive_id = id, booking_reference = %reference, "test drive booked");

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            message: "Test drive booked successfully".to_string(),
            id,
            booking_reference: reference,
        }),
    ))
}

// ============================================================================
// Admin handlers
// ============================================================================

/// GET /api/admin/contacts - All contacts, newest first
pub async fn list_contacts(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ContactListResponse>> {
    let contacts = sqlx::query_as::<_, Contact>(&format!(
        "SELECT {} FROM contacts ORDER BY created_at DESC, id DESC",
        CONTACT_COLUMNS
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ContactListResponse { contacts }))
}

/// PATCH /api/admin/contacts/:id - Overwrite status
pub async fn update_contact_status(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<StatusUpdate>,
) -> AppResult<Json<ChangesResponse>> {
    let status = payload.into_status()?;

    let changes = sqlx::query("UPDATE contacts SET status = ? WHERE id = ?")
        .bind(&status)
        .bind(id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    tracing::info!(contact_id = id, status = %status, changes, admin = %admin.username, "contact status updated");

    Ok(Json(ChangesResponse {
        message: "Contact updated".to_string(),
        changes,
    }))
}

/// GET /api/admin/test-drives - All bookings, newest first
pub async fn list_test_drives(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<TestDriveListResponse>> {
    let test_drives = sqlx::query_as::<_, TestDrive>(&format!(
        "SELECT {} FROM test_drives ORDER BY created_at DESC, id DESC",
        TEST_DRIVE_COLUMNS
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(TestDriveListResponse { test_drives }))
}

/// PATCH /api/admin/test-drives/:id - Overwrite status
pub async fn update_test_drive_status(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<StatusUpdate>,
) -> AppResult<Json<ChangesResponse>> {
    let status = payload.into_status()?;

    let changes = sqlx::query("UPDATE test_drives SET status = ? WHERE id = ?")
        .bind(&status)
        .bind(id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    tracing::info!(test_drive_id = id, status = %status, changes, admin = %admin.username, "test drive status updated");

    Ok(Json(ChangesResponse {
        message: "Test drive updated".to_string(),
        changes,
    }))
}

/// DELETE /api/admin/test-drives/:id - Hard delete
pub async fn delete_test_drive(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ChangesResponse>> {
    let changes = sqlx::query("DELETE FROM test_drives WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    tracing::info!(test_drive_id = id, changes, admin = %admin.username, "test drive deleted");

    Ok(Json(ChangesResponse {
        message: "Test drive deleted".to_string(),
        changes,
    }))
}
