/**
 * Car Routes
 * Public inventory listing plus admin create/patch/soft-delete
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Sqlite};

use crate::db::models::{Car, NewCar, CAR_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::extract::{non_blank, present, ApiJson, ApiPath};
use crate::routes::auth::AuthAdmin;
use crate::routes::{ChangesResponse, CreatedResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CarListResponse {
    pub cars: Vec<Car>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarResponse {
    pub car: Option<Car>,
}

/// Flags arrive as JSON booleans or as the 0/1 integers the store uses.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> bool {
        match flag {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

/// Request body for POST /api/admin/cars
#[derive(Debug, Deserialize)]
pub struct CreateCarRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub horsepower: Option<i64>,
    pub acceleration: Option<f64>,
    pub top_speed: Option<i64>,
    pub image_url: Option<String>,
    pub featured: Option<Flag>,
}

// ============================================================================
// Patch allow-list
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Text { nullable: bool },
    Integer { nullable: bool },
    Real,
    Flag,
}

/// The only columns PATCH /api/admin/cars/:id may write.
const UPDATABLE_CAR_COLUMNS: &[(&str, ColumnKind)] = &[
    ("name", ColumnKind::Text { nullable: false }),
    ("tagline", ColumnKind::Text { nullable: true }),
    ("description", ColumnKind::Text { nullable: true }),
    ("price", ColumnKind::Integer { nullable: false }),
    ("horsepower", ColumnKind::Integer { nullable: true }),
    ("acceleration", ColumnKind::Real),
    ("top_speed", ColumnKind::Integer { nullable: true }),
    ("image_url", ColumnKind::Text { nullable: true }),
    ("featured", ColumnKind::Flag),
    ("active", ColumnKind::Flag),
];

#[derive(Debug, Clone, PartialEq)]
enum CarValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Real(Option<f64>),
    Flag(bool),
}

fn invalid(column: &str, expected: &str) -> AppError {
    AppError::BadRequest(format!("Field '{}' must be {}", column, expected))
}

fn convert(column: &str, kind: ColumnKind, value: Value) -> AppResult<CarValue> {
    match (kind, value) {
        (ColumnKind::Text { nullable: true }, Value::Null) => Ok(CarValue::Text(None)),
        (ColumnKind::Text { nullable }, Value::String(s)) => {
            if !nullable && s.trim().is_empty() {
                return Err(invalid(column, "a non-empty string"));
            }
            Ok(CarValue::Text(Some(s)))
        }
        (ColumnKind::Text { .. }, _) => Err(invalid(column, "a string")),

        (ColumnKind::Integer { nullable: true }, Value::Null) => Ok(CarValue::Integer(None)),
        (ColumnKind::Integer { .. }, Value::Number(n)) if n.is_i64() => {
            Ok(CarValue::Integer(n.as_i64()))
        }
        (ColumnKind::Integer { .. }, _) => Err(invalid(column, "an integer")),

        (ColumnKind::Real, Value::Null) => Ok(CarValue::Real(None)),
        (ColumnKind::Real, Value::Number(n)) => Ok(CarValue::Real(n.as_f64())),
        (ColumnKind::Real, _) => Err(invalid(column, "a number")),

        (ColumnKind::Flag, Value::Bool(b)) => Ok(CarValue::Flag(b)),
        (ColumnKind::Flag, Value::Number(n)) if n.is_i64() => {
            Ok(CarValue::Flag(n.as_i64() != Some(0)))
        }
        (ColumnKind::Flag, _) => Err(invalid(column, "a boolean")),
    }
}

/// Map a JSON patch onto allow-listed columns. Unknown keys are rejected, never written.
fn parse_car_patch(fields: Map<String, Value>) -> AppResult<Vec<(&'static str, CarValue)>> {
    if fields.is_empty() {
        return Err(AppError::BadRequest(
            "No updatable fields provided".to_string(),
        ));
    }

    fields
        .into_iter()
        .map(|(key, value)| {
            let (column, kind) = UPDATABLE_CAR_COLUMNS
                .iter()
                .find(|(column, _)| *column == key)
                .ok_or_else(|| AppError::BadRequest(format!("Field '{}' cannot be updated", key)))?;
            Ok((*column, convert(column, *kind, value)?))
        })
        .collect()
}

// ============================================================================
// Public handlers
// ============================================================================

/// GET /api/cars - Active cars, featured first, then alphabetical
pub async fn list_cars(State(state): State<AppState>) -> AppResult<Json<CarListResponse>> {
    let cars = sqlx::query_as::<_, Car>(&format!(
        "SELECT {} FROM cars WHERE active = 1 ORDER BY featured DESC, name ASC",
        CAR_COLUMNS
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(CarListResponse { cars }))
}

/// GET /api/cars/:id - Single active car
pub async fn get_car(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<CarResponse>> {
    let car = sqlx::query_as::<_, Car>(&format!(
        "SELECT {} FROM cars WHERE id = ? AND active = 1",
        CAR_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

    Ok(Json(CarResponse { car: Some(car) }))
}

/// GET /api/cars/featured/special - The flagship, or `{ "car": null }`
pub async fn get_featured_car(State(state): State<AppState>) -> AppResult<Json<CarResponse>> {
    let car = sqlx::query_as::<_, Car>(&format!(
        "SELECT {} FROM cars WHERE featured = 1 AND active = 1 ORDER BY id LIMIT 1",
        CAR_COLUMNS
    ))
    .fetch_optional(&state.pool)
    .await?;

    Ok(Json(CarResponse { car }))
}

// ============================================================================
// Admin handlers
// ============================================================================

/// POST /api/admin/cars
pub async fn create_car(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCarRequest>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let price = match payload.price {
        Some(price) if price != 0 && present(&payload.name) => price,
        _ => {
            return Err(AppError::BadRequest(
                "Name and price are required".to_string(),
            ))
        }
    };

    let car = NewCar {
        name: payload.name.unwrap_or_default(),
        tagline: non_blank(payload.tagline),
        description: non_blank(payload.description),
        price,
        horsepower: payload.horsepower,
        acceleration: payload.acceleration,
        top_speed: payload.top_speed,
        image_url: non_blank(payload.image_url),
        featured: payload.featured.map(bool::from).unwrap_or(false),
    };

    let id = sqlx::query(
        r#"
        INSERT INTO cars (name, tagline, description, price, horsepower, acceleration, top_speed, image_url, featured)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&car.name)
    .bind(&car.tagline)
    .bind(&car.description)
    .bind(car.price)
    .bind(car.horsepower)
    .bind(car.acceleration)
    .bind(car.top_speed)
    .bind(&car.image_url)
    .bind(car.featured)
    .execute(&state.pool)
    .await?
    .last_insert_rowid();

    tracing::info!(car_id = id, name = %car.name, admin = %admin.username, "car created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Car added successfully".to_string(),
            id,
        }),
    ))
}

/// PATCH /api/admin/cars/:id - Partial update over allow-listed columns
pub async fn update_car(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> AppResult<Json<ChangesResponse>> {
    let updates = parse_car_patch(fields)?;

    // Column names come from the allow-list; every value is a bound parameter.
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE cars SET ");
    {
        let mut set = builder.separated(", ");
        for (column, value) in updates {
            set.push(column).push_unseparated(" = ");
            match value {
                CarValue::Text(v) => set.push_bind_unseparated(v),
                CarValue::Integer(v) => set.push_bind_unseparated(v),
                CarValue::Real(v) => set.push_bind_unseparated(v),
                CarValue::Flag(v) => set.push_bind_unseparated(v),
            };
        }
    }
    builder.push(" WHERE id = ").push_bind(id);

    let changes = builder.build().execute(&state.pool).await?.rows_affected();

    tracing::info!(car_id = id, changes, admin = %admin.username, "car updated");

    Ok(Json(ChangesResponse {
        message: "Car updated".to_string(),
        changes,
    }))
}

/// DELETE /api/admin/cars/:id - Soft delete
pub async fn delete_car(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ChangesResponse>> {
    let changes = sqlx::query("UPDATE cars SET active = 0 WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    tracing::info!(car_id = id, changes, admin = %admin.username, "car deactivated");

    Ok(Json(ChangesResponse {
        message: "Car deleted".to_string(),
        changes,
    }))
}
