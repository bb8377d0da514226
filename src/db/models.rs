//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Car model row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub horsepower: Option<i64>,
    pub acceleration: Option<f64>,
    pub top_speed: Option<i64>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Contact form submission
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub model_interest: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Test drive booking
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestDrive {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub model: String,
    pub preferred_date: String,
    pub preferred_time: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Admin account. The password hash never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: String,
}

/// Gallery image
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub title: Option<String>,
    pub image_url: String,
    pub category: Option<String>,
    pub display_order: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Customer testimonial
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub role: Option<String>,
    pub car_model: Option<String>,
    pub quote: String,
    pub image_url: Option<String>,
    pub rating: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// New car for insertion (seed data and admin creation)
#[derive(Debug, Clone)]
pub struct NewCar {
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub horsepower: Option<i64>,
    pub acceleration: Option<f64>,
    pub top_speed: Option<i64>,
    pub image_url: Option<String>,
    pub featured: bool,
}

/// New testimonial for insertion (seed data)
#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub name: String,
    pub role: Option<String>,
    pub car_model: Option<String>,
    pub quote: String,
    pub image_url: Option<String>,
    pub rating: i64,
}

pub const CAR_COLUMNS: &str = "id, name, tagline, description, price, horsepower, acceleration, \
     top_speed, image_url, featured, active, created_at";

pub const CONTACT_COLUMNS: &str =
    "id, name, email, phone, model_interest, message, status, created_at";

pub const TEST_DRIVE_COLUMNS: &str = "id, name, email, phone, model, preferred_date, \
     preferred_time, status, notes, created_at";
