/**
 * Routes Module
 * API route handlers
 */

pub mod admin;
pub mod auth;
pub mod cars;
pub mod health;
pub mod leads;
pub mod showcase;

use serde::{Deserialize, Serialize};

/// Response for inserts: `{ message, id }`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

/// Response for updates and deletes: `{ message, changes }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChangesResponse {
    pub message: String,
    pub changes: u64,
}
