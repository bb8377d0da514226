/**
 * Authentication Routes
 * Admin login and bearer-token verification for the admin API
 */
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::db::models::Admin;
use crate::error::{AppError, AppResult};
use crate::extract::{present, ApiJson};
use crate::state::AppState;

const NO_TOKEN: &str = "Access denied. No token provided.";
const BAD_TOKEN: &str = "Invalid or expired token.";
const BAD_CREDENTIALS: &str = "Invalid credentials";

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: i64,          // Admin ID
    pub username: String, // Admin username
    pub role: String,     // Admin role
    pub exp: i64,         // Expiry timestamp
    pub iat: i64,         // Issued at timestamp
}

/// Admin info returned to the frontend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminInfo {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: AdminInfo,
}

// ============================================================================
// Token helpers
// ============================================================================

/// Sign a session token for `admin`, valid for the configured number of hours.
pub fn create_token(admin: &Admin, config: &JwtConfig) -> AppResult<String> {
    let now = Utc::now();
    let exp = Duration::try_hours(config.expiry_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Token expiry of {} hours is out of range",
                config.expiry_hours
            ))
        })?;

    let claims = Claims {
        id: admin.id,
        username: admin.username.clone(),
        role: admin.role.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from the Authorization header
fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authenticated admin, extracted from `Authorization: Bearer <token>`.
///
/// Missing token rejects with 401, a bad or expired one with 403.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Claims);

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))?;

        match verify_token(token, &state.config.jwt) {
            Ok(claims) => Ok(AuthAdmin(claims)),
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                Err(AppError::Forbidden(BAD_TOKEN.to_string()))
            }
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/admin/login
/// Authenticate an admin and return a session token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if !present(&payload.username) || !present(&payload.password) {
        return Err(AppError::BadRequest(
            "Username and password required".to_string(),
        ));
    }
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, password, email, role FROM admins WHERE username = ?",
    )
    .bind(&username)
    .fetch_optional(&state.pool)
    .await?;

    // Unknown user and wrong password must be indistinguishable to the caller.
    let Some(admin) = admin else {
        tracing::warn!("Login attempt for unknown user: {}", username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    // bcrypt is CPU-bound; keep the async executor free.
    let hash = admin.password.clone();
    let password_ok = tokio::task::spawn_blocking(move || {
        bcrypt::verify(&password, &hash).unwrap_or(false)
    })
    .await
    .unwrap_or(false);

    if !password_ok {
        tracing::warn!("Failed login attempt for: {}", admin.username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = create_token(&admin, &state.config.jwt)?;

    tracing::info!("Successful login for admin: {}", admin.username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: AdminInfo {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: admin.role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{send, test_app, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    fn test_admin() -> Admin {
        Admin {
            id: 7,
            username: "admin".to_string(),
            password: String::new(),
            email: Some("admin@apexmotors.com".to_string()),
            role: "superadmin".to_string(),
        }
    }

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 24,
        }
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::post("/api/admin/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap()
    }

    fn stats_request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::get("/api/admin/stats");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_token_round_trip_carries_identity() {
        let config = jwt_config();
        let token = create_token(&test_admin(), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "superadmin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = create_token(&test_admin(), &jwt_config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            expiry_hours: 24,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = JwtConfig {
            expiry_hours: -2,
            ..jwt_config()
        };
        let token = create_token(&test_admin(), &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_out_of_range_expiry_is_an_error_not_a_panic() {
        let config = JwtConfig {
            expiry_hours: i64::MAX / 2,
            ..jwt_config()
        };
        assert!(matches!(
            create_token(&test_admin(), &config),
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_login_with_out_of_range_expiry_returns_json_500() {
        let mut config = crate::config::AppConfig::for_tests();
        config.jwt.expiry_hours = i64::MAX / 2;
        let state = crate::test_support::test_state_with(config).await;
        let (status, body) = send(test_app(state), login_request("admin", "admin123")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Token expiry of"));
    }

    #[test]
    fn test_verify_garbage_returns_err() {
        assert!(verify_token("invalid.jwt.token", &jwt_config()).is_err());
    }

    #[tokio::test]
    async fn test_login_with_default_admin_succeeds() {
        let state = test_state().await;
        let (status, body) = send(test_app(state.clone()), login_request("admin", "admin123")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["username"], "admin");
        assert_eq!(body["user"]["role"], "superadmin");
        assert!(body["user"].get("password").is_none());

        let token = body["token"].as_str().unwrap();
        let claims = verify_token(token, &state.config.jwt).unwrap();
        assert_eq!(claims.username, "admin");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_identical() {
        let state = test_state().await;
        let wrong_password = send(test_app(state.clone()), login_request("admin", "nope")).await;
        let unknown_user = send(test_app(state), login_request("ghost", "admin123")).await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password.1, json!({ "error": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn test_login_missing_fields_returns_bad_request() {
        let state = test_state().await;
        let (status, body) = send(test_app(state.clone()), login_request("", "admin123")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username and password required");

        let req = Request::post("/api/admin/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"username":"admin"}"#))
            .unwrap();
        let (status, _) = send(test_app(state), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_malformed_json_returns_error_body() {
        let state = test_state().await;
        let req = Request::post("/api/admin/login")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(test_app(state), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_admin_route_without_token_is_unauthorized() {
        let state = test_state().await;
        let (status, body) = send(test_app(state.clone()), stats_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], NO_TOKEN);

        let (status, _) = send(test_app(state), stats_request(Some("Basic abc"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_route_with_tampered_token_is_forbidden() {
        let state = test_state().await;
        let token = create_token(&test_admin(), &state.config.jwt).unwrap();
        let tampered = format!("{}x", token);
        let (status, body) = send(
            test_app(state),
            stats_request(Some(&format!("Bearer {}", tampered))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], BAD_TOKEN);
    }

    #[tokio::test]
    async fn test_admin_route_with_expired_token_is_forbidden() {
        let state = test_state().await;
        let expired = JwtConfig {
            expiry_hours: -2,
            ..(state.config.jwt.clone())
        };
        let token = create_token(&test_admin(), &expired).unwrap();
        let (status, _) = send(
            test_app(state),
            stats_request(Some(&format!("Bearer {}", token))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_route_with_valid_token_passes() {
        let state = test_state().await;
        let token = create_token(&test_admin(), &state.config.jwt).unwrap();
        let (status, body): (StatusCode, Value) = send(
            test_app(state),
            stats_request(Some(&format!("Bearer {}", token))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["totalCars"].is_number());
    }
}
