//! Runtime configuration loaded from environment variables.

use std::time::Duration;

/// JWT secret used when `JWT_SECRET` is unset. Refused in production.
pub const DEFAULT_JWT_SECRET: &str = "apex-motors-secret-key-2026";

/// Accepted range for `JWT_EXPIRY_HOURS`: at least an hour, at most a year.
pub const JWT_EXPIRY_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=8760;

/// Development password for the seeded admin account.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub admin_seed: AdminSeedConfig,
    pub rate_limit: RateLimitConfig,
    pub public_dir: String,
    /// Explicit CORS allow-list. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

/// Credentials for the admin account inserted by the seed bootstrapper.
#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    /// Pre-computed bcrypt hash; takes precedence over `password`.
    pub password_hash: Option<String>,
    pub password: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default                        |
    /// |--------------------------|--------------------------------|
    /// | `HOST`                   | `0.0.0.0`                      |
    /// | `PORT`                   | `3000`                         |
    /// | `ENVIRONMENT`            | `development`                  |
    /// | `DATABASE_URL`           | `sqlite://database.sqlite`     |
    /// | `DB_POOL_MAX`            | `5`                            |
    /// | `JWT_SECRET`             | [`DEFAULT_JWT_SECRET`]         |
    /// | `JWT_EXPIRY_HOURS`       | `24`                           |
    /// | `ADMIN_PASSWORD_HASH`    | unset                          |
    /// | `ADMIN_PASSWORD`         | [`DEFAULT_ADMIN_PASSWORD`]     |
    /// | `BCRYPT_COST`            | `10`                           |
    /// | `RATE_LIMIT_MAX`         | `100`                          |
    /// | `RATE_LIMIT_WINDOW_SECS` | `900`                          |
    /// | `PUBLIC_DIR`             | `public`                       |
    /// | `ALLOWED_ORIGINS`        | unset (any origin)             |
    ///
    /// Numeric values that fail to parse fall back to their default.
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            environment: env_or("ENVIRONMENT", "development"),
            database_url: env_or("DATABASE_URL", "sqlite://database.sqlite"),
            db_max_connections: env_parse("DB_POOL_MAX", 5),
            jwt: JwtConfig {
                secret: env_or("JWT_SECRET", DEFAULT_JWT_SECRET),
                expiry_hours: env_parse("JWT_EXPIRY_HOURS", 24),
            },
            admin_seed: AdminSeedConfig {
                password_hash: std::env::var("ADMIN_PASSWORD_HASH")
                    .ok()
                    .filter(|h| !h.is_empty()),
                password: env_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
                bcrypt_cost: env_parse("BCRYPT_COST", 10),
            },
            rate_limit: RateLimitConfig {
                max_requests: env_parse("RATE_LIMIT_MAX", 100),
                window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 900)),
            },
            public_dir: env_or("PUBLIC_DIR", "public"),
            allowed_origins,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuse configurations that cannot issue usable tokens, or are unsafe in production.
    pub fn validate(&self) -> Result<(), String> {
        if !JWT_EXPIRY_HOURS_RANGE.contains(&self.jwt.expiry_hours) {
            return Err(format!(
                "JWT_EXPIRY_HOURS must be between {} and {}, got {}",
                JWT_EXPIRY_HOURS_RANGE.start(),
                JWT_EXPIRY_HOURS_RANGE.end(),
                self.jwt.expiry_hours
            ));
        }
        if self.is_production()
            && (self.jwt.secret.is_empty() || self.jwt.secret == DEFAULT_JWT_SECRET)
        {
            return Err(
                "JWT_SECRET must be set to a secure, unique value in production".to_string(),
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl AppConfig {
    /// Configuration for in-process tests: in-memory store, cheap hashing.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
                expiry_hours: 24,
            },
            admin_seed: AdminSeedConfig {
                password_hash: None,
                password: DEFAULT_ADMIN_PASSWORD.to_string(),
                bcrypt_cost: 4,
            },
            rate_limit: RateLimitConfig {
                max_requests: 1000,
                window: Duration::from_secs(900),
            },
            public_dir: "public".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}
