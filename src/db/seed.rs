//! Default data inserted the first time each table is found empty.

use sqlx::SqlitePool;

use super::models::{NewCar, NewTestimonial};
use crate::config::AdminSeedConfig;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@apexmotors.com";
pub const DEFAULT_ADMIN_ROLE: &str = "superadmin";

/// What the bootstrapper inserted on this run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub admins: u64,
    pub cars: u64,
    pub testimonials: u64,
}

pub fn default_cars() -> Vec<NewCar> {
    vec![
        NewCar {
            name: "Phantom GT".into(),
            tagline: Some("The Grand Tourer".into()),
            description: Some(
                "Experience unparalleled luxury and performance in our flagship grand tourer."
                    .into(),
            ),
            price: 285_000,
            horsepower: Some(700),
            acceleration: Some(3.2),
            top_speed: Some(205),
            image_url: Some(
                "https://images.unsplash.com/photo-1544636331-e26879cd4d9b?w=800&q=80".into(),
            ),
            featured: false,
        },
        NewCar {
            name: "Crimson X".into(),
            tagline: Some("The Ultimate Expression".into()),
            description: Some(
                "Our most powerful creation. Pure adrenaline meets refined elegance.".into(),
            ),
            price: 425_000,
            horsepower: Some(847),
            acceleration: Some(2.8),
            top_speed: Some(217),
            image_url: Some(
                "https://images.unsplash.com/photo-1617788138017-80ad40651399?w=800&q=80".into(),
            ),
            featured: true,
        },
        NewCar {
            name: "Shadow S".into(),
            tagline: Some("Stealth Performance".into()),
            description: Some("Silent power. Invisible presence. Absolute dominance.".into()),
            price: 245_000,
            horsepower: Some(650),
            acceleration: Some(3.5),
            top_speed: Some(198),
            image_url: Some(
                "https://images.unsplash.com/photo-1552519507-da3b142c6e3d?w=800&q=80".into(),
            ),
            featured: false,
        },
    ]
}

pub fn default_testimonials() -> Vec<NewTestimonial> {
    vec![
        NewTestimonial {
            name: "Alexander Chen".into(),
            role: Some("Tech Entrepreneur".into()),
            car_model: Some("Crimson X".into()),
            quote: "The Crimson X isn't just a car, it's a statement. Every drive feels like an event."
                .into(),
            image_url: Some(
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=100&q=80".into(),
            ),
            rating: 5,
        },
        NewTestimonial {
            name: "Marcus Sterling".into(),
            role: Some("Investment Banker".into()),
            car_model: Some("Phantom GT".into()),
            quote: "Unmatched performance with uncompromising luxury. Apex has redefined what a supercar can be."
                .into(),
            image_url: Some(
                "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100&q=80".into(),
            ),
            rating: 5,
        },
        NewTestimonial {
            name: "James Worthington".into(),
            role: Some("Professional Athlete".into()),
            car_model: Some("Shadow S".into()),
            quote: "The attention to detail is extraordinary. From the leather stitching to the exhaust note - perfection."
                .into(),
            image_url: Some(
                "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=100&q=80".into(),
            ),
            rating: 5,
        },
    ]
}

async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn admin_password_hash(config: &AdminSeedConfig) -> anyhow::Result<String> {
    if let Some(hash) = &config.password_hash {
        return Ok(hash.clone());
    }

    // bcrypt is CPU-bound; keep it off the async workers.
    let password = config.password.clone();
    let cost = config.bcrypt_cost;
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

async fn seed_admin(pool: &SqlitePool, config: &AdminSeedConfig) -> anyhow::Result<u64> {
    if count_rows(pool, "admins").await? > 0 {
        return Ok(0);
    }

    let hash = admin_password_hash(config).await?;
    sqlx::query("INSERT INTO admins (username, password, email, role) VALUES (?, ?, ?, ?)")
        .bind(DEFAULT_ADMIN_USERNAME)
        .bind(&hash)
        .bind(DEFAULT_ADMIN_EMAIL)
        .bind(DEFAULT_ADMIN_ROLE)
        .execute(pool)
        .await?;

    tracing::info!(username = DEFAULT_ADMIN_USERNAME, "Default admin created");
    Ok(1)
}

async fn seed_cars(pool: &SqlitePool) -> anyhow::Result<u64> {
    if count_rows(pool, "cars").await? > 0 {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for car in default_cars() {
        inserted += sqlx::query(
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
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;

    tracing::info!(count = inserted, "Default cars inserted");
    Ok(inserted)
}

async fn seed_testimonials(pool: &SqlitePool) -> anyhow::Result<u64> {
    if count_rows(pool, "testimonials").await? > 0 {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for t in default_testimonials() {
        inserted += sqlx::query(
            "INSERT INTO testimonials (name, role, car_model, quote, image_url, rating) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&t.name)
        .bind(&t.role)
        .bind(&t.car_model)
        .bind(&t.quote)
        .bind(&t.image_url)
        .bind(t.rating)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;

    tracing::info!(count = inserted, "Default testimonials inserted");
    Ok(inserted)
}

/// Create missing tables and insert default rows into empty ones.
///
/// Safe to run on every boot. Each step logs its own failure and the
/// remaining steps still run.
pub async fn bootstrap(pool: &SqlitePool, admin: &AdminSeedConfig) -> SeedReport {
    super::run_migrations(pool).await;

    let mut report = SeedReport::default();

    match seed_admin(pool, admin).await {
        Ok(n) => report.admins = n,
        Err(e) => tracing::error!(error = %e, "failed to seed default admin"),
    }
    match seed_cars(pool).await {
        Ok(n) => report.cars = n,
        Err(e) => tracing::error!(error = %e, "failed to seed default cars"),
    }
    match seed_testimonials(pool).await {
        Ok(n) => report.testimonials = n,
        Err(e) => tracing::error!(error = %e, "failed to seed default testimonials"),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::memory_pool;

    async fn counts(pool: &SqlitePool) -> (i64, i64, i64) {
        (
            count_rows(pool, "admins").await.unwrap(),
            count_rows(pool, "cars").await.unwrap(),
            count_rows(pool, "testimonials").await.unwrap(),
        )
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_empty_store() {
        let pool = memory_pool().await;
        let report = bootstrap(&pool, &AppConfig::for_tests().admin_seed).await;
        assert_eq!(
            report,
            SeedReport {
                admins: 1,
                cars: 3,
                testimonials: 3
            }
        );
        assert_eq!(counts(&pool).await, (1, 3, 3));
    }

    #[tokio::test]
    async fn test_bootstrap_twice_is_idempotent() {
        let pool = memory_pool().await;
        let seed = AppConfig::for_tests().admin_seed;
        bootstrap(&pool, &seed).await;
        let second = bootstrap(&pool, &seed).await;
        assert_eq!(second, SeedReport::default());
        assert_eq!(counts(&pool).await, (1, 3, 3));
    }

    #[tokio::test]
    async fn test_bootstrap_only_fills_empty_tables() {
        let pool = memory_pool().await;
        crate::db::run_migrations(&pool).await;
        sqlx::query("INSERT INTO cars (name, price) VALUES ('Custom', 1)")
            .execute(&pool)
            .await
            .unwrap();

        let report = bootstrap(&pool, &AppConfig::for_tests().admin_seed).await;
        assert_eq!(report.cars, 0);
        assert_eq!(report.admins, 1);
        assert_eq!(counts(&pool).await, (1, 1, 3));
    }

    #[tokio::test]
    async fn test_seeded_admin_password_is_hashed() {
        let pool = memory_pool().await;
        let seed = AppConfig::for_tests().admin_seed;
        bootstrap(&pool, &seed).await;

        let (stored,): (String,) = sqlx::query_as("SELECT password FROM admins WHERE username = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(stored, seed.password);
        assert!(bcrypt::verify(&seed.password, &stored).unwrap());
    }

    #[tokio::test]
    async fn test_precomputed_hash_is_used_verbatim() {
        let pool = memory_pool().await;
        let mut seed = AppConfig::for_tests().admin_seed;
        let hash = bcrypt::hash("s3cret-pass", 4).unwrap();
        seed.password_hash = Some(hash.clone());
        bootstrap(&pool, &seed).await;

        let (stored,): (String,) = sqlx::query_as("SELECT password FROM admins")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, hash);
    }

    #[test]
    fn test_exactly_one_default_car_is_featured() {
        let featured: Vec<_> = default_cars().into_iter().filter(|c| c.featured).collect();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Crimson X");
    }
}
