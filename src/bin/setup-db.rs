//! One-shot database setup: create tables and insert default rows.
//!
//! Reads the same environment as the server (`DATABASE_URL`,
//! `ADMIN_PASSWORD_HASH`, ...). Safe to run against an existing database.

use apex_motors::{config::AppConfig, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apex_motors=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let pool = db::init_pool(&db::DbConfig::from_app_config(&config)).await?;

    let report = db::seed::bootstrap(&pool, &config.admin_seed).await;
    pool.close().await;

    println!("Database: {}", config.database_url);
    println!("  admins inserted       : {}", report.admins);
    println!("  cars inserted         : {}", report.cars);
    println!("  testimonials inserted : {}", report.testimonials);
    if report.admins > 0 && config.admin_seed.password_hash.is_none() {
        println!("\nDefault admin 'admin' created; change its password before going live.");
    }

    Ok(())
}
