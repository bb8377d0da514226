/**
 * Showcase Routes
 * Read-only testimonials and gallery for the public site
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::{GalleryImage, Testimonial};
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TestimonialListResponse {
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryResponse {
    pub images: Vec<GalleryImage>,
}

/// GET /api/testimonials - Active testimonials, newest first
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> AppResult<Json<TestimonialListResponse>> {
    let testimonials = sqlx::query_as::<_, Testimonial>(
        r#"
        SELECT id, name, role, car_model, quote, image_url, rating, active, created_at
        FROM testimonials
        WHERE active = 1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(TestimonialListResponse { testimonials }))
}

/// GET /api/gallery - Active images in display order
pub async fn list_gallery(State(state): State<AppState>) -> AppResult<Json<GalleryResponse>> {
    let images = sqlx::query_as::<_, GalleryImage>(
        r#"
        SELECT id, title, image_url, category, display_order, active, created_at
        FROM gallery
        WHERE active = 1
        ORDER BY display_order ASC, id ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(GalleryResponse { images }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{send, test_app, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_testimonials_newest_first_and_active_only() {
        let state = test_state().await;
        sqlx::query("UPDATE testimonials SET active = 0 WHERE name = 'Marcus Sterling'")
            .execute(&state.pool)
            .await
            .unwrap();

        let (status, body) = send(test_app(state), get("/api/testimonials")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["testimonials"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["James Worthington", "Alexander Chen"]);
        assert_eq!(body["testimonials"][0]["rating"], 5);
    }

    #[tokio::test]
    async fn test_gallery_is_ordered_by_display_order() {
        let state = test_state().await;
        for (title, order, active) in [("Rear", 3, 1), ("Front", 1, 1), ("Hidden", 0, 0), ("Side", 2, 1)] {
            sqlx::query("INSERT INTO gallery (title, image_url, display_order, active) VALUES (?, ?, ?, ?)")
                .bind(title)
                .bind(format!("https://img.example/{}.jpg", title))
                .bind(order)
                .bind(active)
                .execute(&state.pool)
                .await
                .unwrap();
        }

        let (status, body) = send(test_app(state), get("/api/gallery")).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body["images"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Front", "Side", "Rear"]);
    }

    #[tokio::test]
    async fn test_empty_gallery_returns_empty_list() {
        let state = test_state().await;
        let (status, body) = send(test_app(state), get("/api/gallery")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["images"].as_array().unwrap().len(), 0);
    }
}
