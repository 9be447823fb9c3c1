use crate::auth;
use crate::error::ApiError;
use crate::models::Booking;
use crate::response::PrettyJson;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, http::StatusCode};

/// GET /bookings handler - List every stored booking
///
/// Bookings are ordered by the string `"<date> <time>"`. There is no calendar
/// parsing, so the order is only chronological when callers use sortable
/// formats such as `YYYY-MM-DD` and `HH:MM`.
#[utoipa::path(
    get,
    path = routes::BOOKINGS,
    responses(
        (status = 200, description = "All bookings, sorted by date and time", body = [Booking]),
        (status = 401, description = "Missing or invalid bearer token", body = String, content_type = "text/plain"),
        (status = 500, description = "Server misconfigured or storage unavailable", body = String, content_type = "text/plain")
    ),
    security(("bearer" = [])),
    tag = "bookings"
)]
pub async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<PrettyJson<Vec<Booking>>, ApiError> {
    auth::check(&headers, &state.config)?;
    let store = state.store()?;

    let mut bookings = store.list_all().await?;
    sort_by_schedule(&mut bookings);

    tracing::info!("Listed {} bookings", bookings.len());
    Ok(PrettyJson(StatusCode::OK, bookings))
}

/// Stable ascending sort on the lexical `"<date> <time>"` key
pub fn sort_by_schedule(bookings: &mut [Booking]) {
    bookings.sort_by_cached_key(Booking::schedule_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::*;
    use crate::kv::KvStore;
    use crate::store::tests::booking;
    use tower::ServiceExt;

    async fn list(app: &axum::Router) -> Vec<Booking> {
        let response = app.clone().oneshot(get_bookings(Some(TOKEN))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    async fn seed(kv: &dyn KvStore, booking: &Booking) {
        kv.put(&booking.storage_key(), serde_json::to_string(booking).unwrap())
            .await
            .unwrap();
    }

    #[test]
    fn test_sort_by_schedule_is_lexical() {
        let mut bookings = vec![
            booking("a", "2024-01-02", "09:00"),
            booking("b", "2024-01-01", "10:00"),
            booking("c", "2024-01-02", "08:00"),
        ];

        sort_by_schedule(&mut bookings);

        let order: Vec<&str> = bookings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_schedule_keeps_ties_in_place() {
        let mut bookings = vec![
            booking("z", "2024-01-01", "10:00"),
            booking("a", "2024-01-01", "10:00"),
        ];

        sort_by_schedule(&mut bookings);

        assert_eq!(bookings[0].id, "z");
        assert_eq!(bookings[1].id, "a");
    }

    #[tokio::test]
    async fn test_list_endpoint_empty() {
        let (app, _) = setup_test_app();

        let response = app.oneshot(get_bookings(Some(TOKEN))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["cache-control"], "no-store");
        assert_cors(&response);
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_list_endpoint_sorted_by_date_and_time() {
        let (app, kv) = setup_test_app();
        seed(&*kv, &booking("late", "2024-01-02", "09:00")).await;
        seed(&*kv, &booking("first", "2024-01-01", "10:00")).await;
        seed(&*kv, &booking("early", "2024-01-02", "08:00")).await;

        let bookings = list(&app).await;

        let schedule: Vec<String> = bookings.iter().map(Booking::schedule_key).collect();
        assert_eq!(
            schedule,
            vec!["2024-01-01 10:00", "2024-01-02 08:00", "2024-01-02 09:00"]
        );
    }

    #[tokio::test]
    async fn test_list_endpoint_skips_corrupt_records() {
        let (app, kv) = setup_test_app();
        seed(&*kv, &booking("good", "2024-01-01", "10:00")).await;
        kv.put("booking:corrupt", "{invalid json}".to_string()).await.unwrap();

        let bookings = list(&app).await;

        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, "good");
    }

    #[tokio::test]
    async fn test_list_endpoint_is_repeatable() {
        let (app, kv) = setup_test_app();
        for i in 0..5 {
            seed(&*kv, &booking(&i.to_string(), "2024-02-01", &format!("1{}:00", i))).await;
        }

        let first = list(&app).await;
        let second = list(&app).await;

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_list_endpoint_requires_token() {
        let (app, _) = setup_test_app();

        let response = app.clone().oneshot(get_bookings(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_cors(&response);
        assert_eq!(body_string(response).await, "Unauthorized");

        let response = app.oneshot(get_bookings(Some("wrong"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_endpoint_without_secret() {
        let app = app_with(test_config(None), None);

        let response = app.oneshot(get_bookings(Some(TOKEN))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Server misconfigured");
    }

    #[tokio::test]
    async fn test_list_endpoint_without_storage() {
        let app = app_with(test_config(Some(TOKEN)), None);

        let response = app.oneshot(get_bookings(Some(TOKEN))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert_eq!(body_string(response).await, "Storage unavailable");
    }
}
