use super::*;

use attribution::{AttributionConfig, PageContext};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use shared::{clock::FixedClock, error::DeliveryError};
use storage::{sqlite_url_for_path, IdentityStore, MemoryIdentityStore, SqliteCookieJar};
use tokio::{net::TcpListener, sync::mpsc};

const MOBILE: u32 = 375;
const DESKTOP: u32 = 1280;

#[derive(Clone)]
struct WebhookState {
    tx: mpsc::UnboundedSender<Value>,
    status: StatusCode,
}

async fn handle_webhook(State(state): State<WebhookState>, Json(body): Json<Value>) -> StatusCode {
    let _ = state.tx.send(body);
    state.status
}

async fn spawn_webhook_server(status: StatusCode) -> (String, mpsc::UnboundedReceiver<Value>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/hooks/catch", post(handle_webhook))
        .with_state(WebhookState { tx, status });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/hooks/catch"), rx)
}

fn clock() -> Arc<FixedClock> {
    let now: DateTime<Utc> = "2026-10-18T15:00:00Z".parse().expect("timestamp");
    Arc::new(FixedClock::new(now))
}

fn service(
    webhook_url: &str,
    store: Arc<dyn IdentityStore>,
    clock: Arc<FixedClock>,
) -> AttributionService {
    let config = AttributionConfig {
        webhook_url: webhook_url.to_string(),
        ..AttributionConfig::default()
    };
    let page = PageContext::parse("https://example.com/book?fbclid=abc", "booking-tests/1.0")
        .expect("page url");
    AttributionService::new(config, page, store).with_clock(clock)
}

fn input(month: u32, day: u32) -> BookingInput {
    BookingInput {
        date: NaiveDate::from_ymd_opt(2026, month, day).expect("date"),
        time: "10:00 AM".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane@x.com".to_string(),
        phone: "5551234567".to_string(),
    }
}

#[tokio::test]
async fn mobile_visit_books_and_delivers() {
    let (url, mut rx) = spawn_webhook_server(StatusCode::OK).await;
    let clock = clock();
    let service = service(&url, Arc::new(MemoryIdentityStore::new()), clock.clone());

    let report = run_session(service, clock, MOBILE, input(10, 20))
        .await
        .expect("session");

    assert_eq!(report.confirmation.booking_date, "Tuesday, October 20, 2026");
    assert_eq!(report.confirmation.phone, "(555) 123-4567");
    assert_eq!(report.deliveries.len(), 1);
    assert!(report.deliveries[0].is_delivered());

    let payload = rx.recv().await.expect("webhook payload");
    assert_eq!(payload["phone"], "+15551234567");
    assert_eq!(payload["booking_time"], "10:00 AM");
    assert_eq!(payload["source_url"], "https://example.com/book?fbclid=abc");
    let fbc = payload["fbc"].as_str().expect("fbc");
    assert!(fbc.starts_with("fb.1.") && fbc.ends_with(".abc"));
}

#[tokio::test]
async fn later_month_is_reached_and_failed_delivery_still_confirms() {
    let (url, mut rx) = spawn_webhook_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let clock = clock();
    let service = service(&url, Arc::new(MemoryIdentityStore::new()), clock.clone());

    let report = run_session(service, clock, DESKTOP, input(12, 1))
        .await
        .expect("session");

    assert_eq!(report.confirmation.booking_date, "Tuesday, December 1, 2026");
    assert!(matches!(
        report.deliveries.as_slice(),
        [DeliveryOutcome::Failed(DeliveryError::Status(500))]
    ));
    assert!(rx.recv().await.is_some());
}

#[tokio::test]
async fn blank_email_is_rejected_without_delivery() {
    let (url, mut rx) = spawn_webhook_server(StatusCode::OK).await;
    let clock = clock();
    let service = service(&url, Arc::new(MemoryIdentityStore::new()), clock.clone());
    let mut input = input(10, 20);
    input.email = "  ".to_string();

    let err = run_session(service.clone(), clock, DESKTOP, input)
        .await
        .expect_err("validation failure");

    assert!(format!("{err:#}").contains("Email"));
    assert!(service.wait_for_deliveries().await.is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn past_date_fails_before_the_page_view() {
    let clock = clock();
    let store = Arc::new(MemoryIdentityStore::new());
    let service = service("http://127.0.0.1:9/unused", store.clone(), clock.clone());

    let err = run_session(service, clock.clone(), DESKTOP, input(10, 17))
        .await
        .expect_err("past date");

    assert!(err.to_string().contains("in the past"));
    assert!(store.list(clock.now()).await.expect("list").is_empty());
}

#[tokio::test]
async fn unknown_time_slot_is_rejected() {
    let clock = clock();
    let service = service(
        "http://127.0.0.1:9/unused",
        Arc::new(MemoryIdentityStore::new()),
        clock.clone(),
    );
    let mut input = input(10, 20);
    input.time = "10:15 AM".to_string();

    let err = run_session(service, clock, DESKTOP, input)
        .await
        .expect_err("unknown slot");
    assert!(err.to_string().contains("not an offered time slot"));
}

#[tokio::test]
async fn identity_survives_between_visits_in_the_cookie_jar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let jar_url = sqlite_url_for_path(&dir.path().join("cookies.db"));
    let (url, mut rx) = spawn_webhook_server(StatusCode::OK).await;
    let clock = clock();

    let mut payloads = Vec::new();
    for _ in 0..2 {
        let jar = SqliteCookieJar::open(&jar_url).await.expect("open jar");
        let service = service(&url, Arc::new(jar), clock.clone());
        run_session(service, clock.clone(), DESKTOP, input(10, 20))
            .await
            .expect("session");
        payloads.push(rx.recv().await.expect("payload"));
    }

    assert_eq!(payloads[0]["external_id"], payloads[1]["external_id"]);
    assert_eq!(payloads[0]["fbp"], payloads[1]["fbp"]);
    assert_ne!(payloads[0]["event_id"], payloads[1]["event_id"]);
}
