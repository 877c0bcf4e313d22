//! Router-level tests over the in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::create_routes;
use crate::config::Config;
use crate::handlers::auth::USER_ID_HEADER;
use crate::models::{Discount, DiscountUnit, Event, EventTicket, InventoryStatus, Role, User};
use crate::repositories::memory::InMemoryStore;
use crate::services::{AssignmentCaches, AssignmentStores, InventoryUpdater, TicketAssignmentService};
use crate::state::AppState;

const BASE: &str = "/api/v1/event-ticket-assignments";

struct Harness {
    store: InMemoryStore,
    app: axum::Router,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        _ => None,
    })
    .expect("test config");

    let stores = AssignmentStores {
        events: Arc::new(store.clone()),
        discounts: Arc::new(store.clone()),
        assignments: Arc::new(store.clone()),
        users: Arc::new(store.clone()),
    };
    let inventory = InventoryUpdater::new(Arc::new(store.clone()), Duration::from_secs(1));
    let service =
        TicketAssignmentService::new(stores, Arc::new(inventory), AssignmentCaches::default());

    Harness {
        app: create_routes(AppState::new(service), &config),
        store,
    }
}

fn seed_event(store: &InMemoryStore) -> Event {
    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4(),
        organizer_id: Uuid::new_v4(),
        venue_id: Some(Uuid::new_v4()),
        title: "Harbour Jazz Night".to_string(),
        start_time: now + chrono::Duration::days(3),
        end_time: None,
        capacity: 100,
        created_at: now,
        updated_at: now,
    };
    store.put_event(event.clone());
    event
}

fn seed_user(store: &InMemoryStore, role: Role) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: "Robin".to_string(),
        email: "robin@example.com".to_string(),
        role,
        created_at: now,
        updated_at: now,
    };
    store.put_user(user.clone());
    user
}

fn request(method: Method, uri: &str, actor: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(USER_ID_HEADER, actor.to_string());
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn create_body(event_id: Uuid, price: i64, quantity: i32) -> Value {
    json!({
        "event_id": event_id,
        "attendance_id": Uuid::new_v4(),
        "price": price,
        "quantity": quantity,
        "ticket_type": "general",
        "status": "use",
    })
}

fn price_of(assignment: &Value) -> Decimal {
    assignment["price"]
        .as_str()
        .expect("price serialized as string")
        .parse()
        .expect("decimal price")
}

#[tokio::test]
async fn test_health_check_reports_ok_with_security_headers() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_create_requires_authenticated_user() {
    let h = harness();
    let event = seed_event(&h.store);

    let (status, body) = send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            None,
            Some(create_body(event.id, 10, 1)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(h.store.assignment_count(), 0);
}

#[tokio::test]
async fn test_create_with_percent_discount_stores_discounted_unit_price() {
    let h = harness();
    let event = seed_event(&h.store);
    let buyer = Uuid::new_v4();
    let now = Utc::now();
    h.store.put_discount(Discount {
        id: Uuid::new_v4(),
        event_id: event.id,
        user_id: buyer,
        value: Decimal::from(20),
        unit: DiscountUnit::Percent,
        valid_from: now - chrono::Duration::hours(1),
        valid_until: now + chrono::Duration::hours(1),
    });

    let (status, body) = send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(buyer),
            Some(create_body(event.id, 100, 3)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success" }));

    let (status, body) = send(&h.app, request(Method::GET, BASE, Some(buyer), None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(price_of(&listed[0]), Decimal::from(80));
    assert_eq!(listed[0]["quantity"], 3);
    assert_eq!(listed[0]["status"], "use");
}

#[tokio::test]
async fn test_create_without_discount_stores_unit_price() {
    let h = harness();
    let event = seed_event(&h.store);
    let buyer = Uuid::new_v4();

    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(buyer),
            Some(create_body(event.id, 50, 2)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &h.app,
        request(Method::GET, &format!("{BASE}/event/{}", event.id), Some(buyer), None),
    )
    .await;
    let listed = body["data"].as_array().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(price_of(&listed[0]), Decimal::from(50));
}

#[tokio::test]
async fn test_create_records_sale_in_background() {
    let h = harness();
    let event = seed_event(&h.store);
    let ticket = EventTicket {
        id: Uuid::new_v4(),
        event_id: event.id,
        total_quantity: 10,
        sold_quantity: 2,
        status: InventoryStatus::Available,
    };
    h.store.put_ticket(ticket.clone());

    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(Uuid::new_v4()),
            Some(create_body(event.id, 10, 4)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut sold = 0;
    for _ in 0..50 {
        sold = h.store.ticket(ticket.id).expect("ticket").sold_quantity;
        if sold == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sold, 3);
}

#[tokio::test]
async fn test_create_for_unknown_event_is_bad_request() {
    let h = harness();

    let (status, body) = send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(Uuid::new_v4()),
            Some(create_body(Uuid::new_v4(), 10, 1)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("not found"));
    assert_eq!(h.store.assignment_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = harness();

    let (status, body) = send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(Uuid::new_v4()),
            Some(json!({ "event_id": "nope" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let h = harness();

    let (status, _) = send(
        &h.app,
        request(
            Method::GET,
            &format!("{BASE}/not-a-uuid"),
            Some(Uuid::new_v4()),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_by_non_admin_is_rejected_and_keeps_record() {
    let h = harness();
    let event = seed_event(&h.store);
    let user = seed_user(&h.store, Role::User);

    send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(user.id),
            Some(create_body(event.id, 10, 1)),
        ),
    )
    .await;
    let (_, body) = send(&h.app, request(Method::GET, BASE, Some(user.id), None)).await;
    let id = body["data"][0]["id"].as_str().expect("id").to_string();

    let (status, body) = send(
        &h.app,
        request(Method::DELETE, &format!("{BASE}/{id}"), Some(user.id), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(h.store.assignment_count(), 1);
}

#[tokio::test]
async fn test_admin_can_correct_then_delete() {
    let h = harness();
    let event = seed_event(&h.store);
    let admin = seed_user(&h.store, Role::Admin);

    send(
        &h.app,
        request(
            Method::POST,
            &format!("{BASE}/create"),
            Some(Uuid::new_v4()),
            Some(create_body(event.id, 10, 1)),
        ),
    )
    .await;
    let (_, body) = send(&h.app, request(Method::GET, BASE, Some(admin.id), None)).await;
    let id = body["data"][0]["id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &h.app,
        request(
            Method::PUT,
            &format!("{BASE}/{id}"),
            Some(admin.id),
            Some(json!({ "status": "useless" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &h.app,
        request(Method::GET, &format!("{BASE}/{id}"), Some(admin.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "useless");

    let (status, _) = send(
        &h.app,
        request(Method::DELETE, &format!("{BASE}/{id}"), Some(admin.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.store.assignment_count(), 0);

    let (status, _) = send(
        &h.app,
        request(Method::GET, &format!("{BASE}/{id}"), Some(admin.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
