use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use roomly_api::bookings::Claims;
use roomly_api::state::{AppState, AuthConfig};
use roomly_api::app;
use roomly_core::model::{Booking, BookingWithRoom, Room, Ticket, TicketStatus, TicketType};
use roomly_core::repository::{BookingRepository, RoomRepository, TicketRepository};
use roomly_core::BookingService;

const SECRET: &str = "test-secret";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Default)]
struct FakeStore {
    rooms: Mutex<HashMap<Uuid, Room>>,
    bookings: Mutex<Vec<Booking>>,
    tickets: Mutex<HashMap<Uuid, Ticket>>,
}

impl FakeStore {
    fn add_room(&self, capacity: i32) -> Uuid {
        let room = Room {
            id: Uuid::new_v4(),
            name: "double".to_string(),
            capacity,
            hotel_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = room.id;
        self.rooms.lock().unwrap().insert(id, room);
        id
    }

    fn add_booking(&self, user_id: Uuid, room_id: Uuid) -> Uuid {
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            room_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = booking.id;
        self.bookings.lock().unwrap().push(booking);
        id
    }

    fn add_paid_ticket(&self, user_id: Uuid) {
        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id,
            status: TicketStatus::PAID,
            ticket_type: TicketType {
                id: Uuid::new_v4(),
                name: "presential + hotel".to_string(),
                is_remote: false,
                includes_hotel: true,
            },
        };
        self.tickets.lock().unwrap().insert(user_id, ticket);
    }

    fn has_capacity(&self, room_id: Uuid) -> bool {
        let rooms = self.rooms.lock().unwrap();
        let Some(room) = rooms.get(&room_id) else {
            return false;
        };
        let count = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.room_id == room_id)
            .count();
        (count as i64) < room.capacity as i64
    }
}

#[async_trait]
impl RoomRepository for FakeStore {
    async fn find_room(&self, room_id: Uuid) -> Result<Option<Room>, BoxError> {
        Ok(self.rooms.lock().unwrap().get(&room_id).cloned())
    }
}

#[async_trait]
impl TicketRepository for FakeStore {
    async fn find_ticket_by_user(&self, user_id: Uuid) -> Result<Option<Ticket>, BoxError> {
        Ok(self.tickets.lock().unwrap().get(&user_id).cloned())
    }
}

#[async_trait]
impl BookingRepository for FakeStore {
    async fn find_booking_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<BookingWithRoom>, BoxError> {
        let bookings = self.bookings.lock().unwrap();
        let rooms = self.rooms.lock().unwrap();
        Ok(bookings.iter().find(|b| b.user_id == user_id).map(|b| {
            BookingWithRoom {
                id: b.id,
                room: rooms.get(&b.room_id).cloned().unwrap(),
            }
        }))
    }

    async fn find_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, BoxError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == booking_id)
            .cloned())
    }

    async fn count_bookings_on_room(&self, room_id: Uuid) -> Result<i64, BoxError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.room_id == room_id)
            .count() as i64)
    }

    async fn create_booking(
        &self,
        user_id: Uuid,
        room_id: Uuid,
    ) -> Result<Option<Uuid>, BoxError> {
        if !self.has_capacity(room_id) {
            return Ok(None);
        }
        Ok(Some(self.add_booking(user_id, room_id)))
    }

    async fn swap_booking(
        &self,
        original_booking_id: Uuid,
        user_id: Uuid,
        new_room_id: Uuid,
    ) -> Result<Option<Uuid>, BoxError> {
        let removed = {
            let mut bookings = self.bookings.lock().unwrap();
            let pos = bookings.iter().position(|b| b.id == original_booking_id);
            pos.map(|p| bookings.remove(p))
        };
        if !self.has_capacity(new_room_id) {
            if let Some(b) = removed {
                self.bookings.lock().unwrap().push(b);
            }
            return Ok(None);
        }
        Ok(Some(self.add_booking(user_id, new_room_id)))
    }
}

fn test_app(store: Arc<FakeStore>) -> axum::Router {
    let service = BookingService::new(store.clone(), store.clone(), store);
    app(AppState {
        bookings: Arc::new(service),
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 86400,
        },
    })
}

fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn get_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/booking")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_request(token: &str, room_id: Uuid) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/booking")
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "roomId": room_id }).to_string()))
        .unwrap()
}

fn put_request(token: &str, booking_id: Uuid, room_id: Uuid) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/booking/{booking_id}"))
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "roomId": room_id }).to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rejects_missing_auth_header() {
    let store = Arc::new(FakeStore::default());
    let app = test_app(store);

    let request = Request::builder()
        .method("GET")
        .uri("/booking")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing bearer token");
}

#[tokio::test]
async fn rejects_invalid_token() {
    let store = Arc::new(FakeStore::default());
    let app = test_app(store);

    let response = app.oneshot(get_request("not-a-jwt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_booking_returns_404_when_user_has_none() {
    let store = Arc::new(FakeStore::default());
    let app = test_app(store);

    let response = app
        .oneshot(get_request(&token_for(Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "No result for this search!");
}

#[tokio::test]
async fn get_booking_returns_booking_with_room() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    let room_id = store.add_room(3);
    let booking_id = store.add_booking(user_id, room_id);
    let app = test_app(store);

    let response = app.oneshot(get_request(&token_for(user_id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], booking_id.to_string());
    assert_eq!(body["room"]["id"], room_id.to_string());
    assert_eq!(body["room"]["capacity"], 3);
}

#[tokio::test]
async fn post_booking_creates_and_returns_id() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    let room_id = store.add_room(3);
    store.add_paid_ticket(user_id);
    let app = test_app(store.clone());

    let response = app
        .oneshot(post_request(&token_for(user_id), room_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let returned: Uuid = body["bookingId"].as_str().unwrap().parse().unwrap();
    let stored = store.find_booking_by_user(user_id).await.unwrap().unwrap();
    assert_eq!(stored.id, returned);
}

#[tokio::test]
async fn post_booking_full_room_maps_to_403() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    let room_id = store.add_room(1);
    store.add_booking(Uuid::new_v4(), room_id);
    store.add_paid_ticket(user_id);
    let app = test_app(store);

    let response = app
        .oneshot(post_request(&token_for(user_id), room_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Cannot join a room that is at his full capacity!");
}

#[tokio::test]
async fn post_booking_unknown_room_maps_to_404() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    store.add_paid_ticket(user_id);
    let app = test_app(store);

    let response = app
        .oneshot(post_request(&token_for(user_id), Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_booking_without_ticket_maps_to_403() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    let room_id = store.add_room(3);
    let app = test_app(store);

    let response = app
        .oneshot(post_request(&token_for(user_id), room_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Non-existing ticket does not allow you action: book a room!"
    );
}

#[tokio::test]
async fn put_booking_swaps_rooms() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    let old_room = store.add_room(3);
    let new_room = store.add_room(3);
    let original = store.add_booking(user_id, old_room);
    let app = test_app(store.clone());

    let response = app
        .oneshot(put_request(&token_for(user_id), original, new_room))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let current = store.find_booking_by_user(user_id).await.unwrap().unwrap();
    assert_eq!(current.room.id, new_room);
    assert!(store.find_booking_by_id(original).await.unwrap().is_none());
}

#[tokio::test]
async fn put_booking_without_original_maps_to_403() {
    let store = Arc::new(FakeStore::default());
    let user_id = Uuid::new_v4();
    let new_room = store.add_room(3);
    let app = test_app(store);

    let response = app
        .oneshot(put_request(&token_for(user_id), Uuid::new_v4(), new_room))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "No Booking does not allow you action: Swap bookings!"
    );
}
