use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use roomly_core::model::BookingWithRoom;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingBody {
    room_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBookingResponse {
    booking_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/booking", get(get_booking).post(post_booking))
        .route("/booking/{booking_id}", put(put_booking))
}

fn decode_claims(
    state: &AppState,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Claims, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::AuthenticationError("Missing bearer token".to_string()))?;

    decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::AuthenticationError(e.to_string()))
}

async fn get_booking(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<BookingWithRoom>, AppError> {
    let claims = decode_claims(&state, bearer)?;

    let booking = state
        .bookings
        .read_booking(claims.sub)
        .await
        .map_err(AppError::from_booking)?;

    Ok(Json(booking))
}

async fn post_booking(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(body): Json<BookingBody>,
) -> Result<Json<CreatedBookingResponse>, AppError> {
    let claims = decode_claims(&state, bearer)?;

    let created = state
        .bookings
        .create_booking(claims.sub, body.room_id)
        .await
        .map_err(AppError::from_booking)?;

    info!(user_id = %claims.sub, room_id = %body.room_id, "booking created");

    Ok(Json(CreatedBookingResponse {
        booking_id: created.booking_id,
    }))
}

async fn put_booking(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<BookingBody>,
) -> Result<Json<CreatedBookingResponse>, AppError> {
    let claims = decode_claims(&state, bearer)?;

    let created = state
        .bookings
        .swap_booking(claims.sub, body.room_id, booking_id)
        .await
        .map_err(AppError::from_booking)?;

    info!(user_id = %claims.sub, room_id = %body.room_id, original = %booking_id, "booking swapped");

    Ok(Json(CreatedBookingResponse {
        booking_id: created.booking_id,
    }))
}
