use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub hotel_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model for `GET /booking`: the booking id plus its room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithRoom {
    pub id: Uuid,
    pub room: Room,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    RESERVED,
    PAID,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: Uuid,
    pub name: String,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

/// A user's ticket joined with its type, as the ticket subsystem hands it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: TicketStatus,
    pub ticket_type: TicketType,
}

/// Occupancy classification of a room at check time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Full,
    Incomplete,
}

/// Success payload of create/swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBooking {
    pub booking_id: Uuid,
}
