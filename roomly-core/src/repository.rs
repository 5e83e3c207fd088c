use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Booking, BookingWithRoom, Room, Ticket};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for room data access
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_room(&self, room_id: Uuid) -> Result<Option<Room>, BoxError>;
}

/// Repository trait for ticket data access (tickets are owned by the
/// enrollment subsystem; the booking core only reads them)
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_ticket_by_user(&self, user_id: Uuid) -> Result<Option<Ticket>, BoxError>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_booking_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<BookingWithRoom>, BoxError>;

    async fn find_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, BoxError>;

    async fn count_bookings_on_room(&self, room_id: Uuid) -> Result<i64, BoxError>;

    /// Conditional write: inserts iff the room's occupant count is still
    /// below its capacity at commit time. `None` means the room filled up
    /// between check and write.
    async fn create_booking(&self, user_id: Uuid, room_id: Uuid)
        -> Result<Option<Uuid>, BoxError>;

    /// Atomic swap: deletes the original booking and inserts the new one
    /// as a single unit. Either both happen or neither does. `None` means
    /// the new room had no space left and everything was rolled back.
    async fn swap_booking(
        &self,
        original_booking_id: Uuid,
        user_id: Uuid,
        new_room_id: Uuid,
    ) -> Result<Option<Uuid>, BoxError>;
}
