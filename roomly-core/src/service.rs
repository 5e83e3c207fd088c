use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::model::{BookingWithRoom, CreatedBooking, RoomState, TicketStatus};
use crate::repository::{BookingRepository, RoomRepository, TicketRepository};

/// Booking business-rule engine. Checks room capacity and ticket
/// eligibility, then drives the create/read/swap mutations through the
/// injected stores.
pub struct BookingService {
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl BookingService {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        bookings: Arc<dyn BookingRepository>,
        tickets: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            rooms,
            bookings,
            tickets,
        }
    }

    /// Classify a room as Full or Incomplete. Read-only, no side effects.
    pub async fn check_room_state(&self, room_id: Uuid) -> BookingResult<RoomState> {
        let room = self
            .rooms
            .find_room(room_id)
            .await
            .map_err(BookingError::Store)?
            .ok_or(BookingError::NotFound)?;

        let count = self
            .bookings
            .count_bookings_on_room(room_id)
            .await
            .map_err(BookingError::Store)?;

        // count > capacity should be impossible; treat it as full anyway.
        if count >= room.capacity as i64 {
            Ok(RoomState::Full)
        } else {
            Ok(RoomState::Incomplete)
        }
    }

    /// Validate that the user's ticket permits booking a room. The four
    /// checks run in a fixed order and each failure carries its own reason.
    pub async fn check_ticket_compatibility(&self, user_id: Uuid) -> BookingResult<()> {
        let ticket = self
            .tickets
            .find_ticket_by_user(user_id)
            .await
            .map_err(BookingError::Store)?;

        let Some(ticket) = ticket else {
            return Err(BookingError::forbidden("Non-existing ticket", "book a room"));
        };
        if ticket.status == TicketStatus::RESERVED {
            return Err(BookingError::forbidden("Non-paid ticket", "book a room"));
        }
        if ticket.ticket_type.is_remote {
            return Err(BookingError::forbidden("Remote ticket", "book a room"));
        }
        if !ticket.ticket_type.includes_hotel {
            return Err(BookingError::forbidden("Ticket without hotel", "book a room"));
        }

        Ok(())
    }

    pub async fn create_booking(
        &self,
        user_id: Uuid,
        room_id: Uuid,
    ) -> BookingResult<CreatedBooking> {
        if self.check_room_state(room_id).await? == RoomState::Full {
            return Err(BookingError::CannotJoinFullRoom);
        }
        self.check_ticket_compatibility(user_id).await?;

        let booking_id = self
            .bookings
            .create_booking(user_id, room_id)
            .await
            .map_err(BookingError::Store)?
            // The store refuses the insert when the room filled up
            // between the check and the write.
            .ok_or(BookingError::CannotJoinFullRoom)?;

        debug!(%user_id, %room_id, %booking_id, "booking created");
        Ok(CreatedBooking { booking_id })
    }

    pub async fn read_booking(&self, user_id: Uuid) -> BookingResult<BookingWithRoom> {
        self.bookings
            .find_booking_by_user(user_id)
            .await
            .map_err(BookingError::Store)?
            .ok_or(BookingError::NotFound)
    }

    /// Replace the user's booking with one for `new_room_id`. The ticket
    /// is intentionally not re-validated here; eligibility was already
    /// proven when the original booking was created.
    pub async fn swap_booking(
        &self,
        user_id: Uuid,
        new_room_id: Uuid,
        original_booking_id: Uuid,
    ) -> BookingResult<CreatedBooking> {
        let original = self
            .bookings
            .find_booking_by_id(original_booking_id)
            .await
            .map_err(BookingError::Store)?;
        if original.is_none() {
            return Err(BookingError::forbidden("No Booking", "Swap bookings"));
        }

        if self.check_room_state(new_room_id).await? == RoomState::Full {
            return Err(BookingError::CannotJoinFullRoom);
        }

        let booking_id = self
            .bookings
            .swap_booking(original_booking_id, user_id, new_room_id)
            .await
            .map_err(BookingError::Store)?
            .ok_or(BookingError::CannotJoinFullRoom)?;

        debug!(%user_id, %new_room_id, %original_booking_id, %booking_id, "booking swapped");
        Ok(CreatedBooking { booking_id })
    }
}
