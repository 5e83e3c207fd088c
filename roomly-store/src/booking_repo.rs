use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use roomly_core::model::{Booking, BookingWithRoom, Room};
use roomly_core::repository::BookingRepository;

use crate::room_repo::RoomRow;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    room_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            room_id: row.room_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingWithRoomRow {
    booking_id: Uuid,
    id: Uuid,
    name: String,
    capacity: i32,
    hotel_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

// Inserts only while the occupant count is below capacity. The count and
// the insert run in one statement, so two racing requests cannot both
// take the last slot.
const CONDITIONAL_INSERT: &str = r#"
INSERT INTO bookings (id, user_id, room_id)
SELECT $1, $2, $3
WHERE (SELECT count(*) FROM bookings WHERE room_id = $3)
    < (SELECT capacity FROM rooms WHERE id = $3)
RETURNING id
"#;

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_booking_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<BookingWithRoom>, BoxError> {
        let row = sqlx::query_as::<_, BookingWithRoomRow>(
            r#"
            SELECT b.id AS booking_id,
                   r.id, r.name, r.capacity, r.hotel_id, r.created_at, r.updated_at
            FROM bookings b
            JOIN rooms r ON r.id = b.room_id
            WHERE b.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| BookingWithRoom {
            id: r.booking_id,
            room: Room::from(RoomRow {
                id: r.id,
                name: r.name,
                capacity: r.capacity,
                hotel_id: r.hotel_id,
                created_at: r.created_at,
                updated_at: r.updated_at,
            }),
        }))
    }

    async fn find_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, BoxError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, room_id, created_at, updated_at FROM bookings WHERE id = $1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn count_bookings_on_room(&self, room_id: Uuid) -> Result<i64, BoxError> {
        let count: i64 =
            sqlx::query_scalar("SELECT count(*) FROM bookings WHERE room_id = $1")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn create_booking(
        &self,
        user_id: Uuid,
        room_id: Uuid,
    ) -> Result<Option<Uuid>, BoxError> {
        let id: Option<Uuid> = sqlx::query_scalar(CONDITIONAL_INSERT)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn swap_booking(
        &self,
        original_booking_id: Uuid,
        user_id: Uuid,
        new_room_id: Uuid,
    ) -> Result<Option<Uuid>, BoxError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(original_booking_id)
            .execute(&mut *tx)
            .await?;

        let id: Option<Uuid> = sqlx::query_scalar(CONDITIONAL_INSERT)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(new_room_id)
            .fetch_optional(&mut *tx)
            .await?;

        match id {
            Some(id) => {
                tx.commit().await?;
                Ok(Some(id))
            }
            None => {
                // New room has no space; undo the delete as well.
                tx.rollback().await?;
                Ok(None)
            }
        }
    }
}
