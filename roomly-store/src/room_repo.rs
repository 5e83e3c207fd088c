use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use roomly_core::model::Room;
use roomly_core::repository::RoomRepository;

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RoomRow {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub hotel_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            capacity: row.capacity,
            hotel_id: row.hotel_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_room(
        &self,
        room_id: Uuid,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT id, name, capacity, hotel_id, created_at, updated_at FROM rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Room::from))
    }
}
