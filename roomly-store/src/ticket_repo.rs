use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use roomly_core::model::{Ticket, TicketStatus, TicketType};
use roomly_core::repository::TicketRepository;

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    type_id: Uuid,
    type_name: String,
    is_remote: bool,
    includes_hotel: bool,
}

impl TicketRow {
    fn into_ticket(self) -> Ticket {
        // The ticket subsystem only persists these two states.
        let status = match self.status.as_str() {
            "PAID" => TicketStatus::PAID,
            _ => TicketStatus::RESERVED,
        };

        Ticket {
            id: self.id,
            user_id: self.user_id,
            status,
            ticket_type: TicketType {
                id: self.type_id,
                name: self.type_name,
                is_remote: self.is_remote,
                includes_hotel: self.includes_hotel,
            },
        }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn find_ticket_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Ticket>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT t.id, t.user_id, t.status,
                   tt.id AS type_id, tt.name AS type_name, tt.is_remote, tt.includes_hotel
            FROM tickets t
            JOIN ticket_types tt ON tt.id = t.ticket_type_id
            WHERE t.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TicketRow::into_ticket))
    }
}
