pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod room_repo;
pub mod ticket_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use room_repo::PgRoomRepository;
pub use ticket_repo::PgTicketRepository;
