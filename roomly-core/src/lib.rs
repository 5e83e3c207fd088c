pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::BookingError;
pub use service::BookingService;
