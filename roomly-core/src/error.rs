#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("No result for this search!")]
    NotFound,

    #[error("{resource} does not allow you action: {action}!")]
    ForbiddenAction { resource: String, action: String },

    #[error("Cannot join a room that is at his full capacity!")]
    CannotJoinFullRoom,

    #[error("Store failure: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    pub fn forbidden(resource: &str, action: &str) -> Self {
        BookingError::ForbiddenAction {
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
