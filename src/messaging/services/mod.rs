//! Application services for conversation threading and pagination.

mod error;
mod messaging;

pub use error::{ErrorKind, MessagingError, MessagingResult};
pub use messaging::MessagingService;
