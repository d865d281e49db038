pub mod error;
pub mod types;

pub use error::{GatewayError, ParseKindError, SessionError, StudyError};
pub use types::*;
