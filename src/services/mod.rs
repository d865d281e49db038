pub mod api_client;
pub mod controller;
pub mod gateway;
pub mod parser;
pub mod presenter;
pub mod session;

pub use api_client::HttpBackend;
pub use controller::{Completion, StudySession};
pub use gateway::{BackendReply, RequestGateway, StudyBackend};
pub use parser::{ParsedQuiz, QuizQuestion, RenderableResult};
pub use presenter::ViewModel;
pub use session::SessionState;
