//! 学习助手客户端核心：请求生命周期状态机、AI 结果解析与视图映射

pub mod app;
pub mod core;
pub mod logger;
pub mod services;
pub mod utils;

pub use crate::app::AppConfig;
pub use crate::core::{ArtifactKind, GatewayError, ProcessingRequest, RawResult, SessionPhase, StudyError};
pub use crate::services::{HttpBackend, RequestGateway, StudySession, ViewModel};
