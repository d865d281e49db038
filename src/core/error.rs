use thiserror::Error;

use crate::core::types::SessionPhase;

const TRANSPORT_MESSAGE: &str = "Could not reach the study service. Please try again.";
const MALFORMED_MESSAGE: &str = "The study service returned an unexpected response.";

/// RequestGateway 的失败类型
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("transport failure: {source}")]
    TransportFailure {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("server rejected the request: {message}")]
    ServerRejected { message: String },

    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String },
}

impl GatewayError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn transport(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::TransportFailure {
            source: source.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    /// 展示给用户的文本：服务端拒绝原样透出，其余使用通用提示
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::InvalidRequest { reason } => reason.clone(),
            GatewayError::TransportFailure { .. } => TRANSPORT_MESSAGE.to_string(),
            GatewayError::ServerRejected { message } => message.clone(),
            GatewayError::MalformedResponse { .. } => MALFORMED_MESSAGE.to_string(),
        }
    }
}

/// 状态机被非法调用，属于集成方的编程错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the session is {from}")]
    InvalidTransition {
        from: SessionPhase,
        action: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("No extracted text is available yet. Upload an image first.")]
    NoExtractedText,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKindError {
    #[error("unknown artifact kind '{0}' (expected summarize, explain, quiz or notes)")]
    UnknownKind(String),
}
