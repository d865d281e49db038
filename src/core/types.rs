use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{GatewayError, ParseKindError};

static IMAGE_MIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^image/[A-Za-z0-9][A-Za-z0-9.+-]*$").expect("IMAGE_MIME pattern is valid")
});

/// 分析类型：摘要、讲解、测验、笔记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Summarize,
    Explain,
    Quiz,
    Notes,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Summarize,
        ArtifactKind::Explain,
        ArtifactKind::Quiz,
        ArtifactKind::Notes,
    ];

    /// 与后端约定的线上名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Summarize => "summarize",
            ArtifactKind::Explain => "explain",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::Notes => "notes",
        }
    }

    /// 除自身以外的其它类型，按固定顺序
    pub fn follow_ups(self) -> impl Iterator<Item = ArtifactKind> {
        Self::ALL.into_iter().filter(move |k| *k != self)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseKindError::UnknownKind(s.to_string()))
    }
}

/// 会话所处阶段（不带数据的判别值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Submitting,
    Success,
    Failure,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Submitting => "Submitting",
            SessionPhase::Success => "Success",
            SessionPhase::Failure => "Failure",
        };
        f.write_str(name)
    }
}

/// 单次提交的身份标识，用于丢弃过期的响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 待上传的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    Image,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingRequest {
    Image { upload: ImageUpload, kind: ArtifactKind },
    Text { text: String, kind: ArtifactKind },
}

impl ProcessingRequest {
    pub fn image(
        file_bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        kind: ArtifactKind,
    ) -> Self {
        ProcessingRequest::Image {
            upload: ImageUpload {
                file_bytes,
                file_name: file_name.into(),
                mime_type: mime_type.into(),
            },
            kind,
        }
    }

    pub fn text(text: impl Into<String>, kind: ArtifactKind) -> Self {
        ProcessingRequest::Text {
            text: text.into(),
            kind,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            ProcessingRequest::Image { kind, .. } | ProcessingRequest::Text { kind, .. } => *kind,
        }
    }

    pub fn source(&self) -> RequestSource {
        match self {
            ProcessingRequest::Image { .. } => RequestSource::Image,
            ProcessingRequest::Text { .. } => RequestSource::Text,
        }
    }

    /// 发送前的本地校验，失败时不会产生任何网络请求
    pub fn validate(&self, max_image_bytes: usize) -> Result<(), GatewayError> {
        match self {
            ProcessingRequest::Image { upload, .. } => {
                if upload.file_bytes.is_empty() {
                    return Err(GatewayError::invalid_request("The selected image is empty"));
                }
                if upload.file_bytes.len() > max_image_bytes {
                    return Err(GatewayError::invalid_request(format!(
                        "The selected image is {} bytes; the limit is {} bytes",
                        upload.file_bytes.len(),
                        max_image_bytes
                    )));
                }
                if !IMAGE_MIME.is_match(upload.mime_type.trim()) {
                    return Err(GatewayError::invalid_request(format!(
                        "'{}' is not an image type",
                        upload.mime_type
                    )));
                }
                Ok(())
            }
            ProcessingRequest::Text { text, .. } => {
                if text.trim().is_empty() {
                    return Err(GatewayError::invalid_request("There is no text to process"));
                }
                Ok(())
            }
        }
    }
}

/// 已开始的提交：身份标识加原始请求
#[derive(Debug, Clone)]
pub struct InFlight {
    pub id: RequestId,
    pub request: ProcessingRequest,
}

impl InFlight {
    pub fn new(request: ProcessingRequest) -> Self {
        Self {
            id: RequestId::new(),
            request,
        }
    }
}

/// 后端处理结果，只由 RequestGateway 构造，创建后不可修改
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    extracted_text: Option<String>,
    ai_response: String,
    request_type: ArtifactKind,
    timestamp: DateTime<Utc>,
}

impl RawResult {
    pub(crate) fn new(
        extracted_text: Option<String>,
        ai_response: String,
        request_type: ArtifactKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            extracted_text,
            ai_response,
            request_type,
            timestamp,
        }
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn ai_response(&self) -> &str {
        &self.ai_response
    }

    pub fn request_type(&self) -> ArtifactKind {
        self.request_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        for kind in ArtifactKind::ALL {
            let parsed: ArtifactKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!("QUIZ".parse::<ArtifactKind>().unwrap(), ArtifactKind::Quiz);
        assert!("flashcards".parse::<ArtifactKind>().is_err(), "未知类型应该报错");
        assert_eq!(serde_json::to_string(&ArtifactKind::Notes).unwrap(), "\"notes\"");
    }

    #[test]
    fn test_follow_ups_exclude_self() {
        let others: Vec<_> = ArtifactKind::Quiz.follow_ups().collect();
        assert_eq!(
            others,
            vec![ArtifactKind::Summarize, ArtifactKind::Explain, ArtifactKind::Notes]
        );
    }

    #[test]
    fn test_validate_image_request() {
        let ok = ProcessingRequest::image(vec![1, 2, 3], "page.png", "image/png", ArtifactKind::Quiz);
        assert!(ok.validate(1024).is_ok());

        let empty = ProcessingRequest::image(vec![], "page.png", "image/png", ArtifactKind::Quiz);
        assert!(matches!(empty.validate(1024), Err(GatewayError::InvalidRequest { .. })));

        let too_big = ProcessingRequest::image(vec![0; 11], "page.png", "image/png", ArtifactKind::Quiz);
        assert!(too_big.validate(10).is_err(), "超过大小限制应该被拒绝");

        let pdf = ProcessingRequest::image(vec![1], "page.pdf", "application/pdf", ArtifactKind::Quiz);
        assert!(pdf.validate(1024).is_err(), "非图片类型应该被拒绝");
    }

    #[test]
    fn test_validate_text_request() {
        assert!(ProcessingRequest::text("photosynthesis", ArtifactKind::Notes).validate(0).is_ok());
        assert!(ProcessingRequest::text("  \n ", ArtifactKind::Notes).validate(0).is_err());
    }
}
