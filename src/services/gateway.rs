use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::error::GatewayError;
use crate::core::types::{ArtifactKind, ImageUpload, ProcessingRequest, RawResult, RequestSource};

/// 后端成功响应的线上格式
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendReply {
    #[serde(default)]
    pub extracted_text: Option<String>,
    pub ai_response: String,
    pub request_type: String,
    pub timestamp: DateTime<Utc>,
}

/// 远端 OCR/AI 服务，作为黑盒使用
#[async_trait]
pub trait StudyBackend: Send + Sync {
    async fn process_image(
        &self,
        upload: &ImageUpload,
        kind: ArtifactKind,
    ) -> Result<BackendReply, GatewayError>;

    async fn process_text(&self, text: &str, kind: ArtifactKind)
        -> Result<BackendReply, GatewayError>;
}

/// 两种请求的统一入口：本地校验、单次发送、响应契约检查
///
/// 不做任何重试，重试只能由用户显式重新提交触发。
#[derive(Clone)]
pub struct RequestGateway {
    backend: Arc<dyn StudyBackend>,
    max_image_bytes: usize,
}

impl RequestGateway {
    pub fn new(backend: Arc<dyn StudyBackend>, max_image_bytes: usize) -> Self {
        Self {
            backend,
            max_image_bytes,
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub async fn submit_image(
        &self,
        file_bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
        kind: ArtifactKind,
    ) -> Result<RawResult, GatewayError> {
        self.execute(&ProcessingRequest::image(file_bytes, file_name, mime_type, kind))
            .await
    }

    pub async fn submit_text(&self, text: &str, kind: ArtifactKind) -> Result<RawResult, GatewayError> {
        self.execute(&ProcessingRequest::text(text, kind)).await
    }

    pub async fn execute(&self, request: &ProcessingRequest) -> Result<RawResult, GatewayError> {
        request.validate(self.max_image_bytes)?;

        let kind = request.kind();
        let reply = match request {
            ProcessingRequest::Image { upload, .. } => {
                info!(
                    "📤 上传图片: {} ({} 字节, {}), 类型: {}",
                    upload.file_name,
                    upload.file_bytes.len(),
                    upload.mime_type,
                    kind
                );
                self.backend.process_image(upload, kind).await?
            }
            ProcessingRequest::Text { text, .. } => {
                info!("📝 重新处理文本 ({} 字符), 类型: {}", text.chars().count(), kind);
                self.backend.process_text(text, kind).await?
            }
        };

        accept_reply(reply, kind, request.source())
    }
}

/// 检查后端响应是否符合契约并转换为 RawResult
pub fn accept_reply(
    reply: BackendReply,
    requested: ArtifactKind,
    source: RequestSource,
) -> Result<RawResult, GatewayError> {
    let returned: ArtifactKind = reply.request_type.parse().map_err(|_| {
        warn!("后端返回了未知的 requestType: {}", reply.request_type);
        GatewayError::malformed(format!("unknown requestType '{}'", reply.request_type))
    })?;

    if returned != requested {
        warn!("后端返回的类型 {} 与请求的类型 {} 不一致", returned, requested);
        return Err(GatewayError::malformed(format!(
            "requested '{}' but the service answered '{}'",
            requested, returned
        )));
    }

    let extracted_text = match source {
        RequestSource::Image => match reply.extracted_text {
            Some(text) => Some(text),
            None => {
                warn!("图片请求的响应缺少 extractedText");
                return Err(GatewayError::malformed("image reply has no extractedText"));
            }
        },
        RequestSource::Text => {
            if reply.extracted_text.is_some() {
                debug!("文本请求的响应带有 extractedText，已忽略");
            }
            None
        }
    };

    debug!("AI 响应长度: {} 字符", reply.ai_response.chars().count());
    Ok(RawResult::new(
        extracted_text,
        reply.ai_response,
        returned,
        reply.timestamp,
    ))
}
