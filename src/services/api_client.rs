use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::app::config::AppConfig;
use crate::core::error::GatewayError;
use crate::core::types::{ArtifactKind, ImageUpload};
use crate::services::gateway::{BackendReply, StudyBackend};

const PROCESS_IMAGE_PATH: &str = "process-image";
const PROCESS_TEXT_PATH: &str = "process-text";
const IMAGE_FALLBACK_MESSAGE: &str = "Failed to process image";
const TEXT_FALLBACK_MESSAGE: &str = "Failed to process text";

/// 失败响应的格式：{ "error": "..." }
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// 基于 reqwest 的后端客户端
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        fallback_message: &str,
    ) -> Result<BackendReply, GatewayError> {
        let response = request.send().await.map_err(|e| {
            error!("请求后端失败: {}", e);
            GatewayError::transport(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("读取响应内容失败: {}", e);
            GatewayError::transport(e)
        })?;
        debug!("后端响应状态: {}, 内容长度: {}", status, body.len());

        decode_reply(status, &body, fallback_message)
    }
}

/// 按状态码解析响应内容
pub fn decode_reply(
    status: StatusCode,
    body: &str,
    fallback_message: &str,
) -> Result<BackendReply, GatewayError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_message.to_string());
        warn!("❌ 后端拒绝请求 ({}): {}", status, message);
        return Err(GatewayError::ServerRejected { message });
    }

    serde_json::from_str::<BackendReply>(body).map_err(|e| {
        warn!("解析后端响应失败: {}", e);
        GatewayError::malformed(format!("undecodable success body: {}", e))
    })
}

#[async_trait]
impl StudyBackend for HttpBackend {
    async fn process_image(
        &self,
        upload: &ImageUpload,
        kind: ArtifactKind,
    ) -> Result<BackendReply, GatewayError> {
        let part = Part::bytes(upload.file_bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| GatewayError::invalid_request(format!("invalid MIME type: {}", e)))?;
        let form = Form::new()
            .part("image", part)
            .text("requestType", kind.as_str());

        let request = self
            .client
            .post(self.endpoint(PROCESS_IMAGE_PATH))
            .multipart(form);
        self.send(request, IMAGE_FALLBACK_MESSAGE).await
    }

    async fn process_text(
        &self,
        text: &str,
        kind: ArtifactKind,
    ) -> Result<BackendReply, GatewayError> {
        let payload = json!({
            "text": text,
            "requestType": kind.as_str(),
        });

        let request = self
            .client
            .post(self.endpoint(PROCESS_TEXT_PATH))
            .json(&payload);
        self.send(request, TEXT_FALLBACK_MESSAGE).await
    }
}
