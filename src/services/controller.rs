use tracing::{debug, info};

use crate::core::error::{GatewayError, StudyError};
use crate::core::types::{ArtifactKind, InFlight, ProcessingRequest, RawResult, RequestId};
use crate::services::gateway::RequestGateway;
use crate::services::presenter::{self, ViewModel};
use crate::services::session::SessionState;

/// 完成事件的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// 请求已不是当前进行中的请求（期间被重置或重新提交），结果被丢弃
    Stale,
}

/// 单个用户会话的控制器，持有唯一的 SessionState
///
/// 两种用法：
/// - `begin_*` 拿到 [`InFlight`]，在别处执行 [`RequestGateway::execute`]，
///   再把结果交给 [`StudySession::complete`]；
/// - `submit_image` / `submit_text` / `reprocess` 顺序执行整个流程。
pub struct StudySession {
    state: SessionState,
    gateway: RequestGateway,
}

impl StudySession {
    pub fn new(gateway: RequestGateway) -> Self {
        Self {
            state: SessionState::new(),
            gateway,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn view(&self) -> ViewModel {
        presenter::present(&self.state, None)
    }

    pub fn reset(&mut self) {
        if let Some(id) = self.state.in_flight_id() {
            info!("重置会话，进行中的请求 {} 的结果将被丢弃", id);
        }
        self.state.reset();
    }

    pub fn begin(&mut self, request: ProcessingRequest) -> Result<InFlight, StudyError> {
        request.validate(self.gateway.max_image_bytes())?;
        let ticket = InFlight::new(request);
        self.state.submit(&ticket)?;
        Ok(ticket)
    }

    pub fn begin_image(
        &mut self,
        file_bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
        kind: ArtifactKind,
    ) -> Result<InFlight, StudyError> {
        self.begin(ProcessingRequest::image(file_bytes, file_name, mime_type, kind))
    }

    pub fn begin_text(&mut self, text: &str, kind: ArtifactKind) -> Result<InFlight, StudyError> {
        self.begin(ProcessingRequest::text(text, kind))
    }

    /// 用已识别的文本换一种分析类型
    pub fn begin_reprocess(&mut self, kind: ArtifactKind) -> Result<InFlight, StudyError> {
        let text = self
            .state
            .extracted_text()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .ok_or(StudyError::NoExtractedText)?;
        self.begin_text(&text, kind)
    }

    /// 处理完成事件；身份不匹配的过期响应直接丢弃
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<RawResult, GatewayError>,
    ) -> Result<Completion, StudyError> {
        if self.state.in_flight_id() != Some(id) {
            debug!("丢弃过期响应: {}", id);
            return Ok(Completion::Stale);
        }

        match outcome {
            Ok(result) => self.state.complete_success(result)?,
            Err(e) => {
                debug!("请求 {} 失败: {}", id, e);
                self.state.complete_failure(e.user_message())?;
            }
        }
        Ok(Completion::Applied)
    }

    pub async fn run(&mut self, request: ProcessingRequest) -> Result<Completion, StudyError> {
        let ticket = self.begin(request)?;
        let outcome = self.gateway.execute(&ticket.request).await;
        self.complete(ticket.id, outcome)
    }

    pub async fn submit_image(
        &mut self,
        file_bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
        kind: ArtifactKind,
    ) -> Result<Completion, StudyError> {
        self.run(ProcessingRequest::image(file_bytes, file_name, mime_type, kind))
            .await
    }

    pub async fn submit_text(&mut self, text: &str, kind: ArtifactKind) -> Result<Completion, StudyError> {
        self.run(ProcessingRequest::text(text, kind)).await
    }

    pub async fn reprocess(&mut self, kind: ArtifactKind) -> Result<Completion, StudyError> {
        let ticket = self.begin_reprocess(kind)?;
        let outcome = self.gateway.execute(&ticket.request).await;
        self.complete(ticket.id, outcome)
    }
}
