//! 会话状态机：Idle → Submitting → Success | Failure → Idle/Submitting
//!
//! 结果与错误信息存放在阶段内部，二者在结构上就不可能同时存在。

use tracing::{debug, error, info};

use crate::core::error::SessionError;
use crate::core::types::{ArtifactKind, InFlight, RawResult, RequestId, RequestSource, SessionPhase};

#[derive(Debug, Clone, Default)]
enum Stage {
    #[default]
    Idle,
    Submitting {
        request_id: RequestId,
        source: RequestSource,
    },
    Success {
        result: RawResult,
    },
    Failure {
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    stage: Stage,
    extracted_text: Option<String>,
    active_kind: Option<ArtifactKind>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.stage {
            Stage::Idle => SessionPhase::Idle,
            Stage::Submitting { .. } => SessionPhase::Submitting,
            Stage::Success { .. } => SessionPhase::Success,
            Stage::Failure { .. } => SessionPhase::Failure,
        }
    }

    pub fn last_result(&self) -> Option<&RawResult> {
        match &self.stage {
            Stage::Success { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.stage {
            Stage::Failure { message } => Some(message),
            _ => None,
        }
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    /// 最近一次请求的分析类型
    pub fn active_kind(&self) -> Option<ArtifactKind> {
        self.active_kind
    }

    pub fn in_flight_id(&self) -> Option<RequestId> {
        match self.stage {
            Stage::Submitting { request_id, .. } => Some(request_id),
            _ => None,
        }
    }

    pub fn in_flight_source(&self) -> Option<RequestSource> {
        match self.stage {
            Stage::Submitting { source, .. } => Some(source),
            _ => None,
        }
    }

    fn reject(&self, action: &'static str) -> SessionError {
        let err = SessionError::InvalidTransition {
            from: self.phase(),
            action,
        };
        error!("状态机调用非法: {}", err);
        err
    }

    /// 开始一次提交；Submitting 状态下拒绝，且不修改任何状态
    pub fn submit(&mut self, ticket: &InFlight) -> Result<(), SessionError> {
        if matches!(self.stage, Stage::Submitting { .. }) {
            return Err(self.reject("submit"));
        }

        let kind = ticket.request.kind();
        self.stage = Stage::Submitting {
            request_id: ticket.id,
            source: ticket.request.source(),
        };
        self.active_kind = Some(kind);
        info!("⏳ 开始处理请求 {} (类型: {})", ticket.id, kind);
        Ok(())
    }

    pub fn complete_success(&mut self, result: RawResult) -> Result<(), SessionError> {
        if !matches!(self.stage, Stage::Submitting { .. }) {
            return Err(self.reject("complete with a result"));
        }

        if let Some(text) = result.extracted_text() {
            debug!("记录识别文本: {} 字符", text.chars().count());
            self.extracted_text = Some(text.to_string());
        }
        info!("✅ 处理完成 (类型: {})", result.request_type());
        self.stage = Stage::Success { result };
        Ok(())
    }

    pub fn complete_failure(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if !matches!(self.stage, Stage::Submitting { .. }) {
            return Err(self.reject("complete with an error"));
        }

        let message = message.into();
        info!("❌ 处理失败: {}", message);
        self.stage = Stage::Failure { message };
        Ok(())
    }

    pub fn reset(&mut self) {
        debug!("重置会话 (当前阶段: {})", self.phase());
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ProcessingRequest;
    use chrono::Utc;

    fn image_ticket(kind: ArtifactKind) -> InFlight {
        InFlight::new(ProcessingRequest::image(vec![1], "page.png", "image/png", kind))
    }

    fn text_ticket(kind: ArtifactKind) -> InFlight {
        InFlight::new(ProcessingRequest::text("cached", kind))
    }

    fn image_result(text: &str, kind: ArtifactKind) -> RawResult {
        RawResult::new(Some(text.to_string()), "response".to_string(), kind, Utc::now())
    }

    fn text_result(kind: ArtifactKind) -> RawResult {
        RawResult::new(None, "response".to_string(), kind, Utc::now())
    }

    fn assert_exclusive(state: &SessionState) {
        match state.phase() {
            SessionPhase::Success => {
                assert!(state.last_result().is_some() && state.error_message().is_none())
            }
            SessionPhase::Failure => {
                assert!(state.last_result().is_none() && state.error_message().is_some())
            }
            SessionPhase::Idle | SessionPhase::Submitting => {
                assert!(state.last_result().is_none() && state.error_message().is_none())
            }
        }
    }

    #[test]
    fn test_initial_state_is_idle() {
        let state = SessionState::new();
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert_eq!(state.extracted_text(), None);
        assert_eq!(state.active_kind(), None);
        assert_exclusive(&state);
    }

    #[test]
    fn test_second_submit_is_rejected() {
        let mut state = SessionState::new();
        let first = image_ticket(ArtifactKind::Summarize);
        state.submit(&first).unwrap();

        let err = state.submit(&text_ticket(ArtifactKind::Quiz)).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                from: SessionPhase::Submitting,
                action: "submit"
            }
        );
        assert_eq!(state.in_flight_id(), Some(first.id), "被拒绝的提交不应该替换进行中的请求");
        assert_eq!(state.active_kind(), Some(ArtifactKind::Summarize));
        assert_exclusive(&state);
    }

    #[test]
    fn test_extracted_text_written_by_image_only() {
        let mut state = SessionState::new();
        state.submit(&image_ticket(ArtifactKind::Summarize)).unwrap();
        state
            .complete_success(image_result("Newton's laws", ArtifactKind::Summarize))
            .unwrap();
        assert_eq!(state.extracted_text(), Some("Newton's laws"));

        state.submit(&text_ticket(ArtifactKind::Quiz)).unwrap();
        assert!(state.last_result().is_none(), "提交时应该清空上一次结果");
        state.complete_success(text_result(ArtifactKind::Quiz)).unwrap();
        assert_eq!(state.extracted_text(), Some("Newton's laws"));
        assert_eq!(state.active_kind(), Some(ArtifactKind::Quiz));

        state.submit(&image_ticket(ArtifactKind::Notes)).unwrap();
        state
            .complete_success(image_result("Ohm's law", ArtifactKind::Notes))
            .unwrap();
        assert_eq!(state.extracted_text(), Some("Ohm's law"));
        assert_exclusive(&state);
    }

    #[test]
    fn test_failure_keeps_extracted_text() {
        let mut state = SessionState::new();
        state.submit(&image_ticket(ArtifactKind::Explain)).unwrap();
        state
            .complete_success(image_result("Cell division", ArtifactKind::Explain))
            .unwrap();

        state.submit(&text_ticket(ArtifactKind::Quiz)).unwrap();
        state.complete_failure("AI service unavailable").unwrap();

        assert_eq!(state.phase(), SessionPhase::Failure);
        assert_eq!(state.error_message(), Some("AI service unavailable"));
        assert_eq!(state.extracted_text(), Some("Cell division"));
        assert_exclusive(&state);

        // 失败后可以直接重新提交
        state.submit(&text_ticket(ArtifactKind::Quiz)).unwrap();
        assert_eq!(state.error_message(), None);
        assert_exclusive(&state);
    }

    #[test]
    fn test_completion_outside_submitting_is_rejected() {
        let mut state = SessionState::new();
        assert!(state.complete_success(text_result(ArtifactKind::Notes)).is_err());
        assert!(state.complete_failure("late").is_err());
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.submit(&image_ticket(ArtifactKind::Notes)).unwrap();
        state.complete_failure("first").unwrap();
        assert!(state.complete_failure("second").is_err());
        assert_eq!(state.error_message(), Some("first"), "非法调用不应该修改状态");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = SessionState::new();
        state.submit(&image_ticket(ArtifactKind::Summarize)).unwrap();
        state
            .complete_success(image_result("Photosynthesis", ArtifactKind::Summarize))
            .unwrap();

        state.reset();
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert_eq!(state.extracted_text(), None);
        assert_eq!(state.active_kind(), None);
        assert_exclusive(&state);

        // reset 在任意阶段都可以调用
        state.submit(&image_ticket(ArtifactKind::Summarize)).unwrap();
        state.reset();
        assert_eq!(state.in_flight_id(), None);
    }
}
