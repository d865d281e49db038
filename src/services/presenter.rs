use serde::Serialize;

use crate::core::types::{ArtifactKind, RawResult, RequestSource, SessionPhase};
use crate::services::parser::{self, ParsedQuiz, RenderableResult};
use crate::services::session::SessionState;
use crate::utils::text::option_letter;

const IMAGE_SPINNER_MESSAGE: &str = "Processing your image...";
const TEXT_SPINNER_MESSAGE: &str = "Processing your text...";
const RETRY_ACTION_LABEL: &str = "Try Again";

/// 各分析类型的展示信息
struct KindMeta {
    title: &'static str,
    icon: &'static str,
    label: &'static str,
    description: &'static str,
}

const SUMMARIZE_META: KindMeta = KindMeta {
    title: "Summary",
    icon: "file-text",
    label: "Summarize",
    description: "Get key points and main ideas",
};

const EXPLAIN_META: KindMeta = KindMeta {
    title: "Explanation",
    icon: "book-open",
    label: "Explain",
    description: "Break down complex concepts",
};

const QUIZ_META: KindMeta = KindMeta {
    title: "Quiz Questions",
    icon: "help-circle",
    label: "Quiz Me",
    description: "Generate practice questions",
};

const NOTES_META: KindMeta = KindMeta {
    title: "Study Notes",
    icon: "sparkles",
    label: "Study Notes",
    description: "Create organized notes",
};

/// 新增类型时编译器会要求在这里补上展示信息
fn meta(kind: ArtifactKind) -> &'static KindMeta {
    match kind {
        ArtifactKind::Summarize => &SUMMARIZE_META,
        ArtifactKind::Explain => &EXPLAIN_META,
        ArtifactKind::Quiz => &QUIZ_META,
        ArtifactKind::Notes => &NOTES_META,
    }
}

pub fn title_for(kind: ArtifactKind) -> &'static str {
    meta(kind).title
}

pub fn icon_for(kind: ArtifactKind) -> &'static str {
    meta(kind).icon
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindOption {
    pub kind: ArtifactKind,
    pub label: String,
    pub description: String,
}

impl From<ArtifactKind> for KindOption {
    fn from(kind: ArtifactKind) -> Self {
        let meta = meta(kind);
        Self {
            kind,
            label: meta.label.to_string(),
            description: meta.description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: String,
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub number: usize,
    pub question: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultBody {
    Prose { paragraphs: Vec<String> },
    Quiz { questions: Vec<QuestionView> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub kind: ArtifactKind,
    pub title: String,
    pub icon: String,
    pub body: ResultBody,
    pub follow_ups: Vec<KindOption>,
    pub extracted_text_chars: Option<usize>,
    /// 识别出的原文，渲染层按需展示
    pub extracted_text: Option<String>,
    pub processed_at: String,
    /// 保存结果时使用的文件名，内容为 AI 原始返回
    pub download_name: String,
    pub raw_response: String,
}

/// 交给渲染层的唯一数据，不含任何共享可变引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    ShowUploadForm { kinds: Vec<KindOption> },
    ShowSpinner { message: String },
    ShowError { message: String, action_label: String },
    ShowResult(ResultView),
}

/// 根据会话状态生成视图；parsed 为空时自行解析当前结果
pub fn present(state: &SessionState, parsed: Option<&RenderableResult>) -> ViewModel {
    match state.phase() {
        SessionPhase::Idle => ViewModel::ShowUploadForm {
            kinds: ArtifactKind::ALL.into_iter().map(KindOption::from).collect(),
        },
        SessionPhase::Submitting => {
            let message = match state.in_flight_source() {
                Some(RequestSource::Text) => TEXT_SPINNER_MESSAGE,
                _ => IMAGE_SPINNER_MESSAGE,
            };
            ViewModel::ShowSpinner {
                message: message.to_string(),
            }
        }
        SessionPhase::Failure => ViewModel::ShowError {
            message: state.error_message().unwrap_or_default().to_string(),
            action_label: RETRY_ACTION_LABEL.to_string(),
        },
        SessionPhase::Success => match state.last_result() {
            Some(result) => ViewModel::ShowResult(result_view(state, result, parsed)),
            None => ViewModel::ShowUploadForm {
                kinds: ArtifactKind::ALL.into_iter().map(KindOption::from).collect(),
            },
        },
    }
}

fn result_view(
    state: &SessionState,
    result: &RawResult,
    parsed: Option<&RenderableResult>,
) -> ResultView {
    let kind = result.request_type();
    let body = match parsed {
        Some(parsed) => body_from(parsed.clone()),
        None => body_from(parser::parse(result.ai_response(), kind)),
    };

    ResultView {
        kind,
        title: title_for(kind).to_string(),
        icon: icon_for(kind).to_string(),
        body,
        follow_ups: kind.follow_ups().map(KindOption::from).collect(),
        extracted_text_chars: state.extracted_text().map(|t| t.chars().count()),
        extracted_text: state.extracted_text().map(str::to_string),
        processed_at: result.timestamp().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        download_name: format!("{}-result.txt", kind),
        raw_response: result.ai_response().to_string(),
    }
}

fn body_from(parsed: RenderableResult) -> ResultBody {
    match parsed {
        RenderableResult::Prose { paragraphs } => ResultBody::Prose { paragraphs },
        RenderableResult::Quiz(quiz) => ResultBody::Quiz {
            questions: quiz_views(quiz),
        },
    }
}

fn quiz_views(quiz: ParsedQuiz) -> Vec<QuestionView> {
    quiz.questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            let options = q
                .options
                .iter()
                .enumerate()
                .map(|(j, text)| OptionView {
                    letter: option_letter(j),
                    text: text.clone(),
                    correct: q.is_correct(j),
                })
                .collect();
            QuestionView {
                number: i + 1,
                question: q.question,
                options,
            }
        })
        .collect()
}
