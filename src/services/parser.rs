//! AI 返回文本的解析：普通文本按段落展示，测验类型尝试从文本中提取 JSON

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::core::types::ArtifactKind;
use crate::utils::text::{extract_json_object, split_paragraphs, strip_code_fence};

/// 可直接渲染的解析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderableResult {
    Prose { paragraphs: Vec<String> },
    Quiz(ParsedQuiz),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuiz {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// 越界的正确答案序号会被置为 None，此时所有选项都不标记
    pub correct: Option<usize>,
}

impl QuizQuestion {
    pub fn is_correct(&self, option_index: usize) -> bool {
        self.correct == Some(option_index)
    }
}

/// 测验 JSON 提取失败的原因，只在内部使用
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("no JSON object found in the response")]
    NoJsonObject,
    #[error("quiz JSON could not be decoded: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuizItem>,
}

#[derive(Debug, Deserialize)]
struct QuizItem {
    question: String,
    options: Vec<String>,
    /// AI 有时返回 1.0、超大整数或字符串，先按任意 JSON 值接收
    #[serde(default)]
    correct: Option<Value>,
}

/// 只接受非负整数（含 1.0 这样的整数浮点），其余形状一律视为无效
fn answer_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}

impl From<QuizItem> for QuizQuestion {
    fn from(item: QuizItem) -> Self {
        let correct = item
            .correct
            .as_ref()
            .and_then(answer_index)
            .filter(|c| *c < item.options.len());
        QuizQuestion {
            question: item.question,
            options: item.options,
            correct,
        }
    }
}

/// 解析 AI 返回内容，永不失败：测验提取失败时退回普通段落
pub fn parse(ai_response: &str, kind: ArtifactKind) -> RenderableResult {
    match kind {
        ArtifactKind::Quiz => match extract_quiz(ai_response) {
            Ok(quiz) => RenderableResult::Quiz(quiz),
            Err(e) => {
                debug!("测验 JSON 提取失败，按普通文本展示: {}", e);
                prose(ai_response)
            }
        },
        ArtifactKind::Summarize | ArtifactKind::Explain | ArtifactKind::Notes => {
            prose(ai_response)
        }
    }
}

pub fn prose(ai_response: &str) -> RenderableResult {
    RenderableResult::Prose {
        paragraphs: split_paragraphs(ai_response),
    }
}

pub fn extract_quiz(ai_response: &str) -> Result<ParsedQuiz, ParseFailure> {
    let cleaned = strip_code_fence(ai_response);
    let json = extract_json_object(cleaned).ok_or(ParseFailure::NoJsonObject)?;
    let payload: QuizPayload = serde_json::from_str(json)?;

    let questions: Vec<QuizQuestion> = payload.questions.into_iter().map(Into::into).collect();
    let unmarked = questions.iter().filter(|q| q.correct.is_none()).count();
    if unmarked > 0 {
        debug!("{} 道题目的正确答案序号无效，选项将不做标记", unmarked);
    }
    debug!("成功解析 {} 道测验题", questions.len());

    Ok(ParsedQuiz { questions })
}
