use std::fmt::Write;

use crate::services::presenter::{ResultBody, ResultView, ViewModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// 在结果后附上识别出的原文
    pub show_extracted_text: bool,
}

/// 把 ViewModel 渲染为终端文本，不包含任何业务判断
pub fn render_text(view: &ViewModel) -> String {
    render_text_with(view, RenderOptions::default())
}

pub fn render_text_with(view: &ViewModel, options: RenderOptions) -> String {
    let mut out = String::new();
    match view {
        ViewModel::ShowUploadForm { kinds } => {
            out.push_str("Upload Your Study Material\n");
            for option in kinds {
                let _ = writeln!(out, "  [{}] {} - {}", option.kind, option.label, option.description);
            }
        }
        ViewModel::ShowSpinner { message } => {
            let _ = writeln!(out, "{}", message);
        }
        ViewModel::ShowError {
            message,
            action_label,
        } => {
            let _ = writeln!(out, "Error: {}", message);
            let _ = writeln!(out, "[{}]", action_label);
        }
        ViewModel::ShowResult(result) => render_result(&mut out, result, options),
    }
    out
}

fn render_result(out: &mut String, view: &ResultView, options: RenderOptions) {
    let _ = writeln!(out, "== {} ==", view.title);
    match &view.body {
        ResultBody::Prose { paragraphs } => {
            for paragraph in paragraphs {
                let _ = writeln!(out, "{}", paragraph);
            }
        }
        ResultBody::Quiz { questions } => {
            for question in questions {
                let _ = writeln!(out, "\nQuestion {}: {}", question.number, question.question);
                for option in &question.options {
                    let mark = if option.correct { "  ✓" } else { "" };
                    let _ = writeln!(out, "  {}. {}{}", option.letter, option.text, mark);
                }
            }
        }
    }

    out.push('\n');
    if let Some(chars) = view.extracted_text_chars {
        let _ = writeln!(out, "Extracted text: {} characters", chars);
    }
    if options.show_extracted_text {
        if let Some(text) = &view.extracted_text {
            let _ = writeln!(out, "--- Extracted text ---\n{}\n----------------------", text.trim_end());
        }
    }
    let follow_ups: Vec<&str> = view.follow_ups.iter().map(|o| o.label.as_str()).collect();
    let _ = writeln!(out, "Try different analysis: {}", follow_ups.join(", "));
    let _ = writeln!(out, "Processed at {}", view.processed_at);
}
