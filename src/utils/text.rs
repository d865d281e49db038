/// 去掉首尾的 markdown 代码块标记（```json 或 ```），没有标记时原样返回（Trim 后）
pub fn strip_code_fence(input: &str) -> &str {
    let mut cleaned = input.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.trim_end().strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// 从第一个 { 截取到最后一个 }，容忍 JSON 前后夹杂的说明文字
pub fn extract_json_object(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    if start < end {
        Some(&input[start..=end])
    } else {
        None
    }
}

/// 按行拆分段落，空行丢弃，行内内容（包括 markdown 标记）保持不变
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// 选项序号：0 -> "A"，1 -> "B"，超过 26 个时退回数字
pub fn option_letter(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
        // 只有开头的标记也能处理
        assert_eq!(strip_code_fence("```json {\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_extract_json_object_is_greedy() {
        let text = "Here you go: {\"a\":{\"b\":1}} and {\"c\":2} done";
        assert_eq!(extract_json_object(text), Some("{\"a\":{\"b\":1}} and {\"c\":2}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "**Key point**\r\n\r\n- first\n   \n- second";
        assert_eq!(split_paragraphs(text), vec!["**Key point**", "- first", "- second"]);
        assert!(split_paragraphs("").is_empty());
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), "A");
        assert_eq!(option_letter(3), "D");
        assert_eq!(option_letter(25), "Z");
        assert_eq!(option_letter(26), "27");
    }
}
