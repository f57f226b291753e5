//! 자유 형식 모델 응답에서 코드 추출.
//!
//! 두 단계로 파싱합니다:
//! 1. 펜스 코드 블록(```` ``` ````, 언어 태그 선택)을 찾으면 그 내용을 사용
//! 2. 없으면 응답 전체(앞뒤 공백 제거)를 코드로 사용
//!
//! 추출은 실패하지 않습니다.

const FENCE: &str = "```";

/// 추출 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedCode {
    /// 펜스 코드 블록에서 추출됨
    Fenced(String),
    /// 펜스가 없어 응답 전체를 사용함
    Raw(String),
}

impl ExtractedCode {
    /// 추출된 코드.
    pub fn code(&self) -> &str {
        match self {
            Self::Fenced(code) | Self::Raw(code) => code,
        }
    }

    /// 코드 문자열로 변환합니다.
    pub fn into_code(self) -> String {
        match self {
            Self::Fenced(code) | Self::Raw(code) => code,
        }
    }

    /// 펜스 블록에서 추출되었는지 여부.
    pub fn is_fenced(&self) -> bool {
        matches!(self, Self::Fenced(_))
    }
}

/// 응답 텍스트에서 코드를 추출합니다.
pub fn extract_code_block(raw: &str) -> ExtractedCode {
    match find_fenced_block(raw) {
        Some(code) => ExtractedCode::Fenced(code.to_string()),
        None => ExtractedCode::Raw(raw.trim().to_string()),
    }
}

/// 첫 번째로 닫힌 펜스 블록의 내용을 찾습니다.
fn find_fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find(FENCE)?;
    let body = strip_language_tag(&raw[open + FENCE.len()..]);
    let close = body.find(FENCE)?;
    Some(body[..close].trim())
}

/// 여는 펜스 바로 뒤의 언어 태그(`python`, `py`, `Python3` 등)를 제거합니다.
///
/// 태그는 같은 줄에 단독으로 있을 때만 인정합니다.
fn strip_language_tag(after_fence: &str) -> &str {
    let tag_len = after_fence
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.' | '#')))
        .unwrap_or(after_fence.len());
    if tag_len == 0 {
        return after_fence;
    }

    let rest = &after_fence[tag_len..];
    let line_rest = rest.trim_start_matches([' ', '\t']);
    if line_rest.is_empty() || line_rest.starts_with(['\n', '\r']) {
        rest
    } else {
        after_fence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_tagged_block() {
        let raw = "Here you go:\n```python\ndef run_strategy(df):\n    return {}\n```\nEnjoy.";
        let extracted = extract_code_block(raw);

        assert!(extracted.is_fenced());
        assert_eq!(
            extracted.code(),
            "def run_strategy(df):\n    return {}"
        );
    }

    #[test]
    fn test_untagged_block() {
        let raw = "```\nx = 1\n```";
        assert_eq!(extract_code_block(raw), ExtractedCode::Fenced("x = 1".into()));
    }

    #[test]
    fn test_tag_is_case_insensitive_and_flexible() {
        for tag in ["Python", "PYTHON", "py", "python3"] {
            let raw = format!("```{tag}\nimport pandas as pd\n```");
            assert_eq!(extract_code_block(&raw).code(), "import pandas as pd", "tag {tag}");
        }
    }

    #[test]
    fn test_inline_code_after_fence_is_not_a_tag() {
        let raw = "```print('hi')```";
        assert_eq!(extract_code_block(raw).code(), "print('hi')");

        let raw = "```x = 1\n```";
        assert_eq!(extract_code_block(raw).code(), "x = 1");
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = "```python\r\ndef f():\r\n    pass\r\n```";
        assert_eq!(extract_code_block(raw).code(), "def f():\r\n    pass");
    }

    #[test]
    fn test_no_fence_falls_back_to_trimmed_raw() {
        let raw = "\n  def run_strategy(df):\n    return {}\n\n";
        let extracted = extract_code_block(raw);

        assert!(!extracted.is_fenced());
        assert_eq!(extracted.into_code(), "def run_strategy(df):\n    return {}");
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_raw() {
        let raw = "```python\ndef run_strategy(df):";
        assert_eq!(extract_code_block(raw), ExtractedCode::Raw(raw.to_string()));
    }

    #[test]
    fn test_first_block_wins() {
        let raw = "```python\nfirst()\n```\ntext\n```python\nsecond()\n```";
        assert_eq!(extract_code_block(raw).code(), "first()");
    }
}
