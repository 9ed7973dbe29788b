use lazy_static::lazy_static;

/// An AI response split into prose and fenced code segments.
///
/// Intra-kind order follows the original text; the frontend shows all prose
/// first and offers the code segments as one combined insertable block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub prose: Vec<String>,
    pub code: Vec<String>,
    pub has_fence: bool,
}

/// Word lists driving the unfenced-code fallback. Intentionally fuzzy and
/// Python-biased; false positives are acceptable.
#[derive(Debug, Clone)]
pub struct CodeHeuristics {
    pub request_triggers: Vec<&'static str>,
    pub response_signatures: Vec<&'static str>,
}

lazy_static! {
    pub static ref DEFAULT_HEURISTICS: CodeHeuristics = CodeHeuristics {
        request_triggers: vec!["код", "code", "функци", "класс", "напиши", "создай", "сделай"],
        response_signatures: vec!["def ", "class ", "import ", "from ", "if __name__"],
    };
}

/// Splits a response on triple-backtick fences. Odd split-index segments are
/// code, even ones prose. Total over any input: an unbalanced fence count
/// just leaves the final segment classified by parity.
pub fn extract_code_blocks(response: &str) -> ParsedResponse {
    let parts: Vec<&str> = response.split("```").collect();
    let has_fence = parts.len() > 1;
    let mut prose = Vec::new();
    let mut code = Vec::new();

    for (index, part) in parts.iter().enumerate() {
        if index % 2 == 1 {
            code.push(strip_language_tag(part).trim().to_string());
        } else {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                prose.push(trimmed.to_string());
            }
        }
    }

    ParsedResponse { prose, code, has_fence }
}

/// Drops the language tag a fence often opens with: an explicit `python`/`py`
/// line, or any bare first-line token (no spaces) when more lines follow.
fn strip_language_tag(segment: &str) -> &str {
    if let Some(rest) = segment.strip_prefix("python\n") {
        return rest;
    }
    if let Some(rest) = segment.strip_prefix("py\n") {
        return rest;
    }
    if let Some((first_line, rest)) = segment.split_once('\n') {
        if !first_line.trim_end().contains(' ') {
            return rest;
        }
    }
    segment
}

/// Heuristic for responses with no fences at all: the request asked for code
/// and the response reads like Python source.
pub fn looks_like_code(request: &str, response: &str, heuristics: &CodeHeuristics) -> bool {
    let request = request.to_lowercase();
    heuristics.request_triggers.iter().any(|word| request.contains(word))
        && heuristics.response_signatures.iter().any(|kw| response.contains(kw))
}

/// Full parse as the chat handler uses it: fenced blocks when present,
/// otherwise the whole response as one code segment when the fallback
/// heuristic fires, otherwise plain prose.
pub fn parse_ai_response(response: &str, request: &str, heuristics: &CodeHeuristics) -> ParsedResponse {
    let parsed = extract_code_blocks(response);
    if parsed.has_fence {
        return parsed;
    }
    if looks_like_code(request, response, heuristics) {
        return ParsedResponse {
            prose: Vec::new(),
            code: vec![response.trim().to_string()],
            has_fence: false,
        };
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_with_py_tag() {
        let parsed = extract_code_blocks("Here:\n```py\nprint(1)\n```\nDone");
        assert_eq!(parsed.prose, vec!["Here:", "Done"]);
        assert_eq!(parsed.code, vec!["print(1)"]);
        assert!(parsed.has_fence);
    }

    #[test]
    fn fenced_block_with_python_tag() {
        let parsed = extract_code_blocks("```python\nx = 1\ny = 2\n```");
        assert_eq!(parsed.code, vec!["x = 1\ny = 2"]);
        assert!(parsed.prose.is_empty());
    }

    #[test]
    fn bare_token_first_line_is_stripped() {
        let parsed = extract_code_blocks("```rust\nfn main() {}\n```");
        assert_eq!(parsed.code, vec!["fn main() {}"]);
    }

    #[test]
    fn untagged_fence_drops_empty_tag_line() {
        // The opening fence is followed directly by a newline, which counts
        // as an empty tag line.
        let parsed = extract_code_blocks("```\nprint(1)\n```");
        assert_eq!(parsed.code, vec!["print(1)"]);
    }

    #[test]
    fn first_line_with_spaces_is_code() {
        let parsed = extract_code_blocks("```x = 1\ny = 2\n```");
        assert_eq!(parsed.code, vec!["x = 1\ny = 2"]);
    }

    #[test]
    fn no_fence_is_all_prose() {
        let parsed = extract_code_blocks("Just an explanation.");
        assert!(!parsed.has_fence);
        assert!(parsed.code.is_empty());
        assert_eq!(parsed.prose, vec!["Just an explanation."]);
    }

    #[test]
    fn unbalanced_fence_does_not_panic() {
        let parsed = extract_code_blocks("before ``` after");
        assert!(parsed.has_fence);
        assert_eq!(parsed.prose, vec!["before"]);
        assert_eq!(parsed.code, vec!["after"]);
    }

    #[test]
    fn multiple_blocks_keep_order() {
        let parsed = extract_code_blocks("a\n```py\nfirst\n```\nb\n```py\nsecond\n```\nc");
        assert_eq!(parsed.prose, vec!["a", "b", "c"]);
        assert_eq!(parsed.code, vec!["first", "second"]);
    }

    #[test]
    fn heuristic_needs_both_sides() {
        let h = &DEFAULT_HEURISTICS;
        assert!(looks_like_code("write me code", "def f():\n    pass", h));
        assert!(!looks_like_code("how are you", "def f():\n    pass", h));
        assert!(!looks_like_code("write me code", "I cannot do that", h));
    }

    #[test]
    fn heuristic_matches_localized_triggers() {
        let h = &DEFAULT_HEURISTICS;
        assert!(looks_like_code("Напиши функцию", "def f():\n    pass", h));
    }

    #[test]
    fn fallback_treats_whole_response_as_code() {
        let parsed = parse_ai_response("import os\nprint(os.name)\n", "write code to show the os", &DEFAULT_HEURISTICS);
        assert!(!parsed.has_fence);
        assert_eq!(parsed.code, vec!["import os\nprint(os.name)"]);
        assert!(parsed.prose.is_empty());
    }

    #[test]
    fn fallback_does_not_fire_on_plain_chat() {
        let parsed = parse_ai_response("Hello there!", "greet me", &DEFAULT_HEURISTICS);
        assert!(parsed.code.is_empty());
        assert_eq!(parsed.prose, vec!["Hello there!"]);
    }
}
