//! Extraction of answers the model was asked to wrap in a triple-backtick
//! block.
//!
//! Models do not always comply: the block may carry an info string
//! (```` ```markdown ````), be preceded by chatter, lack its closing fence or
//! be missing entirely. All of those are accepted; only an answer with no
//! content left is rejected.

use thiserror::Error;

const FENCE: &str = "```";

/// Labels models put after the opening fence. Any other first line is content.
const INFO_STRINGS: &[&str] = &["markdown", "md", "text", "plaintext", "txt", "prompt"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenceError {
    #[error("model returned an empty answer")]
    Empty,
}

pub fn extract_fenced(text: &str) -> Result<String, FenceError> {
    let body = match fenced_block(text) {
        Some(block) => block.to_string(),
        None => text.replace(FENCE, ""),
    };

    let body = body.trim();
    if body.is_empty() {
        return Err(FenceError::Empty);
    }
    Ok(body.to_string())
}

/// Content of the first complete block, info string removed.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    let block = &rest[..end];

    // an info string sits alone on the opening line
    match block.split_once('\n') {
        Some((first_line, remainder)) if is_info_string(first_line) => Some(remainder),
        _ => Some(block),
    }
}

fn is_info_string(line: &str) -> bool {
    INFO_STRINGS.contains(&line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_block_content() {
        let reply = "```\nGenerate an image of a quiet harbour at dusk.\n```";
        assert_eq!(
            extract_fenced(reply).unwrap(),
            "Generate an image of a quiet harbour at dusk."
        );
    }

    #[test]
    fn drops_info_string_and_surrounding_chatter() {
        let reply = "Sure, here it is:\n```markdown\n### Characters\n* one child\n```\nEnjoy!";
        assert_eq!(extract_fenced(reply).unwrap(), "### Characters\n* one child");
    }

    #[test]
    fn single_word_block_is_not_mistaken_for_info_string() {
        assert_eq!(extract_fenced("```مرحبا```").unwrap(), "مرحبا");
        assert_eq!(extract_fenced("```hello```").unwrap(), "hello");
    }

    #[test]
    fn one_word_first_line_is_kept() {
        assert_eq!(
            extract_fenced("```Cat\nsitting on a red rug```").unwrap(),
            "Cat\nsitting on a red rug"
        );
        assert_eq!(
            extract_fenced("```Harbour\nat dusk\n```").unwrap(),
            "Harbour\nat dusk"
        );
        assert_eq!(extract_fenced("```Text\nat dusk```").unwrap(), "Text\nat dusk");
        assert_eq!(extract_fenced("```text\nat dusk```").unwrap(), "at dusk");
    }

    #[test]
    fn unterminated_or_missing_fences_are_tolerated() {
        assert_eq!(extract_fenced("```\nhalf open").unwrap(), "half open");
        assert_eq!(extract_fenced("  plain answer ").unwrap(), "plain answer");
    }

    #[test]
    fn empty_answers_are_rejected() {
        assert_eq!(extract_fenced(""), Err(FenceError::Empty));
        assert_eq!(extract_fenced("``````"), Err(FenceError::Empty));
        assert_eq!(extract_fenced("```\n   \n```"), Err(FenceError::Empty));
    }
}
