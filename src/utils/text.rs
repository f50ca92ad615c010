use serde_json::Value as JsonValue;

/// Canonical form used for duplicate detection: lowercased, punctuation
/// removed, whitespace collapsed to single spaces.
pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds the first balanced `{...}` span in `text` that parses as a JSON
/// object. Model output routinely wraps the payload in prose or code
/// fences, so the scan cannot assume the response is pure JSON.
pub fn extract_json_object(text: &str) -> Option<JsonValue> {
    let starts: Vec<usize> = text
        .char_indices()
        .filter(|(_, c)| *c == '{')
        .map(|(i, _)| i)
        .collect();

    for start in starts {
        if let Some(end) = matching_brace(text, start) {
            if let Ok(value) = serde_json::from_str::<JsonValue>(&text[start..=end]) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
    }
    None
}

// String-literal aware: braces inside quoted strings do not count.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(
            normalize_text("  What is   SQL's  JOIN?! "),
            "what is sqls join"
        );
        assert_eq!(normalize_text("...!?"), "");
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! Here is the question:\n{\"prompt\": \"What is a B-tree?\"}\nHope it helps.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["prompt"], "What is a B-tree?");
    }

    #[test]
    fn braces_inside_strings_do_not_break_matching() {
        let text = "{\"prompt\": \"print \\\"{}\\\" in Rust\", \"answer\": \"A\"}";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["answer"], "A");
    }

    #[test]
    fn skips_unparseable_spans() {
        let text = "{not json} but later {\"score\": 7}";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["score"], 7);
    }

    #[test]
    fn no_object_yields_none() {
        assert!(extract_json_object("plain prose, no payload").is_none());
    }
}
