use html_escape::decode_html_entities;

/// Decode entities, drop invisible characters, collapse whitespace.
/// Returns `None` when nothing visible is left.
pub fn normalize(value: Option<&str>) -> Option<String> {
    value.and_then(normalize_str)
}

pub fn normalize_str(value: &str) -> Option<String> {
    let mut text = strip_invisible(value);
    // Each round that changes the text shortens it, so this terminates.
    loop {
        let decoded = strip_invisible(&decode_html_entities(&text));
        if decoded == text {
            break;
        }
        text = decoded;
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn strip_invisible(s: &str) -> String {
    s.chars().filter(|c| !is_invisible(*c)).collect()
}

// Zero-width space/non-joiner/joiner, BOM, and control characters that are
// not themselves whitespace (tabs and newlines survive until the collapse).
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}') || (c.is_control() && !c.is_whitespace())
}
