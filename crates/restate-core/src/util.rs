//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Uppercase initials of up to the first two words of a display name.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// `userId` and `secret` query parameters of a deep link, or `None` if it does not parse.
pub fn link_credentials(link: &str) -> Option<(Option<String>, Option<String>)> {
    let url = url::Url::parse(link.trim()).ok()?;
    let mut user_id = None;
    let mut secret = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "userId" => user_id = normalize_text_option(Some(value.into_owned())),
            "secret" => secret = normalize_text_option(Some(value.into_owned())),
            _ => {}
        }
    }
    Some((user_id, secret))
}
