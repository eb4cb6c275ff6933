use url::Url;


#[inline]
pub fn safe_truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}


/// Short display name of a concept URI: its fragment, else its last path
/// segment, else the URI itself.
pub fn uri_fragment(uri: &str) -> String {
    let Ok(parsed) = Url::parse(uri) else {
        return uri.to_string();
    };
    if let Some(fragment) = parsed.fragment().filter(|f| !f.is_empty()) {
        return fragment.to_string();
    }
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back().filter(|s| !s.is_empty()).map(str::to_string))
        .unwrap_or_else(|| uri.to_string())
}
