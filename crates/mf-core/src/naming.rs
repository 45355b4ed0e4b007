/// Strip characters that are unsafe in filenames across platforms.
///
/// Whitespace and the set `/ \ ? % * : | " < >` become underscores; the
/// result is safe to hand to a download dialog or `std::fs` unmodified.
pub fn sanitize_file_name(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// A sanitized prefix of user content, used to label generated media files.
pub fn file_stem_from(content: &str, max_chars: usize) -> String {
    sanitize_file_name(&content.chars().take(max_chars).collect::<String>())
}
