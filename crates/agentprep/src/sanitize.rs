//! Helpers for scrubbing data before it reaches log output.

/// Longest response body excerpt carried into errors and logs.
pub const MAX_BODY_EXCERPT: usize = 200;

/// Strips userinfo (tokens, passwords) and the query string from a URL.
///
/// - `https://user:pw@host/api?token=x` → `https://****@host/api`
/// - `http://localhost:3000/api/use-cases` → unchanged
pub fn redact_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);

    if let Some(scheme_end) = without_query.find("://") {
        let after_scheme = &without_query[scheme_end + 3..];
        let authority_end = after_scheme.find('/').unwrap_or(after_scheme.len());
        if let Some(at_pos) = after_scheme[..authority_end].rfind('@') {
            let scheme = &without_query[..scheme_end + 3];
            return format!("{}****@{}", scheme, &after_scheme[at_pos + 1..]);
        }
    }

    without_query.to_string()
}

/// Trims a response body to at most [`MAX_BODY_EXCERPT`] characters on one line.
pub fn truncate_body(body: &str) -> String {
    let flat: String = body
        .trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= MAX_BODY_EXCERPT {
        return flat;
    }
    let mut excerpt: String = flat.chars().take(MAX_BODY_EXCERPT).collect();
    excerpt.push('…');
    excerpt
}
