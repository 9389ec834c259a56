//! Linux-safe path component sanitization for asset basenames.

const NAME_MAX: usize = 255;

/// Sanitizes a URL path segment for use as part of a local asset filename.
///
/// - Replaces NUL, `/`, `\`, `%`, whitespace and control characters with `_`
///   (a `%` would be decoded again when the rewritten reference is followed)
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots, spaces and underscores
/// - Limits length to `max_len` bytes (never more than Linux NAME_MAX)
pub fn sanitize_component(name: &str, max_len: usize) -> String {
    let max_len = max_len.min(NAME_MAX);
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '\0' || c == '/' || c == '\\' || c == '%' || c.is_control() || c.is_whitespace();
        let replacement = if unsafe_char { '_' } else { c };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.len() > max_len {
        let mut take = max_len;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Replaces every non-word character (anything but alphanumerics and `_`) with `_`.
///
/// Used for the host part of asset names: `cdn.example.com:8080` → `cdn_example_com_8080`.
pub fn host_safe(authority: &str) -> String {
    authority
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
