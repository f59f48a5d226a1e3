//! Linux-safe file name sanitization.

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

/// Makes `name` safe to use as a single path component on Linux.
///
/// Path separators, NUL and control characters become `_`. Leading and
/// trailing whitespace and dots are trimmed so the result can never be `.`,
/// `..` or a hidden file. The result is cut to `NAME_MAX` bytes on a char
/// boundary. May return an empty string.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
