pub const IMAGE_PREFIX: &str = "image/";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn image_path(millis: i64, original_file_name: &str) -> String {
    format!(
        "{IMAGE_PREFIX}{millis}_{}",
        sanitize_file_name(original_file_name)
    )
}
