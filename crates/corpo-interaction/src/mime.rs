//! Content types for uploaded files.

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Guesses the content type from the file name's extension.
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
