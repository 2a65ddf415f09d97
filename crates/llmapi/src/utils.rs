use base64::Engine as _;
use std::path::Path;

pub fn detect_mime_type<P: AsRef<Path>>(path: P) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("image/jpeg")
        .to_string()
}

/// Like [`detect_mime_type`] but without a fallback for unknown extensions.
pub fn known_mime_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

pub fn encode_byte_to_base64(bytes: impl AsRef<[u8]>) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn current_timestamp_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or_default()
}
