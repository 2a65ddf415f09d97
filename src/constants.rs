pub const DEFAULT_DESCRIPTION_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const UPLOAD_DIR_NAME: &str = "tmp/uploads";
pub const PUBLIC_UPLOADS_DIR_NAME: &str = "public/uploads";
pub const PUBLIC_UPLOADS_ROUTE: &str = "/uploads";
pub const AUTH_REALM: &str = "Art Flow";
pub const UPLOAD_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
