use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_BLOB_API_URL, DEFAULT_DESCRIPTION_MODEL, DEFAULT_GEMINI_ENDPOINT,
    DEFAULT_IMAGE_MODEL, DEFAULT_PORT, PUBLIC_UPLOADS_DIR_NAME, UPLOAD_DIR_NAME,
};

#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub gemini_api_key: String,
    pub gemini_endpoint: String,
    pub description_model: String,
    pub image_model: String,
    pub auth: Option<BasicAuth>,
    pub blob_token: Option<String>,
    pub blob_api_url: String,
    pub upload_dir: PathBuf,
    pub public_uploads_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: format!("{DEFAULT_BIND_HOST}:{DEFAULT_PORT}"),
            gemini_api_key: String::new(),
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.into(),
            description_model: DEFAULT_DESCRIPTION_MODEL.into(),
            image_model: DEFAULT_IMAGE_MODEL.into(),
            auth: None,
            blob_token: None,
            blob_api_url: DEFAULT_BLOB_API_URL.into(),
            upload_dir: PathBuf::from(UPLOAD_DIR_NAME),
            public_uploads_dir: PathBuf::from(PUBLIC_UPLOADS_DIR_NAME),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment, after loading `.env`
    /// when one is present.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut settings = Settings::default();

        match var("GEMINI_API_KEY") {
            Some(key) => settings.gemini_api_key = key,
            None => bail!("GEMINI_API_KEY is not set in environment variables."),
        }

        if let Some(v) = var("GEMINI_ENDPOINT") {
            settings.gemini_endpoint = v;
        }
        if let Some(v) = var("DESCRIPTION_MODEL") {
            settings.description_model = v;
        }
        if let Some(v) = var("IMAGE_MODEL") {
            settings.image_model = v;
        }

        if let Some(port) = var("PORT") {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{port}'"))?;
            settings.bind_addr = format!("{DEFAULT_BIND_HOST}:{port}");
        }
        if let Some(v) = var("BIND_ADDR") {
            settings.bind_addr = v;
        }

        if let (Some(username), Some(password)) = (var("AUTH_USERNAME"), var("AUTH_PASSWORD")) {
            settings.auth = Some(BasicAuth { username, password });
        }

        settings.blob_token = var("BLOB_READ_WRITE_TOKEN");
        if let Some(v) = var("BLOB_API_URL") {
            settings.blob_api_url = v;
        }

        if let Some(v) = var("UPLOAD_DIR") {
            settings.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = var("PUBLIC_UPLOADS_DIR") {
            settings.public_uploads_dir = PathBuf::from(v);
        }

        Ok(settings)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_addr))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn api_key_is_required() {
        let error = settings_from(&[]).unwrap_err();
        assert!(error.to_string().contains("GEMINI_API_KEY"));
        assert!(settings_from(&[("GEMINI_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let settings = settings_from(&[("GEMINI_API_KEY", "secret")]).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.description_model, DEFAULT_DESCRIPTION_MODEL);
        assert!(settings.auth.is_none());
        assert!(settings.blob_token.is_none());
        assert!(settings.socket_addr().is_ok());
    }

    #[test]
    fn auth_needs_both_credentials() {
        let settings =
            settings_from(&[("GEMINI_API_KEY", "k"), ("AUTH_USERNAME", "ana")]).unwrap();
        assert!(settings.auth.is_none());

        let settings = settings_from(&[
            ("GEMINI_API_KEY", "k"),
            ("AUTH_USERNAME", "ana"),
            ("AUTH_PASSWORD", "pw"),
            ("PORT", "8080"),
            ("BLOB_READ_WRITE_TOKEN", "tok"),
        ])
        .unwrap();
        let auth = settings.auth.expect("auth configured");
        assert_eq!(auth.username, "ana");
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.blob_token.as_deref(), Some("tok"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(settings_from(&[("GEMINI_API_KEY", "k"), ("PORT", "http")]).is_err());
    }
}
