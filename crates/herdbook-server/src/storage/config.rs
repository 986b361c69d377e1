use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::env_or;

pub const DEFAULT_MEDIA_ROOT: &str = "./media";
pub const DEFAULT_MEDIA_URL: &str = "/media/";
/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    #[default]
    Local,
    S3,
}

impl FromStr for MediaBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "fs" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => anyhow::bail!("Unknown MEDIA_BACKEND '{}': expected local or s3", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub backend: MediaBackend,
    /// Directory for the local backend
    pub root: PathBuf,
    /// Public prefix prepended to stored keys
    pub url: String,
    pub max_upload_bytes: usize,
    pub s3: S3Config,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::Local,
            root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            url: DEFAULT_MEDIA_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            s3: S3Config::default(),
        }
    }
}

impl MediaConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            backend: env_or("MEDIA_BACKEND", MediaBackend::Local)?,
            root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MEDIA_ROOT)),
            url: env::var("MEDIA_URL").unwrap_or_else(|_| DEFAULT_MEDIA_URL.to_string()),
            max_upload_bytes: env_or("MEDIA_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            s3: S3Config::from_env(),
        })
    }

    /// Local filesystem media rooted at `root`, e.g. a test temp dir
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MEDIA_MAX_UPLOAD_BYTES must be greater than 0");
        }
        if self.backend == MediaBackend::S3 && self.s3.bucket.is_empty() {
            anyhow::bail!("S3_BUCKET cannot be empty when MEDIA_BACKEND=s3");
        }
        Ok(())
    }

    /// Public URL for a stored key
    pub fn public_url(&self, key: &str) -> String {
        if self.url.ends_with('/') {
            format!("{}{}", self.url, key)
        } else {
            format!("{}/{}", self.url, key)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    #[serde(skip_serializing)]
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "us-east-1".to_string(),
            bucket: "herdbook-media".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            path_style: false,
        }
    }
}

impl S3Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or(defaults.region),
            bucket: env::var("S3_BUCKET").unwrap_or(defaults.bucket),
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .unwrap_or_default(),
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .unwrap_or_default(),
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}
