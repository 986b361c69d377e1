//! Media storage for uploaded bovid photos
//!
//! [`MediaStorage`] stores opaque keys such as `images/<uuid>.png` in either
//! a local directory (served by the router under `/media`) or an
//! S3-compatible bucket. Callers only ever see keys and public URLs.

use anyhow::{Context, Result};
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

pub mod config;
pub mod image;

use config::{MediaBackend, MediaConfig, S3Config};

/// Prefix under which bovid photos are stored
pub const IMAGE_PREFIX: &str = "images";

/// Build a fresh key for an uploaded image
pub fn image_key(extension: &str) -> String {
    format!("{}/{}.{}", IMAGE_PREFIX, uuid::Uuid::new_v4(), extension)
}

#[derive(Clone)]
pub struct MediaStorage {
    backend: Backend,
    config: MediaConfig,
}

#[derive(Clone)]
enum Backend {
    Local(LocalStorage),
    S3(S3Storage),
}

impl MediaStorage {
    pub async fn new(config: MediaConfig) -> Result<Self> {
        let backend = match config.backend {
            MediaBackend::Local => Backend::Local(LocalStorage::new(&config.root).await?),
            MediaBackend::S3 => Backend::S3(S3Storage::new(&config.s3)),
        };

        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Directory to serve under `/media`, when media lives on local disk
    pub fn local_root(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Local(local) => Some(&local.root),
            Backend::S3(_) => None,
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }

    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        match &self.backend {
            Backend::Local(local) => local.put(key, &data).await,
            Backend::S3(s3) => s3.put(key, data, content_type).await,
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        match &self.backend {
            Backend::Local(local) => local.delete(key).await,
            Backend::S3(s3) => s3.delete(key).await,
        }
    }
}

// ============================================================================
// Local filesystem
// ============================================================================

#[derive(Clone)]
struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    async fn new(root: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("Failed to create media root {}", root.display()))?;

        info!("Local media storage rooted at {}", root.display());

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Resolve a key below the root, refusing anything that could escape it
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            anyhow::bail!("Invalid media key: {}", key);
        }
        Ok(self.root.join(relative))
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write media file {}", path.display()))?;

        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}

// ============================================================================
// S3-compatible bucket
// ============================================================================

#[derive(Clone)]
struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    fn new(config: &S3Config) -> Self {
        debug!(bucket = %config.bucket, endpoint = ?config.endpoint, "Initializing S3 media storage");

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "herdbook-media",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("S3 media storage initialized for bucket: {}", config.bucket);

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .context("Failed to upload to S3")?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context(format!("Failed to delete from S3: {}", key))?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
