//! Filesystem storage for image variants.
//!
//! Two directories back the store: the "opened" directory holds derived
//! variants and is group-shared with the front-facing server, while the
//! "protected" directory holds Original files readable by the backend
//! process only. The split is enforced per file through group ownership
//! and permission bits.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use scribe_common::config::ImagesConfig;
use scribe_common::{AppError, AppResult};
use scribe_db::entities::image::Resolution;

// Owner read/write, group read.
const FILE_MODE: u32 = 0o640;

/// Filesystem store for image files.
#[derive(Debug, Clone)]
pub struct ImageStore {
    opened_dir: PathBuf,
    protected_dir: PathBuf,
    opened_group_id: Option<u32>,
    protected_group_id: Option<u32>,
    route_prefix: String,
}

impl ImageStore {
    /// Create a store from the image configuration.
    #[must_use]
    pub fn new(config: &ImagesConfig) -> Self {
        Self {
            opened_dir: config.opened_dir.clone(),
            protected_dir: config.protected_dir.clone(),
            opened_group_id: config.opened_group_id,
            protected_group_id: config.protected_group_id,
            route_prefix: config.route_prefix.clone(),
        }
    }

    /// Absolute path a variant is stored under.
    #[must_use]
    pub fn full_path(&self, file_name: &str, resolution: Resolution) -> PathBuf {
        if resolution == Resolution::Original {
            self.protected_dir.join(file_name)
        } else {
            self.opened_dir.join(file_name)
        }
    }

    /// URL path a derived variant is served under.
    #[must_use]
    pub fn served_path(&self, file_name: &str) -> String {
        format!("{}{file_name}", self.route_prefix)
    }

    /// Save an original image verbatim into the protected directory.
    pub async fn save_original(&self, file_name: &str, bytes: &[u8]) -> AppResult<()> {
        self.write(file_name, Resolution::Original, bytes).await
    }

    /// Encode and save a derived variant into the opened directory.
    pub async fn save_variant(
        &self,
        file_name: &str,
        resolution: Resolution,
        image: &DynamicImage,
        extension: &str,
    ) -> AppResult<()> {
        let format = image::ImageFormat::from_extension(extension).ok_or_else(|| {
            AppError::UnreadableImage(format!("unsupported image extension '{extension}'"))
        })?;

        let mut encoded = Cursor::new(Vec::new());
        image
            .write_to(&mut encoded, format)
            .map_err(|e| AppError::UnreadableImage(e.to_string()))?;

        self.write(file_name, resolution, &encoded.into_inner())
            .await
    }

    /// Compare incoming bytes against the stored Original file.
    ///
    /// A missing stored file compares unequal, which makes the caller
    /// regenerate the alias instead of failing the whole ingestion.
    pub async fn matches_original(&self, file_name: &str, bytes: &[u8]) -> AppResult<bool> {
        let path = self.full_path(file_name, Resolution::Original);
        match tokio::fs::read(&path).await {
            Ok(stored) => Ok(stored == bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Io(e.to_string())),
        }
    }

    /// Remove a stored file; a file that is already gone is not an error.
    pub async fn remove(&self, file_name: &str, resolution: Resolution) -> AppResult<()> {
        let path = self.full_path(file_name, resolution);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e.to_string())),
        }
    }

    async fn write(&self, file_name: &str, resolution: Resolution, bytes: &[u8]) -> AppResult<()> {
        let path = self.full_path(file_name, resolution);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Io(format!("failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Io(format!("failed to write file: {e}")))?;

        self.apply_access_policy(&path, resolution)
    }

    // Share derived variants with the front-end server's group; originals
    // stay owned by the backend's own group. Only the backend user may
    // modify either.
    fn apply_access_policy(&self, path: &Path, resolution: Resolution) -> AppResult<()> {
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;

            let group_id = if resolution == Resolution::Original {
                self.protected_group_id
            } else {
                self.opened_group_id
            };

            if group_id.is_some() {
                std::os::unix::fs::chown(path, None, group_id)
                    .map_err(|e| AppError::Io(format!("failed to change file group: {e}")))?;
            }

            std::fs::set_permissions(path, Permissions::from_mode(FILE_MODE))
                .map_err(|e| AppError::Io(format!("failed to set file mode: {e}")))?;
        }

        #[cfg(not(unix))]
        let _ = path;

        Ok(())
    }
}
