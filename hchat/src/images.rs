//! Resolves image attachments into decoded bytes for vision-capable providers.
//!
//! ```rust
//! use hchat::{Attachment, FsImageLoader};
//!
//! let loader = FsImageLoader::new("/srv/uploads");
//! let path = loader
//!     .resolve(&Attachment::image_url("/uploads/cat.png"))
//!     .expect("upload URL should resolve");
//! assert!(path.ends_with("cat.png"));
//! ```

use std::path::{Component, Path, PathBuf};

use hcommon::BoxFuture;
use hprovider::ImageInput;

use crate::{Attachment, ChatError};

const UPLOAD_URL_PREFIX: &str = "/uploads/";

pub trait ImageLoader: Send + Sync {
    fn load_image<'a>(
        &'a self,
        attachment: &'a Attachment,
    ) -> BoxFuture<'a, Result<ImageInput, ChatError>>;
}

/// Reads images from local disk, mapping `/uploads/...` URLs into `upload_dir`.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    upload_dir: PathBuf,
}

impl FsImageLoader {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn resolve(&self, attachment: &Attachment) -> Result<PathBuf, ChatError> {
        if let Some(url) = &attachment.url
            && let Some(relative) = url.strip_prefix(UPLOAD_URL_PREFIX)
        {
            let relative = Path::new(relative);
            if relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)))
            {
                return Err(ChatError::attachment(format!(
                    "attachment URL '{url}' escapes the upload directory"
                )));
            }

            return Ok(self.upload_dir.join(relative));
        }

        attachment.path.clone().ok_or_else(|| {
            ChatError::attachment("attachment has neither an upload URL nor a local path")
        })
    }
}

impl ImageLoader for FsImageLoader {
    fn load_image<'a>(
        &'a self,
        attachment: &'a Attachment,
    ) -> BoxFuture<'a, Result<ImageInput, ChatError>> {
        Box::pin(async move {
            let path = self.resolve(attachment)?;
            let media_type = media_type_for(&path).ok_or_else(|| {
                ChatError::attachment(format!(
                    "unsupported image type for '{}'",
                    path.display()
                ))
            })?;

            let data = tokio::fs::read(&path).await.map_err(|err| {
                ChatError::attachment(format!("failed to read '{}': {err}", path.display()))
            })?;

            Ok(ImageInput::new(media_type, data))
        })
    }
}

pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
