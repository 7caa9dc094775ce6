//! Supporting document attachments
//!
//! The engine hands uploaded files to an [`AttachmentStore`] and keeps only
//! the returned [`AttachmentRef`]. Storage is append-only: nothing is ever
//! deleted, and writing the same file name twice in the same scope replaces
//! the earlier content.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use core_kernel::{AttachmentId, ClaimId, DomainPort};

/// Errors raised while storing an attachment
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opaque reference to stored file content (a path or URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef(String);

impl AttachmentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name as sent by the client
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Namespace an attachment is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentScope {
    /// The single document sent with a new claim
    Submission,
    /// Files appended to an existing claim
    Claim(ClaimId),
}

impl AttachmentScope {
    /// Relative directory for the scope, if any
    pub fn directory(&self) -> Option<String> {
        match self {
            AttachmentScope::Submission => None,
            AttachmentScope::Claim(id) => Some(format!("claim_{}", id.as_uuid())),
        }
    }
}

/// A stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttachment {
    pub reference: AttachmentRef,
    /// Sanitized file name the content was stored under
    pub file_name: String,
    pub size: u64,
}

/// Port for attachment storage backends
#[async_trait]
pub trait AttachmentStore: DomainPort {
    /// Stores an upload and returns a reference usable to retrieve it later
    async fn store(
        &self,
        scope: AttachmentScope,
        upload: &Upload,
    ) -> Result<StoredAttachment, AttachmentError>;
}

/// Reduces a client-supplied file name to a bare file name
///
/// Directory parts are dropped, so `../../etc/passwd` becomes `passwd`.
/// Names with nothing usable left are rejected.
pub fn sanitize_file_name(raw: &str) -> Result<String, AttachmentError> {
    // Clients on Windows send backslash separated paths
    let normalized = raw.replace('\\', "/");
    let name = Path::new(&normalized)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .last()
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(AttachmentError::InvalidFileName(raw.to_string()));
    }
    Ok(name.to_string())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> AttachmentError {
    let path = path.display().to_string();
    move |source| AttachmentError::Io { path, source }
}

async fn write_file(path: &Path, content: &[u8]) -> Result<(), AttachmentError> {
    let mut file = fs::File::create(path).await.map_err(io_err(path))?;
    file.write_all(content).await.map_err(io_err(path))?;
    file.sync_all().await.map_err(io_err(path))
}

/// Attachment store backed by a local directory
///
/// Files land in `<root>/<name>` or `<root>/claim_<uuid>/<name>` and are
/// referenced as `<url_prefix>/...` so a static file route can serve them.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalAttachmentStore {
    /// Creates a store rooted at `root`, creating the directory if needed
    pub async fn new(
        root: impl AsRef<Path>,
        url_prefix: impl Into<String>,
    ) -> Result<Self, AttachmentError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(io_err(&root))?;

        info!("Initialized local attachment store at {:?}", root);

        Ok(Self {
            root,
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DomainPort for LocalAttachmentStore {}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn store(
        &self,
        scope: AttachmentScope,
        upload: &Upload,
    ) -> Result<StoredAttachment, AttachmentError> {
        let file_name = sanitize_file_name(&upload.file_name)?;

        let (dir, reference) = match scope.directory() {
            Some(sub) => (
                self.root.join(&sub),
                format!("{}/{}/{}", self.url_prefix, sub, file_name),
            ),
            None => (self.root.clone(), format!("{}/{}", self.url_prefix, file_name)),
        };

        fs::create_dir_all(&dir).await.map_err(io_err(&dir))?;

        let path = dir.join(&file_name);
        debug!("Writing attachment {:?} ({} bytes)", path, upload.content.len());

        // Written beside the target and renamed, so a failed write never
        // replaces an earlier file of the same name
        let partial = dir.join(format!(".{}.{}.part", file_name, AttachmentId::new().as_uuid()));
        if let Err(e) = write_file(&partial, &upload.content).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(io_err(&path)(e));
        }

        Ok(StoredAttachment {
            reference: AttachmentRef::new(reference),
            file_name,
            size: upload.content.len() as u64,
        })
    }
}
