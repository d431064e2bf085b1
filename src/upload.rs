use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use mime::Mime;
use tokio::sync::Mutex;

/// Handle to a file received in a request body.
///
/// The handle carries identity metadata (filename, content type) and a
/// backing resource that has to be released explicitly: either in-memory
/// bytes or a file on disk, optionally owned by the handle (deleted on
/// release). How the bytes got there, and how they are read back, is the
/// business of whoever parsed the request body.
///
/// Handles are cheap to clone; clones share the backing and its release
/// state, so a clone observes a [`close`](Self::close) through any other
/// clone. Closing is idempotent: a second `close` is an `Ok` no-op.
///
/// ```
/// use multidict::UploadFile;
///
/// # tokio_test::block_on(async {
/// let upload = UploadFile::in_memory("hello").with_filename("hello.txt");
/// assert_eq!(upload.filename(), Some("hello.txt"));
/// assert!(!upload.is_closed());
///
/// upload.close().await.unwrap();
/// assert!(upload.is_closed());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct UploadFile {
    filename: Option<String>,
    content_type: Option<Mime>,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    released: AtomicBool,
    backing: Mutex<Backing>,
}

#[derive(Debug)]
enum Backing {
    Memory(Bytes),
    Disk { path: PathBuf, owned: bool },
    Released,
}

impl UploadFile {
    fn with_backing(backing: Backing) -> Self {
        Self {
            filename: None,
            content_type: None,
            shared: Arc::new(Shared {
                released: AtomicBool::new(false),
                backing: Mutex::new(backing),
            }),
        }
    }

    /// An upload kept fully in memory.
    pub fn in_memory(content: impl Into<Bytes>) -> Self {
        Self::with_backing(Backing::Memory(content.into()))
    }

    /// An upload backed by a file at `path` that the handle does not own:
    /// releasing the handle leaves the file in place.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_backing(Backing::Disk {
            path: path.into(),
            owned: false,
        })
    }

    /// An upload backed by a temporary file at `path` that the handle owns:
    /// releasing the handle deletes the file.
    pub fn from_temp_path(path: impl Into<PathBuf>) -> Self {
        Self::with_backing(Backing::Disk {
            path: path.into(),
            owned: true,
        })
    }

    /// Attach the client-provided filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attach the client-provided content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// Returns true once the backing resource has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.released.load(Ordering::Acquire)
    }

    /// Release the backing resource.
    ///
    /// A no-op for in-memory and not-owned disk backings; for an owned disk
    /// backing the file is deleted. On failure the handle stays open so the
    /// release can be retried.
    pub async fn close(&self) -> io::Result<()> {
        let mut backing = self.shared.backing.lock().await;
        match std::mem::replace(&mut *backing, Backing::Released) {
            Backing::Released => {}
            Backing::Memory(content) => drop(content),
            Backing::Disk { path, owned } => {
                if owned {
                    if let Err(err) = tokio::fs::remove_file(&path).await {
                        *backing = Backing::Disk { path, owned };
                        return Err(err);
                    }
                }
            }
        }
        self.shared.released.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_memory_backing_is_idempotent() {
        let upload = UploadFile::in_memory("data");
        assert!(!upload.is_closed());

        upload.close().await.unwrap();
        assert!(upload.is_closed());

        // second close stays Ok
        upload.close().await.unwrap();
        assert!(upload.is_closed());
    }

    #[tokio::test]
    async fn test_close_deletes_owned_temp_file() {
        let (file, path) = tempfile::NamedTempFile::new().unwrap().keep().unwrap();
        drop(file);
        assert!(path.exists());

        let upload = UploadFile::from_temp_path(&path);
        upload.close().await.unwrap();

        assert!(upload.is_closed());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_close_leaves_unowned_file_in_place() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let upload = UploadFile::from_path(file.path());
        upload.close().await.unwrap();

        assert!(upload.is_closed());
        assert!(file.path().exists());
    }

    #[tokio::test]
    async fn test_clones_share_release_state() {
        let upload = UploadFile::in_memory("data");
        let clone = upload.clone();

        upload.close().await.unwrap();
        assert!(clone.is_closed());
    }

    #[tokio::test]
    async fn test_failed_close_can_be_retried() {
        let upload = UploadFile::from_temp_path("/definitely/not/there.bin");

        assert!(upload.close().await.is_err());
        assert!(!upload.is_closed());
        // the backing was not torn down, so the retry fails the same way
        assert!(upload.close().await.is_err());
    }

    #[test]
    fn test_metadata_builders() {
        let upload = UploadFile::in_memory("x")
            .with_filename("cat.png")
            .with_content_type(mime::IMAGE_PNG);
        assert_eq!(upload.filename(), Some("cat.png"));
        assert_eq!(upload.content_type(), Some(&mime::IMAGE_PNG));
    }
}
