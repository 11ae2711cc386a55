use crate::config::PipelineConfig;
use crate::foundation::error::{SlidereelError, SlidereelResult};
use std::path::PathBuf;
use tracing::info;

/// Session-scoped persistence for uploaded assets.
///
/// The store writes incoming files under `<uploads>/<session>/<file>` and
/// hands back the deterministic web reference `/uploads/<session>/<file>`,
/// stable for the lifetime of the session's storage. Retention, cleanup,
/// and quota are out of scope.
pub struct UploadStore {
    uploads_dir: PathBuf,
}

impl UploadStore {
    /// Build a store over the configured uploads directory.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            uploads_dir: config.uploads_dir.clone(),
        }
    }

    /// Persist `bytes` as `file_name` under `session_id`'s directory and
    /// return the stable reference path.
    pub async fn store(
        &self,
        bytes: &[u8],
        file_name: &str,
        session_id: &str,
    ) -> SlidereelResult<String> {
        let file_name = sanitize_component(file_name, "file name")?;
        let session_id = sanitize_component(session_id, "session id")?;

        let session_dir = self.uploads_dir.join(session_id);
        tokio::fs::create_dir_all(&session_dir).await.map_err(|e| {
            SlidereelError::resolution(format!(
                "create upload directory '{}': {e}",
                session_dir.display()
            ))
        })?;

        let file_path = session_dir.join(file_name);
        tokio::fs::write(&file_path, bytes).await.map_err(|e| {
            SlidereelError::resolution(format!(
                "write uploaded file '{}': {e}",
                file_path.display()
            ))
        })?;

        info!(path = %file_path.display(), bytes = bytes.len(), "stored upload");
        Ok(format!("/uploads/{session_id}/{file_name}"))
    }
}

/// Validate a single path component of an upload reference.
///
/// Rejects empty values, path separators, and parent traversals so a
/// client-supplied name can never escape the session directory.
fn sanitize_component<'a>(value: &'a str, what: &str) -> SlidereelResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SlidereelError::validation(format!("{what} must be non-empty")));
    }
    if value == "." || value == ".." {
        return Err(SlidereelError::validation(format!(
            "{what} must not be a traversal segment"
        )));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(SlidereelError::validation(format!(
            "{what} must not contain path separators"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn scratch_store() -> (UploadStore, PathBuf) {
        let public = std::env::temp_dir().join(format!(
            "slidereel_upload_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        let config = PipelineConfig::with_public_dir(&public);
        (UploadStore::new(&config), public)
    }

    #[tokio::test]
    async fn store_returns_deterministic_reference() {
        let (store, public) = scratch_store();
        let path = store.store(b"pixels", "photo.jpg", "sess-1").await.unwrap();
        assert_eq!(path, "/uploads/sess-1/photo.jpg");
        let on_disk = std::fs::read(public.join("uploads/sess-1/photo.jpg")).unwrap();
        assert_eq!(on_disk, b"pixels");
    }

    #[tokio::test]
    async fn store_is_stable_across_rewrites() {
        let (store, _public) = scratch_store();
        let a = store.store(b"v1", "photo.jpg", "sess-1").await.unwrap();
        let b = store.store(b"v2", "photo.jpg", "sess-1").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn rejects_empty_fields() {
        let (store, _public) = scratch_store();
        let err = store.store(b"x", "", "sess-1").await.unwrap_err();
        assert!(err.is_client_error());
        let err = store.store(b"x", "a.jpg", "  ").await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn rejects_traversal_components() {
        let (store, _public) = scratch_store();
        assert!(store.store(b"x", "..", "sess-1").await.is_err());
        assert!(store.store(b"x", "a.jpg", "../other").await.is_err());
        assert!(store.store(b"x", "dir/a.jpg", "sess-1").await.is_err());
        assert!(store.store(b"x", "dir\\a.jpg", "sess-1").await.is_err());
    }
}
