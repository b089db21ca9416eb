use std::path::{Path, PathBuf};

use tracing::{info, warn};

use models::FileId;

use crate::api::ApiClient;
use crate::errors::ConsoleError;

/// A file input that uploads as soon as a file is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileField {
    file_id: Option<FileId>,
    preview: Option<PathBuf>,
    error: Option<String>,
}

impl FileField {
    /// Field pre-filled from a stored record.
    pub fn from_id(id: Option<FileId>) -> Self { Self { file_id: id, ..Self::default() } }

    pub fn file_id(&self) -> Option<&FileId> { self.file_id.as_ref() }

    /// Local file shown while and after uploading.
    pub fn preview(&self) -> Option<&Path> { self.preview.as_deref() }

    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    pub fn clear(&mut self) { *self = Self::default(); }

    pub async fn attach(&mut self, api: &ApiClient, path: impl AsRef<Path>) -> Result<FileId, ConsoleError> {
        let path = path.as_ref();
        self.preview = Some(path.to_path_buf());
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => return Err(self.fail(ConsoleError::Storage(format!("{}: {e}", path.display())))),
        };
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("upload").to_string();
        self.upload(api, bytes, &name).await
    }

    pub async fn attach_bytes(&mut self, api: &ApiClient, file_name: &str, bytes: Vec<u8>) -> Result<FileId, ConsoleError> {
        self.preview = Some(PathBuf::from(file_name));
        self.upload(api, bytes, file_name).await
    }

    async fn upload(&mut self, api: &ApiClient, bytes: Vec<u8>, file_name: &str) -> Result<FileId, ConsoleError> {
        self.error = None;
        match api.upload_file(bytes, file_name).await {
            Ok(id) => {
                info!(file = file_name, %id, "file uploaded");
                self.file_id = Some(id.clone());
                Ok(id)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: ConsoleError) -> ConsoleError {
        warn!(error = %e, "file upload failed");
        self.file_id = None;
        self.preview = None;
        self.error = Some(e.to_string());
        e
    }
}

/// Ids of the slots that finished uploading, in slot order.
pub fn uploaded_ids(fields: &[FileField]) -> Vec<FileId> { fields.iter().filter_map(|f| f.file_id().cloned()).collect() }

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::{SessionStore, StaticAuthenticator};
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn failed_upload_clears_preview_and_id() {
        let session = SessionStore::restore(Arc::new(MemoryStorage::default()), Arc::new(StaticAuthenticator::default())).await;
        let api = ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", session);
        let mut field = FileField::from_id(Some("old".into()));
        let err = field.attach_bytes(&api, "photo.png", vec![1, 2, 3]).await.unwrap_err();
        assert_eq!(err, ConsoleError::MissingCredential);
        assert!(field.file_id().is_none());
        assert!(field.preview().is_none());
        assert_eq!(field.error(), Some("authentication token not found"));
    }

    #[test]
    fn empty_slots_are_dropped() {
        let slots = vec![FileField::from_id(Some("a".into())), FileField::default(), FileField::from_id(Some("b".into()))];
        assert_eq!(uploaded_ids(&slots), vec![FileId::new("a"), FileId::new("b")]);
    }
}
