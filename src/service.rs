use std::sync::Arc;

use crate::error::ApiError;
use crate::models::Document;
use crate::storage::DocumentStorage;
use crate::user_models::{Role, User};
use crate::user_storage::UserStorage;

/// The service layer over both stores. Every operation is one stateless
/// request/response step; the store handles are injected at construction.
pub struct AccessService {
    identity: Arc<UserStorage>,
    documents: Arc<DocumentStorage>,
}

impl AccessService {
    pub fn new(identity: Arc<UserStorage>, documents: Arc<DocumentStorage>) -> Self {
        Self {
            identity,
            documents,
        }
    }

    pub async fn register(
        &self,
        username: String,
        credential: String,
        role: Role,
    ) -> Result<User, ApiError> {
        let user = User::new(username, credential, role);
        self.identity.register(user).await
    }

    /// A store miss becomes InvalidCredentials: the caller cannot tell an
    /// unknown username from a wrong credential.
    pub async fn login(&self, username: &str, credential: &str) -> Result<User, ApiError> {
        self.identity
            .find_by_credentials(username, credential)
            .await?
            .ok_or(ApiError::InvalidCredentials)
    }

    /// The uploader string is stored as-is; nothing checks that it names an
    /// existing user.
    pub async fn upload_document(
        &self,
        title: String,
        url: String,
        summary: String,
        uploaded_by: String,
    ) -> Result<Document, ApiError> {
        let document = Document::new(title, url, summary, uploaded_by);
        Ok(self.documents.add_document(document).await?)
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        Ok(self.documents.list_all().await?)
    }

    pub async fn get_document(&self, id: &str) -> Result<Document, ApiError> {
        self.documents
            .get_by_id(id)
            .await?
            .ok_or(ApiError::NotFound)
    }
}
