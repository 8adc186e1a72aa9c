use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::user_models::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    // Plain string copy of a username, not a checked reference. The uploader
    // may no longer exist as a user.
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: String, url: String, summary: String, uploaded_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            url,
            summary,
            uploaded_by,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub credential: String,
    pub role: String,
}

impl RegisterRequest {
    /// Checks the fields and resolves the role string. An omitted or unknown
    /// role is a validation failure, never a defaulted role.
    pub fn validate(&self) -> Result<Role, ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Validation("username cannot be empty".to_string()));
        }
        if self.credential.trim().is_empty() {
            return Err(ApiError::Validation("credential cannot be empty".to_string()));
        }
        self.role.parse().map_err(ApiError::Validation)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub credential: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Validation("username cannot be empty".to_string()));
        }
        if self.credential.trim().is_empty() {
            return Err(ApiError::Validation("credential cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentRequest {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub uploaded_by: String,
}

impl UploadDocumentRequest {
    /// The uploader string is accepted as-is; it is never checked against the
    /// identity store.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadDocumentResponse {
    pub message: String,
    pub document: Document,
}
