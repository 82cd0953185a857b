//! User directory boundary

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::DirectoryUser;

use crate::http::NetworkHttpClient;
use crate::{ClientConfig, ClientError, ClientResult};

/// Directory operations needed by the person resolver
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Return the directory entry for `identifier` (login name, email, ...),
    /// provisioning it in the site if the account exists but was never used.
    async fn ensure_user(&self, identifier: &str) -> ClientResult<DirectoryUser>;
}

#[async_trait]
impl<T: DirectoryService + ?Sized> DirectoryService for Arc<T> {
    async fn ensure_user(&self, identifier: &str) -> ClientResult<DirectoryUser> {
        (**self).ensure_user(identifier).await
    }
}

/// Directory over the site's `ensureuser` endpoint
#[derive(Debug, Clone)]
pub struct SpDirectoryService {
    http: NetworkHttpClient,
}

impl SpDirectoryService {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: NetworkHttpClient::new(config)?,
        })
    }

    pub fn with_http(http: NetworkHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DirectoryService for SpDirectoryService {
    async fn ensure_user(&self, identifier: &str) -> ClientResult<DirectoryUser> {
        let body = self
            .http
            .post("_api/web/ensureuser", &json!({ "logonName": identifier }))
            .await?;
        normalize_ensured_user(body)
    }
}

#[derive(Deserialize)]
struct SiteUser {
    #[serde(rename = "Id")]
    id: i64,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Email", alias = "EMail", default)]
    email: Option<String>,
    #[serde(rename = "LoginName", default)]
    login_name: Option<String>,
}

/// The shapes `ensureuser` answers with, depending on OData mode and proxy
#[derive(Deserialize)]
#[serde(untagged)]
enum EnsuredUser {
    Verbose { d: SiteUser },
    Wrapped { data: SiteUser },
    Flat(SiteUser),
}

/// Normalize an `ensureuser` response into a [`DirectoryUser`]
pub fn normalize_ensured_user(body: Value) -> ClientResult<DirectoryUser> {
    let ensured: EnsuredUser = serde_json::from_value(body)
        .map_err(|e| ClientError::InvalidResponse(format!("ensureuser response without Id: {}", e)))?;
    let user = match ensured {
        EnsuredUser::Verbose { d } => d,
        EnsuredUser::Wrapped { data } => data,
        EnsuredUser::Flat(user) => user,
    };
    Ok(DirectoryUser {
        id: user.id,
        title: user.title,
        email: user.email.filter(|e| !e.is_empty()),
        login_name: user.login_name,
    })
}
