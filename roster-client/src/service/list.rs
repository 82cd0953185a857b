//! Employee list boundary

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::http::{NetworkHttpClient, TunnelledMethod};
use crate::query::{odata_string, ListQuery};
use crate::{ClientConfig, ClientError, ClientResult};

use super::unwrap_verbose;

/// One list item as a JSON object keyed by internal column name
pub type Row = Map<String, Value>;

/// Remote list operations
#[async_trait]
pub trait ListService: Send + Sync {
    /// Read items matching the query, in store order
    async fn get_items(&self, query: &ListQuery) -> ClientResult<Vec<Row>>;

    /// Create an item, returning the stored row (including its `Id`)
    async fn add_item(&self, fields: Row) -> ClientResult<Row>;

    /// Merge `fields` into an existing item
    async fn update_item(&self, id: i64, fields: Row) -> ClientResult<()>;

    /// Remove an item
    async fn delete_item(&self, id: i64) -> ClientResult<()>;
}

#[async_trait]
impl<T: ListService + ?Sized> ListService for Arc<T> {
    async fn get_items(&self, query: &ListQuery) -> ClientResult<Vec<Row>> {
        (**self).get_items(query).await
    }

    async fn add_item(&self, fields: Row) -> ClientResult<Row> {
        (**self).add_item(fields).await
    }

    async fn update_item(&self, id: i64, fields: Row) -> ClientResult<()> {
        (**self).update_item(id, fields).await
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        (**self).delete_item(id).await
    }
}

/// List service over the site REST API (`_api/web/lists/getbytitle(...)`)
#[derive(Debug, Clone)]
pub struct SpListService {
    http: NetworkHttpClient,
    list_title: String,
}

impl SpListService {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: NetworkHttpClient::new(config)?,
            list_title: config.list_title.clone(),
        })
    }

    /// Reuse an existing transport
    pub fn with_http(http: NetworkHttpClient, list_title: impl Into<String>) -> Self {
        Self {
            http,
            list_title: list_title.into(),
        }
    }

    fn items_path(&self) -> String {
        format!(
            "_api/web/lists/getbytitle({})/items",
            odata_string(&self.list_title)
        )
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}({})", self.items_path(), id)
    }
}

/// Pull the rows out of a collection response (`value` or `d.results`)
pub(crate) fn rows_from_collection(body: Value) -> ClientResult<Vec<Row>> {
    let items = match unwrap_verbose(body) {
        Value::Object(mut map) => map
            .remove("value")
            .or_else(|| map.remove("results"))
            .ok_or_else(|| ClientError::InvalidResponse("collection without value".into()))?,
        Value::Array(items) => Value::Array(items),
        other => {
            return Err(ClientError::InvalidResponse(format!(
                "expected item collection, got {}",
                other
            )));
        }
    };

    match items {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(ClientError::InvalidResponse(format!(
                    "expected item object, got {}",
                    other
                ))),
            })
            .collect(),
        other => Err(ClientError::InvalidResponse(format!(
            "expected item array, got {}",
            other
        ))),
    }
}

#[async_trait]
impl ListService for SpListService {
    async fn get_items(&self, query: &ListQuery) -> ClientResult<Vec<Row>> {
        let body = self.http.get(&self.items_path(), &query.to_query_pairs()).await?;
        rows_from_collection(body)
    }

    async fn add_item(&self, fields: Row) -> ClientResult<Row> {
        let body = self.http.post(&self.items_path(), &fields).await?;
        match unwrap_verbose(body) {
            Value::Object(row) => Ok(row),
            other => Err(ClientError::InvalidResponse(format!(
                "expected created item, got {}",
                other
            ))),
        }
    }

    async fn update_item(&self, id: i64, fields: Row) -> ClientResult<()> {
        let body = Value::Object(fields);
        self.http
            .post_tunnelled(&self.item_path(id), TunnelledMethod::Merge, Some(&body))
            .await
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        self.http
            .post_tunnelled(&self.item_path(id), TunnelledMethod::Delete, None)
            .await
    }
}
