//! In-memory list and directory
//!
//! Same contracts as the REST services: sequential item ids starting at 1,
//! `$select` projection, lookup expansion from the directory and equality
//! filters. Both can be switched offline to exercise failure paths.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared::DirectoryUser;

use crate::query::{Filter, ListQuery};
use crate::{ClientError, ClientResult};

use super::{DirectoryService, ListService, Row};

const ID_FIELD: &str = "Id";

// ============================================================================
// Directory
// ============================================================================

#[derive(Debug, Default)]
struct DirectoryState {
    users: Vec<DirectoryUser>,
    next_id: i64,
    provision_unknown: bool,
}

/// In-memory user directory.
///
/// Cloning yields another handle to the same directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<DirectoryState>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user; its id also advances the id sequence
    pub fn with_user(self, user: DirectoryUser) -> Self {
        self.add_user(user);
        self
    }

    /// Create stub users for unknown email-like identifiers, as `ensureuser`
    /// does for valid accounts that never visited the site
    pub fn with_provisioning(self, enabled: bool) -> Self {
        self.state.lock().provision_unknown = enabled;
        self
    }

    pub fn add_user(&self, user: DirectoryUser) {
        let mut state = self.state.lock();
        state.next_id = state.next_id.max(user.id);
        state.users.push(user);
    }

    pub fn user_by_id(&self, id: i64) -> Option<DirectoryUser> {
        self.state.lock().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn users(&self) -> Vec<DirectoryUser> {
        self.state.lock().users.clone()
    }

    /// Make every call fail with a connection error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn matches(user: &DirectoryUser, identifier: &str) -> bool {
        let account = claims_account(identifier);
        let eq = |v: &Option<String>| {
            v.as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(identifier) || v.eq_ignore_ascii_case(account))
        };
        eq(&user.login_name) || eq(&user.email)
    }
}

/// Account part of a claims login (`i:0#.f|membership|ann@corp.com` -> `ann@corp.com`)
fn claims_account(identifier: &str) -> &str {
    identifier.rsplit('|').next().unwrap_or(identifier)
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    async fn ensure_user(&self, identifier: &str) -> ClientResult<DirectoryUser> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Connection("directory offline".into()));
        }

        let mut state = self.state.lock();
        if let Some(user) = state.users.iter().find(|u| Self::matches(u, identifier)) {
            return Ok(user.clone());
        }

        let account = claims_account(identifier);
        if state.provision_unknown && account.contains('@') {
            state.next_id += 1;
            let title = account.split('@').next().unwrap_or(account).to_string();
            let user = DirectoryUser::new(state.next_id, title)
                .with_email(account)
                .with_login_name(format!("i:0#.f|membership|{}", account));
            state.users.push(user.clone());
            return Ok(user);
        }

        Err(ClientError::NotFound(format!(
            "The specified user {} could not be found.",
            identifier
        )))
    }
}

// ============================================================================
// List
// ============================================================================

#[derive(Debug, Default)]
struct ListState {
    rows: Vec<Row>,
    next_id: i64,
}

/// In-memory list.
///
/// Cloning yields another handle to the same list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryList {
    state: Arc<Mutex<ListState>>,
    directory: Option<InMemoryDirectory>,
    offline: Arc<AtomicBool>,
}

impl InMemoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand user lookups (`<Field>Id` columns) from this directory
    pub fn with_directory(mut self, directory: InMemoryDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Insert a row directly, bypassing the service, and return its id
    pub fn seed(&self, mut fields: Row) -> i64 {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        fields.insert(ID_FIELD.into(), json!(id));
        state.rows.push(fields);
        id
    }

    /// Raw stored rows, without projection or expansion
    pub fn rows(&self) -> Vec<Row> {
        self.state.lock().rows.clone()
    }

    /// Make every call fail with a connection error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> ClientResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Connection("list service offline".into()));
        }
        Ok(())
    }

    fn matches(row: &Row, filter: &Filter) -> bool {
        match filter {
            Filter::Eq { field, value } => match row.get(field) {
                Some(Value::String(s)) => s == value,
                Some(Value::Number(n)) => n.to_string() == *value,
                Some(Value::Bool(b)) => b.to_string() == *value,
                _ => false,
            },
        }
    }

    /// Replace `<field>Id` with the expanded `<field>` object
    fn expand(&self, row: &Row, expand: &[String]) -> Row {
        let mut out = row.clone();
        for field in expand {
            let key = format!("{}Id", field);
            let user = out
                .get(&key)
                .and_then(Value::as_i64)
                .and_then(|id| self.directory.as_ref()?.user_by_id(id));
            let value = match user {
                Some(u) => json!({
                    "Id": u.id,
                    "Title": u.title,
                    "EMail": u.email,
                }),
                None => Value::Null,
            };
            out.insert(field.clone(), value);
        }
        out
    }

    /// Keep only selected columns; `Lookup/Sub` keeps `Sub` inside `Lookup`
    fn project(row: Row, select: &[String]) -> Row {
        if select.is_empty() {
            return row;
        }

        let mut scalar: HashSet<&str> = HashSet::new();
        let mut nested: Vec<(&str, &str)> = Vec::new();
        for field in select {
            match field.split_once('/') {
                Some((lookup, sub)) => nested.push((lookup, sub)),
                None => {
                    scalar.insert(field.as_str());
                }
            }
        }

        let mut out = Row::new();
        for (key, value) in &row {
            if scalar.contains(key.as_str()) {
                out.insert(key.clone(), value.clone());
            }
        }
        for (lookup, sub) in nested {
            let Some(source) = row.get(lookup) else {
                continue;
            };
            match source {
                Value::Object(obj) => {
                    let entry = out
                        .entry(lookup.to_string())
                        .or_insert_with(|| Value::Object(Row::new()));
                    if let (Value::Object(target), Some(v)) = (entry, obj.get(sub)) {
                        target.insert(sub.to_string(), v.clone());
                    }
                }
                _ => {
                    out.insert(lookup.to_string(), Value::Null);
                }
            }
        }
        out
    }
}

#[async_trait]
impl ListService for InMemoryList {
    async fn get_items(&self, query: &ListQuery) -> ClientResult<Vec<Row>> {
        self.check_online()?;

        let rows = self.state.lock().rows.clone();
        let limit = query.top.map(|n| n as usize).unwrap_or(usize::MAX);
        Ok(rows
            .iter()
            .filter(|row| query.filter.as_ref().is_none_or(|f| Self::matches(row, f)))
            .take(limit)
            .map(|row| Self::project(self.expand(row, &query.expand), &query.select))
            .collect())
    }

    async fn add_item(&self, mut fields: Row) -> ClientResult<Row> {
        self.check_online()?;

        fields.remove(ID_FIELD);
        let mut state = self.state.lock();
        state.next_id += 1;
        fields.insert(ID_FIELD.into(), json!(state.next_id));
        state.rows.push(fields.clone());
        Ok(fields)
    }

    async fn update_item(&self, id: i64, fields: Row) -> ClientResult<()> {
        self.check_online()?;

        let mut state = self.state.lock();
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.get(ID_FIELD).and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| ClientError::NotFound(format!("Item {} does not exist", id)))?;
        for (key, value) in fields {
            if key != ID_FIELD {
                row.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        self.check_online()?;

        let mut state = self.state.lock();
        let before = state.rows.len();
        state
            .rows
            .retain(|r| r.get(ID_FIELD).and_then(Value::as_i64) != Some(id));
        if state.rows.len() == before {
            return Err(ClientError::NotFound(format!("Item {} does not exist", id)));
        }
        Ok(())
    }
}
