//! Employee record store
//!
//! Field-mapped reads and writes against the employee list. The store keeps
//! the last authoritative snapshot of the list. Every successful mutation
//! invalidates it and performs exactly one refresh, so callers never patch
//! local state themselves.

use parking_lot::RwLock;
use shared::util::employee_id_or_generate;
use shared::validation::{self, MSG_EMPTY_DEPARTMENT, MSG_EMPTY_LOOKUP};
use shared::{EmployeeRecord, NewEmployee, PickerSelection};

use crate::config::FieldMap;
use crate::http::NetworkHttpClient;
use crate::mapping::{self, EmployeeDraft};
use crate::query::{Filter, ListQuery};
use crate::resolver::{PersonResolver, Resolution};
use crate::service::{DirectoryService, ListService, SpDirectoryService, SpListService};
use crate::{ClientConfig, ClientError, ClientResult};

/// Last loaded list contents
#[derive(Debug, Clone, Default)]
pub struct RecordCache {
    records: Vec<EmployeeRecord>,
    loaded: bool,
    stale: bool,
}

impl RecordCache {
    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    /// Whether a load has ever succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the list changed (or may have) since the snapshot was taken
    pub fn is_stale(&self) -> bool {
        self.stale || !self.loaded
    }

    fn replace(&mut self, records: Vec<EmployeeRecord>) {
        self.records = records;
        self.loaded = true;
        self.stale = false;
    }
}

/// Outcome of a write plus the refresh that followed it.
///
/// A failed refresh does not undo the write, so it is reported here
/// rather than as an error of the mutation.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub reload_error: Option<ClientError>,
}

impl<T> Mutation<T> {
    /// Whether the snapshot reflects this write
    pub fn is_fresh(&self) -> bool {
        self.reload_error.is_none()
    }
}

/// Result of a successful add
#[derive(Debug, Clone, PartialEq)]
pub struct Added {
    /// Store-assigned item id, `None` when the write response did not carry one
    pub id: Option<i64>,
    /// Business identifier as written (generated when left blank)
    pub employee_id: String,
    /// How the person field ended up
    pub person: Resolution,
}

/// Record store over a list service and a directory
#[derive(Debug)]
pub struct EmployeeStore<L, D> {
    list: L,
    resolver: PersonResolver<D>,
    fields: FieldMap,
    cache: RwLock<RecordCache>,
}

impl EmployeeStore<SpListService, SpDirectoryService> {
    /// Store over the site REST API described by `config`
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(config)?;
        tracing::info!(site = http.site_url(), list = %config.list_title, "Employee store configured");
        Ok(Self::new(
            SpListService::with_http(http.clone(), config.list_title.clone()),
            SpDirectoryService::with_http(http),
            config.fields.clone(),
        ))
    }
}

impl<L: ListService, D: DirectoryService> EmployeeStore<L, D> {
    pub fn new(list: L, directory: D, fields: FieldMap) -> Self {
        Self::with_resolver(list, PersonResolver::new(directory), fields)
    }

    pub fn with_resolver(list: L, resolver: PersonResolver<D>, fields: FieldMap) -> Self {
        Self {
            list,
            resolver,
            fields,
            cache: RwLock::new(RecordCache::default()),
        }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn resolver(&self) -> &PersonResolver<D> {
        &self.resolver
    }

    pub fn list_service(&self) -> &L {
        &self.list
    }

    /// Projection plus person expansion, shared by every read
    fn base_query(&self) -> ListQuery {
        ListQuery::new()
            .select(self.fields.projection())
            .expand(self.fields.person.clone())
    }

    // ========== Cache ==========

    /// Copy of the last snapshot, without touching the network
    pub fn snapshot(&self) -> Vec<EmployeeRecord> {
        self.cache.read().records.clone()
    }

    pub fn is_stale(&self) -> bool {
        self.cache.read().is_stale()
    }

    /// Mark the snapshot as out of date
    pub fn invalidate(&self) {
        self.cache.write().stale = true;
    }

    // ========== Reads ==========

    /// Load every record, replacing the snapshot.
    ///
    /// On failure the previous snapshot is left as it was.
    pub async fn list(&self) -> ClientResult<Vec<EmployeeRecord>> {
        let result = async {
            let rows = self.list.get_items(&self.base_query()).await?;
            mapping::records_from_rows(&rows, &self.fields)
        }
        .await;

        match result {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Loaded employees");
                self.cache.write().replace(records.clone());
                Ok(records)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading employees");
                Err(e)
            }
        }
    }

    /// Look up a record by business identifier.
    ///
    /// Identifiers are not unique; the first match in store order is
    /// returned. No match is `Ok(None)`.
    pub async fn find_by_business_id(&self, employee_id: &str) -> ClientResult<Option<EmployeeRecord>> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(ClientError::validation(MSG_EMPTY_LOOKUP));
        }

        let query = self
            .base_query()
            .filter(Filter::eq(self.fields.employee_id.clone(), employee_id))
            .top(1);
        let rows = self.list.get_items(&query).await.inspect_err(|e| {
            tracing::error!(employee_id, error = %e, "Error fetching by business id");
        })?;

        rows.first()
            .map(|row| mapping::record_from_row(row, &self.fields))
            .transpose()
    }

    // ========== Writes ==========

    /// Invalidate, then refresh once
    async fn after_mutation<T>(&self, value: T) -> Mutation<T> {
        self.invalidate();
        let reload_error = self.list().await.err();
        Mutation { value, reload_error }
    }

    /// Check the required fields and email shape. Makes no network call.
    pub fn validate(&self, employee: &NewEmployee) -> ClientResult<()> {
        validation::validate_new_employee(&employee.name, &employee.department, &employee.email)
            .map_err(ClientError::validation)
    }

    /// Validate the add form and fill in the business identifier.
    ///
    /// Makes no network call.
    pub fn prepare(&self, employee: &NewEmployee) -> ClientResult<EmployeeDraft> {
        self.validate(employee)?;

        Ok(EmployeeDraft {
            employee_id: employee_id_or_generate(employee.employee_id.as_deref()),
            name: employee.name.trim().to_string(),
            department: employee.department.trim().to_string(),
            email: employee.email.trim().to_string(),
            date_of_joining: employee.date_of_joining_iso(),
            person_id: None,
        })
    }

    /// Add a record.
    ///
    /// The person selection is resolved first; if that fails the record is
    /// written without a person reference.
    pub async fn add(
        &self,
        employee: &NewEmployee,
        selection: Option<PickerSelection>,
    ) -> ClientResult<Mutation<Added>> {
        let draft = self.prepare(employee)?;
        self.add_draft(draft, selection).await
    }

    /// Add an already prepared record.
    ///
    /// Once the list accepts the write this never returns `Err`; an
    /// unreadable write response only leaves [`Added::id`] empty.
    pub async fn add_draft(
        &self,
        mut draft: EmployeeDraft,
        selection: Option<PickerSelection>,
    ) -> ClientResult<Mutation<Added>> {
        let person = self
            .resolver
            .resolve_selection(Resolution::from_selection(selection))
            .await;
        draft.person_id = person.person_id();

        let created = self
            .list
            .add_item(draft.to_row(&self.fields))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error adding employee"))?;
        let id = match mapping::record_from_row(&created, &self.fields) {
            Ok(record) => Some(record.id),
            Err(e) => {
                tracing::warn!(employee_id = %draft.employee_id, error = %e, "Employee added, response unreadable");
                None
            }
        };
        tracing::info!(id = ?id, employee_id = %draft.employee_id, "Employee added");

        Ok(self
            .after_mutation(Added {
                id,
                employee_id: draft.employee_id,
                person,
            })
            .await)
    }

    /// Change the department of record `id`; no other field is sent.
    pub async fn update(&self, id: i64, department: &str) -> ClientResult<Mutation<()>> {
        let department = department.trim();
        if department.is_empty() {
            return Err(ClientError::validation(MSG_EMPTY_DEPARTMENT));
        }

        self.list
            .update_item(id, mapping::department_update(&self.fields, department))
            .await
            .inspect_err(|e| tracing::error!(id, error = %e, "Error updating employee"))?;
        tracing::info!(id, "Employee updated");

        Ok(self.after_mutation(()).await)
    }

    /// Remove record `id`. Confirmation is the caller's job.
    pub async fn delete(&self, id: i64) -> ClientResult<Mutation<()>> {
        self.list
            .delete_item(id)
            .await
            .inspect_err(|e| tracing::error!(id, error = %e, "Error deleting employee"))?;
        tracing::info!(id, "Employee deleted");

        Ok(self.after_mutation(()).await)
    }
}
