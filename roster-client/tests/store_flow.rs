// roster-client/tests/store_flow.rs
// Record store against the in-memory list and directory

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use roster_client::{
    ClientError, ClientResult, DirectoryUser, EmployeeStore, FieldMap, InMemoryDirectory, InMemoryList,
    ListQuery, ListService, NewEmployee, PickerSelection, Resolution, ResolveFailure, Row,
};
use serde_json::json;

fn ann() -> DirectoryUser {
    DirectoryUser::new(21, "Ann Lee")
        .with_email("ann@corp.com")
        .with_login_name("i:0#.f|membership|ann@corp.com")
}

fn setup() -> (InMemoryList, EmployeeStore<InMemoryList, InMemoryDirectory>) {
    let directory = InMemoryDirectory::new().with_user(ann());
    let list = InMemoryList::new().with_directory(directory.clone());
    let store = EmployeeStore::new(list.clone(), directory, FieldMap::default());
    (list, store)
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap()
}

fn is_generated_id(id: &str) -> bool {
    id.strip_prefix("EMP-")
        .is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))
}

#[tokio::test]
async fn find_by_business_id_hit_and_miss() {
    let (list, store) = setup();
    list.seed(row(json!({ "Title": "Ann", "Department": "HR", "EmployeeID": "EMP-1" })));

    let found = store.find_by_business_id("EMP-1").await.unwrap().unwrap();
    assert_eq!(found.name, "Ann");
    assert_eq!(found.employee_id.as_deref(), Some("EMP-1"));

    assert_eq!(store.find_by_business_id("EMP-2").await.unwrap(), None);
}

#[tokio::test]
async fn find_by_blank_business_id_is_validation_error() {
    let (list, store) = setup();
    list.set_offline(true);
    let err = store.find_by_business_id("  ").await.unwrap_err();
    assert!(err.is_validation(), "expected validation error, got {err:?}");
}

#[tokio::test]
async fn duplicate_business_ids_return_first_match() {
    let (list, store) = setup();
    list.seed(row(json!({ "Title": "First", "EmployeeID": "EMP-9" })));
    list.seed(row(json!({ "Title": "Second", "EmployeeID": "EMP-9" })));

    let found = store.find_by_business_id("EMP-9").await.unwrap().unwrap();
    assert_eq!(found.name, "First");
}

#[tokio::test]
async fn add_generates_business_id_when_blank() {
    let (_list, store) = setup();
    let added = store
        .add(&NewEmployee::new("Ann", "HR", "ann@corp.com"), None)
        .await
        .unwrap();
    assert!(added.is_fresh());
    assert!(is_generated_id(&added.value.employee_id), "{}", added.value.employee_id);

    let blank = NewEmployee::new("Bob", "Ops", "bob@corp.com").with_employee_id("   ");
    let added = store.add(&blank, None).await.unwrap();
    assert!(is_generated_id(&added.value.employee_id));
}

#[tokio::test]
async fn add_keeps_provided_business_id_and_fields() {
    let (_list, store) = setup();
    let employee = NewEmployee::new("  Ann  ", "HR", "ann@corp.com")
        .with_employee_id("HR-0042")
        .with_date_of_joining(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

    let added = store.add(&employee, None).await.unwrap();
    assert_eq!(added.value.employee_id, "HR-0042");
    assert_eq!(added.value.person, Resolution::Unselected);

    let records = store.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(Some(records[0].id), added.value.id);
    assert_eq!(records[0].name, "Ann");
    assert_eq!(records[0].employee_id.as_deref(), Some("HR-0042"));
    assert_eq!(records[0].joined_on(), NaiveDate::from_ymd_opt(2024, 3, 1));
    assert_eq!(records[0].person, None);
}

#[tokio::test]
async fn add_rejects_invalid_input_without_calling_the_list() {
    let (list, store) = setup();
    list.set_offline(true);

    for employee in [
        NewEmployee::new("", "HR", "ann@corp.com"),
        NewEmployee::new("Ann", "HR", "user@"),
        NewEmployee::new("Ann", "HR", "user.example.com"),
    ] {
        let err = store.add(&employee, None).await.unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err:?}");
    }
}

#[tokio::test]
async fn add_with_resolvable_person_sets_reference() {
    let (list, store) = setup();
    let selection = PickerSelection::default()
        .with_text("Ann Lee")
        .with_login_name("i:0#.f|membership|ann@corp.com");

    let added = store
        .add(&NewEmployee::new("Ann", "HR", "ann@corp.com"), Some(selection))
        .await
        .unwrap();
    assert_eq!(added.value.person.person_id(), Some(21));

    assert_eq!(list.rows()[0]["PeoplepICKERId"], json!(21));
    let record = &store.snapshot()[0];
    assert_eq!(record.person, Some(DirectoryUser::new(21, "Ann Lee").with_email("ann@corp.com")));
}

#[tokio::test]
async fn add_with_unresolvable_person_omits_reference() {
    let (list, store) = setup();
    let selection = PickerSelection::default().with_text("Nobody Known");

    let added = store
        .add(&NewEmployee::new("Zed", "HR", "zed@corp.com"), Some(selection))
        .await
        .unwrap();

    assert!(matches!(
        added.value.person,
        Resolution::Failed { reason: ResolveFailure::Directory { ref identifier, .. }, .. }
            if identifier == "Nobody Known"
    ));
    assert!(!list.rows()[0].contains_key("PeoplepICKERId"));
    assert_eq!(store.snapshot()[0].person, None);
}

#[tokio::test]
async fn add_with_empty_selection_or_offline_directory_still_succeeds() {
    let directory = InMemoryDirectory::new().with_user(ann());
    let list = InMemoryList::new().with_directory(directory.clone());
    let store = EmployeeStore::new(list.clone(), directory.clone(), FieldMap::default());

    let added = store
        .add(&NewEmployee::new("A", "HR", "a@corp.com"), Some(PickerSelection::default()))
        .await
        .unwrap();
    assert!(matches!(
        added.value.person,
        Resolution::Failed { reason: ResolveFailure::NoIdentifier, .. }
    ));

    directory.set_offline(true);
    let selection = PickerSelection::default().with_email("ann@corp.com");
    let added = store
        .add(&NewEmployee::new("B", "HR", "b@corp.com"), Some(selection))
        .await
        .unwrap();
    assert_eq!(added.value.person.person_id(), None);
    assert_eq!(store.snapshot().len(), 2);
}

#[tokio::test]
async fn list_is_idempotent() {
    let (list, store) = setup();
    list.seed(row(json!({ "Title": "Ann", "EmployeeID": "EMP-1", "PeoplepICKERId": 21 })));
    list.seed(row(json!({ "Title": "Bob", "EmployeeID": "EMP-2" })));

    let first = store.list().await.unwrap();
    let second = store.list().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(first[0].person.as_ref().map(|p| p.id), Some(21));
}

#[tokio::test]
async fn update_changes_only_department() {
    let (list, store) = setup();
    let ann_id = list.seed(row(json!({
        "Title": "Ann", "Department": "HR", "Email": "ann@corp.com",
        "EmployeeID": "EMP-1", "DateOfJoining": "2024-03-01T00:00:00Z", "PeoplepICKERId": 21
    })));
    list.seed(row(json!({ "Title": "Bob", "Department": "Ops", "EmployeeID": "EMP-2" })));

    let before = store.list().await.unwrap();
    let mutation = store.update(ann_id, "  Finance ").await.unwrap();
    assert!(mutation.is_fresh());
    let after = store.snapshot();

    let mut expected = before.clone();
    expected[0].department = Some("Finance".into());
    assert_eq!(after, expected);
}

#[tokio::test]
async fn update_rejects_empty_department() {
    let (list, store) = setup();
    let id = list.seed(row(json!({ "Title": "Ann", "Department": "HR" })));
    let err = store.update(id, " ").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(list.rows()[0]["Department"], json!("HR"));
}

#[tokio::test]
async fn delete_removes_record() {
    let (list, store) = setup();
    let id = list.seed(row(json!({ "Title": "Ann" })));
    list.seed(row(json!({ "Title": "Bob" })));

    store.delete(id).await.unwrap();
    let names: Vec<_> = store.snapshot().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Bob"]);

    assert!(matches!(store.delete(id).await, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn failed_list_keeps_previous_snapshot() {
    let (list, store) = setup();
    list.seed(row(json!({ "Title": "Ann" })));
    store.list().await.unwrap();
    assert!(!store.is_stale());

    list.set_offline(true);
    assert!(matches!(store.list().await, Err(ClientError::Connection(_))));
    assert_eq!(store.snapshot().len(), 1);
}

/// Writes go through; reads fail while `fail_reads` is set
struct FlakyReads {
    inner: InMemoryList,
    fail_reads: Arc<AtomicBool>,
}

#[async_trait]
impl ListService for FlakyReads {
    async fn get_items(&self, query: &ListQuery) -> ClientResult<Vec<Row>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClientError::Connection("read timed out".into()));
        }
        self.inner.get_items(query).await
    }

    async fn add_item(&self, fields: Row) -> ClientResult<Row> {
        self.inner.add_item(fields).await
    }

    async fn update_item(&self, id: i64, fields: Row) -> ClientResult<()> {
        self.inner.update_item(id, fields).await
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        self.inner.delete_item(id).await
    }
}

#[tokio::test]
async fn failed_refresh_after_write_is_reported_not_raised() {
    let inner = InMemoryList::new();
    let fail_reads = Arc::new(AtomicBool::new(false));
    let store = EmployeeStore::new(
        FlakyReads { inner: inner.clone(), fail_reads: fail_reads.clone() },
        InMemoryDirectory::new(),
        FieldMap::default(),
    );

    store.add(&NewEmployee::new("Ann", "HR", "ann@corp.com"), None).await.unwrap();
    assert_eq!(store.snapshot().len(), 1);

    fail_reads.store(true, Ordering::SeqCst);
    let mutation = store
        .add(&NewEmployee::new("Bob", "Ops", "bob@corp.com"), None)
        .await
        .unwrap();

    assert!(!mutation.is_fresh());
    assert!(matches!(mutation.reload_error, Some(ClientError::Connection(_))));
    assert_eq!(inner.rows().len(), 2);
    assert_eq!(store.snapshot().len(), 1);
    assert!(store.is_stale());

    fail_reads.store(false, Ordering::SeqCst);
    store.list().await.unwrap();
    assert!(!store.is_stale());
    assert_eq!(store.snapshot().len(), 2);
}

/// Stores the row but answers the write with an empty body
struct EmptyAddResponse {
    inner: InMemoryList,
}

#[async_trait]
impl ListService for EmptyAddResponse {
    async fn get_items(&self, query: &ListQuery) -> ClientResult<Vec<Row>> {
        self.inner.get_items(query).await
    }

    async fn add_item(&self, fields: Row) -> ClientResult<Row> {
        self.inner.add_item(fields).await?;
        Ok(Row::new())
    }

    async fn update_item(&self, id: i64, fields: Row) -> ClientResult<()> {
        self.inner.update_item(id, fields).await
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        self.inner.delete_item(id).await
    }
}

#[tokio::test]
async fn add_with_unreadable_response_still_succeeds_and_refreshes() {
    let inner = InMemoryList::new();
    let store = EmployeeStore::new(
        EmptyAddResponse { inner: inner.clone() },
        InMemoryDirectory::new(),
        FieldMap::default(),
    );

    let mutation = store
        .add(&NewEmployee::new("Ann", "HR", "ann@corp.com").with_employee_id("EMP-7"), None)
        .await
        .unwrap();

    assert_eq!(mutation.value.id, None);
    assert_eq!(mutation.value.employee_id, "EMP-7");
    assert!(mutation.is_fresh());
    assert_eq!(inner.rows().len(), 1);
    assert!(!store.is_stale());
    assert_eq!(store.snapshot().len(), 1);
    assert_eq!(store.snapshot()[0].employee_id.as_deref(), Some("EMP-7"));
}

#[tokio::test]
async fn validate_checks_fields_without_generating_an_id() {
    let (list, store) = setup();
    list.set_offline(true);

    store.validate(&NewEmployee::new("Ann", "HR", "ann@corp.com")).unwrap();
    let err = store.validate(&NewEmployee::new("Ann", "", "ann@corp.com")).unwrap_err();
    assert!(err.is_validation());
    assert!(list.rows().is_empty());
}

#[tokio::test]
async fn custom_person_field_is_written_and_expanded() {
    let directory = InMemoryDirectory::new().with_user(ann());
    let list = InMemoryList::new().with_directory(directory.clone());
    let fields = FieldMap::default().with_person_field("Manager");
    let store = EmployeeStore::new(list.clone(), directory, fields);

    let selection = PickerSelection::default().with_email("ann@corp.com");
    store
        .add(&NewEmployee::new("Bob", "Ops", "bob@corp.com"), Some(selection))
        .await
        .unwrap();

    assert_eq!(list.rows()[0]["ManagerId"], json!(21));
    assert_eq!(store.snapshot()[0].person.as_ref().map(|p| p.id), Some(21));
}
