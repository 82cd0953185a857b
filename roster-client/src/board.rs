//! Headless view model of the employee form, list and lookup panel.
//!
//! Holds what a front end binds to (form fields, the loaded list, inline
//! edit and lookup state, busy flags) and turns user actions into store
//! calls. Dialogs go through [`Prompt`]; rendering is left to the caller.

use chrono::NaiveDate;
use shared::{EmployeeRecord, NewEmployee, PickerSelection};

use crate::ClientError;
use crate::resolver::Resolution;
use crate::service::{DirectoryService, ListService};
use crate::store::EmployeeStore;

pub const MSG_LOAD_FAILED: &str = "Failed to load employees. See console for details.";
pub const MSG_ADD_FAILED: &str = "Failed to add employee. See console for details.";
pub const MSG_UPDATE_FAILED: &str = "Failed to update employee. See console for details.";
pub const MSG_DELETE_FAILED: &str = "Failed to delete employee. See console for details.";
pub const MSG_LOOKUP_FAILED: &str = "Lookup failed. See console for details.";
pub const MSG_NOT_FOUND: &str = "No employee found with that EmployeeID.";
pub const MSG_CONFIRM_DELETE: &str = "Are you sure you want to delete this employee?";

/// Blocking dialogs
pub trait Prompt {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// What a board action ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Rejected by validation before any request
    Invalid,
    /// The store call failed; state was kept for a retry
    Failed,
    /// The user declined, or there was nothing to do
    Cancelled,
    /// Another save is in progress
    Busy,
    NotFound,
}

/// Add form fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeForm {
    /// Leave blank to auto-generate
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub date_of_joining: Option<NaiveDate>,
    pub selected_people: Vec<PickerSelection>,
}

impl EmployeeForm {
    pub fn to_new_employee(&self) -> NewEmployee {
        NewEmployee {
            employee_id: Some(self.employee_id.clone()).filter(|v| !v.trim().is_empty()),
            name: self.name.clone(),
            department: self.department.clone(),
            email: self.email.clone(),
            date_of_joining: self.date_of_joining,
        }
    }

    /// The picker is single-select; only the first entry counts
    pub fn selection(&self) -> Option<PickerSelection> {
        self.selected_people.first().cloned()
    }

    /// `Selected:` line for the picker
    pub fn selected_summary(&self) -> String {
        self.selected_people
            .iter()
            .enumerate()
            .map(|(i, p)| p.label().map(str::to_string).unwrap_or_else(|| format!("user{}", i)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Department being edited inline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: i64,
    pub department: String,
}

pub struct EmployeeBoard<L, D, P> {
    store: EmployeeStore<L, D>,
    prompt: P,
    form: EmployeeForm,
    employees: Vec<EmployeeRecord>,
    loading: bool,
    saving: bool,
    editing: Option<EditState>,
    lookup_id: String,
    lookup_result: Option<EmployeeRecord>,
    last_person: Resolution,
}

impl<L: ListService, D: DirectoryService, P: Prompt> EmployeeBoard<L, D, P> {
    pub fn new(store: EmployeeStore<L, D>, prompt: P) -> Self {
        Self {
            store,
            prompt,
            form: EmployeeForm::default(),
            employees: Vec::new(),
            loading: false,
            saving: false,
            editing: None,
            lookup_id: String::new(),
            lookup_result: None,
            last_person: Resolution::Unselected,
        }
    }

    // ========== Accessors ==========

    pub fn store(&self) -> &EmployeeStore<L, D> {
        &self.store
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EmployeeForm {
        &mut self.form
    }

    pub fn employees(&self) -> &[EmployeeRecord] {
        &self.employees
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn lookup_id(&self) -> &str {
        &self.lookup_id
    }

    pub fn lookup_result(&self) -> Option<&EmployeeRecord> {
        self.lookup_result.as_ref()
    }

    /// Person field state of the last add
    pub fn last_person(&self) -> &Resolution {
        &self.last_person
    }

    // ========== List ==========

    /// Reload the list; on failure the current rows stay on screen
    pub async fn load(&mut self) -> Outcome {
        self.loading = true;
        let outcome = match self.store.list().await {
            Ok(records) => {
                self.employees = records;
                Outcome::Done
            }
            Err(_) => {
                self.prompt.alert(MSG_LOAD_FAILED);
                Outcome::Failed
            }
        };
        self.loading = false;
        outcome
    }

    /// Take the refreshed snapshot, or report that the refresh failed
    fn apply_reload(&mut self, reload_error: Option<ClientError>) {
        match reload_error {
            None => self.employees = self.store.snapshot(),
            Some(_) => self.prompt.alert(MSG_LOAD_FAILED),
        }
    }

    // ========== Add ==========

    /// Picker change: keep the selection and prefill empty name/email
    pub fn select_people(&mut self, items: Vec<PickerSelection>) {
        if let Some(first) = items.first() {
            if self.form.name.is_empty()
                && let Some(text) = first.text.as_deref()
            {
                self.form.name = text.to_string();
            }
            if self.form.email.is_empty()
                && let Some(email) = first.email_hint()
            {
                self.form.email = email.to_string();
            }
        }
        tracing::debug!(count = items.len(), "People picker selection changed");
        self.form.selected_people = items;
    }

    pub fn reset_form(&mut self) {
        self.form = EmployeeForm::default();
    }

    /// Submit the add form.
    ///
    /// Success clears the form; any failure keeps it for a retry.
    pub async fn add(&mut self) -> Outcome {
        if self.saving {
            return Outcome::Busy;
        }

        let draft = match self.store.prepare(&self.form.to_new_employee()) {
            Ok(draft) => draft,
            Err(e) => {
                self.prompt.alert(&e.to_string());
                return Outcome::Invalid;
            }
        };

        self.saving = true;
        let result = self.store.add_draft(draft, self.form.selection()).await;
        self.saving = false;

        match result {
            Ok(mutation) => {
                self.last_person = mutation.value.person;
                self.reset_form();
                self.apply_reload(mutation.reload_error);
                Outcome::Done
            }
            Err(_) => {
                self.prompt.alert(MSG_ADD_FAILED);
                Outcome::Failed
            }
        }
    }

    // ========== Edit ==========

    /// Enter inline edit for a loaded row
    pub fn start_edit(&mut self, id: i64) -> Outcome {
        match self.employees.iter().find(|e| e.id == id) {
            Some(record) => {
                self.editing = Some(EditState {
                    id,
                    department: record.department.clone().unwrap_or_default(),
                });
                Outcome::Done
            }
            None => Outcome::NotFound,
        }
    }

    pub fn set_edit_department(&mut self, department: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.department = department.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the inline edit; the draft survives a failure
    pub async fn save_edit(&mut self) -> Outcome {
        if self.saving {
            return Outcome::Busy;
        }
        let Some(edit) = self.editing.clone() else {
            return Outcome::Cancelled;
        };

        self.saving = true;
        let result = self.store.update(edit.id, &edit.department).await;
        self.saving = false;

        match result {
            Ok(mutation) => {
                self.editing = None;
                self.apply_reload(mutation.reload_error);
                Outcome::Done
            }
            Err(e) if e.is_validation() => {
                self.prompt.alert(&e.to_string());
                Outcome::Invalid
            }
            Err(_) => {
                self.prompt.alert(MSG_UPDATE_FAILED);
                Outcome::Failed
            }
        }
    }

    // ========== Delete ==========

    pub async fn delete(&mut self, id: i64) -> Outcome {
        if self.saving {
            return Outcome::Busy;
        }
        if !self.prompt.confirm(MSG_CONFIRM_DELETE) {
            return Outcome::Cancelled;
        }

        self.saving = true;
        let result = self.store.delete(id).await;
        self.saving = false;

        match result {
            Ok(mutation) => {
                self.apply_reload(mutation.reload_error);
                Outcome::Done
            }
            Err(_) => {
                self.prompt.alert(MSG_DELETE_FAILED);
                Outcome::Failed
            }
        }
    }

    // ========== Lookup ==========

    pub fn set_lookup_id(&mut self, value: impl Into<String>) {
        self.lookup_id = value.into();
    }

    pub fn clear_lookup(&mut self) {
        self.lookup_id.clear();
        self.lookup_result = None;
    }

    /// Fetch the record whose business identifier is the lookup value
    pub async fn lookup(&mut self) -> Outcome {
        if self.lookup_id.trim().is_empty() {
            self.prompt.alert(shared::validation::MSG_EMPTY_LOOKUP);
            return Outcome::Invalid;
        }

        self.loading = true;
        self.lookup_result = None;
        let result = self.store.find_by_business_id(&self.lookup_id).await;
        self.loading = false;

        match result {
            Ok(Some(record)) => {
                self.lookup_result = Some(record);
                Outcome::Done
            }
            Ok(None) => {
                self.prompt.alert(MSG_NOT_FOUND);
                Outcome::NotFound
            }
            Err(_) => {
                self.prompt.alert(MSG_LOOKUP_FAILED);
                Outcome::Failed
            }
        }
    }
}
