//! Employee Model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user entry in the directory (people lookup target)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Directory-assigned id, used as the lookup foreign key
    pub id: i64,
    /// Display name
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Claims-encoded login, when the directory reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_name: Option<String>,
}

impl DirectoryUser {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            email: None,
            login_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_login_name(mut self, login_name: impl Into<String>) -> Self {
        self.login_name = Some(login_name.into());
        self
    }
}

/// Employee row as read back from the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Store-assigned item id
    pub id: i64,
    /// Display name (the list's title column)
    pub name: String,
    pub department: Option<String>,
    pub email: Option<String>,
    /// Business identifier, e.g. `EMP-1700000000000`. Not unique.
    pub employee_id: Option<String>,
    pub date_of_joining: Option<DateTime<Utc>>,
    /// Expanded person reference
    pub person: Option<DirectoryUser>,
}

impl EmployeeRecord {
    /// Calendar date of joining, if set
    pub fn joined_on(&self) -> Option<NaiveDate> {
        self.date_of_joining.map(|d| d.date_naive())
    }

    /// Person column as `Name (email)`, or `-` when absent
    pub fn person_label(&self) -> String {
        match &self.person {
            Some(p) => format!("{} ({})", p.title, p.email.as_deref().unwrap_or_default()),
            None => "-".to_string(),
        }
    }
}

/// Create employee payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Business identifier; generated when blank
    pub employee_id: Option<String>,
    pub name: String,
    pub department: String,
    pub email: String,
    pub date_of_joining: Option<NaiveDate>,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        department: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: None,
            name: name.into(),
            department: department.into(),
            email: email.into(),
            date_of_joining: None,
        }
    }

    pub fn with_employee_id(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    pub fn with_date_of_joining(mut self, date: NaiveDate) -> Self {
        self.date_of_joining = Some(date);
        self
    }

    /// Join date as the ISO-8601 UTC timestamp the list stores (midnight UTC)
    pub fn date_of_joining_iso(&self) -> Option<String> {
        self.date_of_joining
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}
