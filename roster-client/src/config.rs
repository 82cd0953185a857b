//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | ROSTER_SITE_URL | http://localhost/sites/hr | Site hosting the list |
//! | ROSTER_LIST_TITLE | EmployeeDetails | List title |
//! | ROSTER_ACCESS_TOKEN | (none) | Bearer token |
//! | ROSTER_PERSON_FIELD | PeoplepICKER | Internal name of the person column |
//! | ROSTER_TIMEOUT_SECS | 30 | Request timeout |

use crate::{ClientError, ClientResult};

/// Internal column names of the employee list.
///
/// These differ between tenants (a renamed column keeps its original
/// internal name), so they are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub employee_id: String,
    pub date_of_joining: String,
    /// Person (user lookup) column
    pub person: String,
    /// Sub-fields read from the expanded person lookup
    pub person_id: String,
    pub person_title: String,
    pub person_email: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: "Id".into(),
            name: "Title".into(),
            department: "Department".into(),
            email: "Email".into(),
            employee_id: "EmployeeID".into(),
            date_of_joining: "DateOfJoining".into(),
            person: "PeoplepICKER".into(),
            person_id: "Id".into(),
            person_title: "Title".into(),
            person_email: "EMail".into(),
        }
    }
}

impl FieldMap {
    /// Use a different person column
    pub fn with_person_field(mut self, field: impl Into<String>) -> Self {
        self.person = field.into();
        self
    }

    /// Column written when setting the person reference (`<person>Id`)
    pub fn person_key_field(&self) -> String {
        format!("{}Id", self.person)
    }

    /// `$select` projection: scalar columns plus the expanded person sub-fields
    pub fn projection(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.department.clone(),
            self.email.clone(),
            self.employee_id.clone(),
            self.date_of_joining.clone(),
            format!("{}/{}", self.person, self.person_id),
            format!("{}/{}", self.person, self.person_title),
            format!("{}/{}", self.person, self.person_email),
        ]
    }
}

/// Client configuration for connecting to the list and directory services
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Site URL (e.g., "https://contoso.sharepoint.com/sites/hr")
    pub site_url: String,

    /// Title of the employee list
    pub list_title: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Column names
    pub fields: FieldMap,
}

impl ClientConfig {
    /// Create a new configuration for the given site
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            list_title: "EmployeeDetails".into(),
            token: None,
            timeout: 30,
            fields: FieldMap::default(),
        }
    }

    /// Load configuration from `ROSTER_*` environment variables.
    ///
    /// Unset variables fall back to defaults. See [`Self::from_dotenv`] to
    /// pick up a `.env` file first.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("ROSTER_SITE_URL").unwrap_or_else(|_| "http://localhost/sites/hr".into()),
        );
        if let Ok(title) = std::env::var("ROSTER_LIST_TITLE") {
            config.list_title = title;
        }
        config.token = std::env::var("ROSTER_ACCESS_TOKEN").ok().filter(|t| !t.is_empty());
        if let Ok(field) = std::env::var("ROSTER_PERSON_FIELD") {
            config.fields.person = field;
        }
        config.timeout = std::env::var("ROSTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        config
    }

    /// Load a `.env` file from the working directory (if any), then read
    /// the environment
    pub fn from_dotenv() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_env()
    }

    /// Set the list title
    pub fn with_list_title(mut self, title: impl Into<String>) -> Self {
        self.list_title = title.into();
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Replace the column names
    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    /// Reject configurations that cannot produce a valid request URL
    pub fn validate(&self) -> ClientResult<()> {
        if !(self.site_url.starts_with("http://") || self.site_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "site_url must be an http(s) URL, got '{}'",
                self.site_url
            )));
        }
        if self.list_title.trim().is_empty() {
            return Err(ClientError::Config("list_title must not be empty".into()));
        }
        if self.fields.person.trim().is_empty() {
            return Err(ClientError::Config("person field must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost/sites/hr")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_includes_expanded_person_fields() {
        let fields = FieldMap::default().with_person_field("Manager");
        let projection = fields.projection();
        assert!(projection.contains(&"EmployeeID".to_string()));
        assert!(projection.contains(&"Manager/Id".to_string()));
        assert!(projection.contains(&"Manager/EMail".to_string()));
        assert_eq!(fields.person_key_field(), "ManagerId");
    }

    #[test]
    fn validate_rejects_bad_site_url() {
        assert!(ClientConfig::new("https://contoso.sharepoint.com/sites/hr").validate().is_ok());
        assert!(matches!(
            ClientConfig::new("contoso").validate(),
            Err(ClientError::Config(_))
        ));
        assert!(ClientConfig::default().with_list_title(" ").validate().is_err());
    }
}
