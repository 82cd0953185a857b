//! People picker selection

use serde::{Deserialize, Deserializer, Serialize};

/// One entry returned by a people picker.
///
/// Loosely typed: which fields are populated depends on the picker
/// configuration (search provider, principal types). Every field is optional
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerSelection {
    /// Claims login, e.g. `i:0#.f|membership|ann@corp.com`
    #[serde(default)]
    pub login_name: Option<String>,
    /// Opaque picker key
    #[serde(default)]
    pub key: Option<String>,
    /// Picker id; some providers emit a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Secondary line, usually the email
    #[serde(default)]
    pub secondary_text: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Primary line, usually the display name
    #[serde(default)]
    pub text: Option<String>,
}

impl PickerSelection {
    pub fn with_login_name(mut self, v: impl Into<String>) -> Self {
        self.login_name = Some(v.into());
        self
    }

    pub fn with_key(mut self, v: impl Into<String>) -> Self {
        self.key = Some(v.into());
        self
    }

    pub fn with_id(mut self, v: impl Into<String>) -> Self {
        self.id = Some(v.into());
        self
    }

    pub fn with_secondary_text(mut self, v: impl Into<String>) -> Self {
        self.secondary_text = Some(v.into());
        self
    }

    pub fn with_email(mut self, v: impl Into<String>) -> Self {
        self.email = Some(v.into());
        self
    }

    pub fn with_text(mut self, v: impl Into<String>) -> Self {
        self.text = Some(v.into());
        self
    }

    /// Best guess at the selected person's email (secondary text first)
    pub fn email_hint(&self) -> Option<&str> {
        non_blank(self.secondary_text.as_deref()).or_else(|| non_blank(self.email.as_deref()))
    }

    /// Short label for "Selected:" summaries
    pub fn label(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
            .or_else(|| non_blank(self.id.as_deref()))
            .or_else(|| non_blank(self.login_name.as_deref()))
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
