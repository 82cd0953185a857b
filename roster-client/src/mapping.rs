//! Row mapping between list items and employee records

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared::{DirectoryUser, EmployeeRecord};

use crate::config::FieldMap;
use crate::service::Row;
use crate::{ClientError, ClientResult};

/// Fully validated add payload, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    /// ISO-8601 timestamp, `None` writes an empty date
    pub date_of_joining: Option<String>,
    /// Resolved directory id of the person reference
    pub person_id: Option<i64>,
}

impl EmployeeDraft {
    /// List item fields for an add request
    pub fn to_row(&self, fields: &FieldMap) -> Row {
        let mut row = Row::new();
        row.insert(fields.name.clone(), json!(self.name));
        row.insert(fields.department.clone(), json!(self.department));
        row.insert(fields.email.clone(), json!(self.email));
        row.insert(fields.employee_id.clone(), json!(self.employee_id));
        row.insert(fields.date_of_joining.clone(), json!(self.date_of_joining));
        if let Some(person_id) = self.person_id {
            row.insert(fields.person_key_field(), json!(person_id));
        }
        row
    }
}

/// Fields for a department-only update
pub fn department_update(fields: &FieldMap, department: &str) -> Row {
    let mut row = Row::new();
    row.insert(fields.department.clone(), json!(department));
    row
}

fn text(row: &Row, field: &str) -> Option<String> {
    match row.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn date(row: &Row, field: &str) -> Option<DateTime<Utc>> {
    let raw = text(row, field)?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(field, value = %raw, error = %e, "Ignoring unparseable date");
            None
        }
    }
}

fn person(row: &Row, fields: &FieldMap) -> Option<DirectoryUser> {
    let Value::Object(lookup) = row.get(&fields.person)? else {
        return None;
    };
    let id = lookup.get(&fields.person_id)?.as_i64()?;
    Some(DirectoryUser {
        id,
        title: text(lookup, &fields.person_title).unwrap_or_default(),
        email: text(lookup, &fields.person_email).filter(|e| !e.is_empty()),
        login_name: None,
    })
}

/// Map a list item into an [`EmployeeRecord`]
pub fn record_from_row(row: &Row, fields: &FieldMap) -> ClientResult<EmployeeRecord> {
    let id = row
        .get(&fields.id)
        .and_then(Value::as_i64)
        .ok_or_else(|| ClientError::InvalidResponse(format!("item without numeric {}", fields.id)))?;

    Ok(EmployeeRecord {
        id,
        name: text(row, &fields.name).unwrap_or_default(),
        department: text(row, &fields.department),
        email: text(row, &fields.email),
        employee_id: text(row, &fields.employee_id),
        date_of_joining: date(row, &fields.date_of_joining),
        person: person(row, fields),
    })
}

/// Map every item, failing on the first malformed one
pub fn records_from_rows(rows: &[Row], fields: &FieldMap) -> ClientResult<Vec<EmployeeRecord>> {
    rows.iter().map(|row| record_from_row(row, fields)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn maps_full_row() {
        let fields = FieldMap::default();
        let record = record_from_row(
            &row(json!({
                "Id": 3,
                "Title": "Ann",
                "Department": "HR",
                "Email": "ann@corp.com",
                "EmployeeID": "EMP-1",
                "DateOfJoining": "2024-03-01T00:00:00Z",
                "PeoplepICKER": { "Id": 9, "Title": "Ann Lee", "EMail": "ann@corp.com" }
            })),
            &fields,
        )
        .unwrap();

        assert_eq!(record.id, 3);
        assert_eq!(record.name, "Ann");
        assert_eq!(record.department.as_deref(), Some("HR"));
        assert_eq!(record.employee_id.as_deref(), Some("EMP-1"));
        assert_eq!(
            record.date_of_joining,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.person,
            Some(DirectoryUser::new(9, "Ann Lee").with_email("ann@corp.com"))
        );
    }

    #[test]
    fn sparse_row_maps_to_empty_optionals() {
        let record = record_from_row(
            &row(json!({ "Id": 4, "PeoplepICKER": null, "DateOfJoining": null })),
            &FieldMap::default(),
        )
        .unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.department, None);
        assert_eq!(record.date_of_joining, None);
        assert_eq!(record.person, None);
    }

    #[test]
    fn bad_date_is_dropped_not_fatal() {
        let record = record_from_row(
            &row(json!({ "Id": 4, "DateOfJoining": "yesterday" })),
            &FieldMap::default(),
        )
        .unwrap();
        assert_eq!(record.date_of_joining, None);
    }

    #[test]
    fn missing_id_is_invalid() {
        assert!(matches!(
            record_from_row(&row(json!({ "Title": "x" })), &FieldMap::default()),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn draft_payload_includes_person_key_only_when_resolved() {
        let fields = FieldMap::default();
        let mut draft = EmployeeDraft {
            employee_id: "EMP-5".into(),
            name: "Ann".into(),
            department: "HR".into(),
            email: "ann@corp.com".into(),
            date_of_joining: None,
            person_id: None,
        };
        let payload = draft.to_row(&fields);
        assert!(!payload.contains_key("PeoplepICKERId"));
        assert_eq!(payload["DateOfJoining"], Value::Null);
        assert_eq!(payload["EmployeeID"], json!("EMP-5"));

        draft.person_id = Some(12);
        assert_eq!(draft.to_row(&fields)["PeoplepICKERId"], json!(12));
    }
}
