/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Prefix of client-generated business identifiers
pub const EMPLOYEE_ID_PREFIX: &str = "EMP-";

/// Generate a business identifier of the form `EMP-<unix-millis>`.
///
/// Not unique: two calls within the same millisecond (or from two clients)
/// produce the same value. The list does not enforce uniqueness either.
pub fn generate_employee_id() -> String {
    format!("{EMPLOYEE_ID_PREFIX}{}", now_millis())
}

/// Return the trimmed value, or a freshly generated identifier when blank.
pub fn employee_id_or_generate(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => generate_employee_id(),
    }
}
