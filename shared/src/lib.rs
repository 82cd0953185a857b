//! Shared types for the employee roster
//!
//! Record shapes, the people-picker selection type, client-side validation
//! and business identifier generation. Used by `roster-client` and by any
//! front end that renders the roster.

pub mod models;
pub mod util;
pub mod validation;

// Re-exports
pub use models::{DirectoryUser, EmployeeRecord, NewEmployee, PickerSelection};
pub use serde::{Deserialize, Serialize};
