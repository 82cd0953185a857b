//! Data models for the employee roster

pub mod employee;
pub mod person;

pub use employee::{DirectoryUser, EmployeeRecord, NewEmployee};
pub use person::PickerSelection;
