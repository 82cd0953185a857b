//! Roster Client - employee list client
//!
//! Reads and writes employee records kept in a remote list, resolves the
//! optional person reference against the site's user directory, and exposes
//! a headless board model for front ends.

pub mod board;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod mapping;
pub mod query;
pub mod resolver;
pub mod service;
pub mod store;

pub use board::{EmployeeBoard, EmployeeForm, Outcome, Prompt};
pub use config::{ClientConfig, FieldMap};
pub use error::{ClientError, ClientResult};
pub use http::NetworkHttpClient;
pub use mapping::EmployeeDraft;
pub use query::{Filter, ListQuery};
pub use resolver::{IdentifierCandidate, IdentifierStrategy, PersonResolver, PickerField, Resolution, ResolveFailure};
pub use service::{
    DirectoryService, InMemoryDirectory, InMemoryList, ListService, Row, SpDirectoryService, SpListService,
};
pub use store::{Added, EmployeeStore, Mutation, RecordCache};

// Re-export shared types for convenience
pub use shared::{DirectoryUser, EmployeeRecord, NewEmployee, PickerSelection};
