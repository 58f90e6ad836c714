//! Repository implementations
//!
//! Repositories encapsulate the SQL and map rows to plain row structs; the
//! adapters translate those into domain types.

pub mod organization;
pub mod user;

pub use organization::{OrganizationRepository, OrganizationRow};
pub use user::UserRepository;
