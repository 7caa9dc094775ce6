//! Repository implementations for domain entities
//!
//! Repositories encapsulate SQL queries and map between database rows and
//! plain row types. Queries are checked at runtime (`query_as` with
//! `FromRow`) so the crate builds without a live database.

pub mod claims;
pub mod users;

pub use claims::ClaimsRepository;
pub use users::UsersRepository;
