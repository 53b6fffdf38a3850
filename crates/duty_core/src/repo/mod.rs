//! Note store contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the four-operation note store contract.
//! - Keep SQL details out of the list/controller layers.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before touching SQL.
//! - `update`/`delete` report rows affected; zero rows is not an error here.

pub mod note_repo;
