//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract consumed by outline persistence.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Inserts hand back generated ids; callers never re-query by value.
//! - Repository APIs return semantic errors (`DocumentNotFound`) in addition
//!   to DB transport errors.

pub mod outline_repo;
