//! Service layer — page storage and the numbering rules built on it.
//!
//! DESIGN
//! ======
//! Route handlers call [`pages::PageService`]; it validates requests, then
//! applies ordinal changes through [`renumber::RenumberStrategy`] against a
//! [`page_store::PageStore`] (Postgres or in-memory).

pub mod memory_store;
pub mod page_store;
pub mod pages;
pub mod pg_store;
pub mod renumber;
