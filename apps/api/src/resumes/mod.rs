//! Owner-scoped CRUD over resume documents.

pub mod handlers;
