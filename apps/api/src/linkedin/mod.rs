//! LinkedIn profile import: a pasted export becomes an ordinary resume edit.

pub mod handlers;
pub mod service;
