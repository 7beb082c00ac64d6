//! Unauthenticated read of published resumes.

pub mod handlers;
