//! Resume file analysis against a target job role.

pub mod handlers;
pub mod service;
