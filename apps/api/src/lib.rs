pub mod ai;
pub mod analyze;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod linkedin;
pub mod llm_client;
pub mod models;
pub mod public;
pub mod resumes;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod upload;

#[cfg(test)]
mod test_support;
