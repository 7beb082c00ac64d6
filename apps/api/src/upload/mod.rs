//! Avatar images, stored in the S3 bucket and served from its public URL.

pub mod handlers;
pub mod service;
