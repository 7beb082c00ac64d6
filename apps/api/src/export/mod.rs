//! Downloadable Markdown or plain-text renditions of a resume.

pub mod handlers;
mod render;

pub use render::{file_name, render, ExportFormat};
