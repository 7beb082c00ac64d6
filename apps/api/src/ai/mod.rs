//! AI writing assistant: summary and experience rewrites, skill suggestions,
//! cover letters, ATS scoring and per-section tips.

pub mod handlers;
pub mod prompts;
pub mod service;
