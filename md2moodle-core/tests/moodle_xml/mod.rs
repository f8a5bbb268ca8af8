//! Moodle XML export tests
//!
//! End-to-end conversion of quiz source text into question bank documents.

mod export;
mod structure;
mod wellformed;
