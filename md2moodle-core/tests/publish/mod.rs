//! File level conversion tests.

mod files;
