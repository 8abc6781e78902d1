//! Schema-driven extraction of display-ready structured views from records.
//!
//! A [`domain::Schema`] describes a tree of labelled groups and fields. The
//! [`domain::TreeExtractor`] walks it against a [`domain::RecordAccessor`],
//! prunes empty or excluded nodes and formats field values for display.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
