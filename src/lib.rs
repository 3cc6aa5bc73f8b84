//! i18nextract - gettext message extraction for Zope-style projects
//!
//! Scans Python code, page templates and ZCML files for translatable
//! messages, merges every occurrence of a message into one catalog entry and
//! writes the result as a gettext template (POT).
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (scanners, catalog, POT writer)
//! - `locales`: Runtime locale settings and catalog discovery
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod locales;
pub mod utils;
