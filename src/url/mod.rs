//! URL handling module for Sitemap-Resolver
//!
//! This module provides site root identity and the sitemap directory
//! scoping rule.

mod root;
mod scope;

pub use root::UrlRoot;
pub use scope::{location_directory, ScopeFilter};
