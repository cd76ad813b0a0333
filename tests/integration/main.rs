//! Integration tests for sitemap resolution
//!
//! These tests use wiremock to serve sitemaps over real HTTP and drive the
//! blocking resolver from `spawn_blocking`.

mod common;
mod coordinator_tests;
mod resolver_tests;
