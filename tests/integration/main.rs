//! Integration tests for Sumi-Watch
//!
//! These tests use wiremock to serve pages and exercise full baseline and
//! check cycles over real HTTP.

mod monitor_tests;
