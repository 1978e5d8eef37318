//! Larder Storefront library.
//!
//! The public shopping API, exposed as a library so the binary and tests
//! share one set of modules.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
