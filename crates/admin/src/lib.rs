//! Larder back-office library.
//!
//! The admin binary's handlers, middleware and services, exposed as a
//! library so they can be unit tested.
//!
//! Every API route except login requires an active admin session, and each
//! handler checks the caller's [`PermissionLevel`](larder_core::permission::PermissionLevel)
//! for the module it touches.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
