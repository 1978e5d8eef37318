//! Larder Core - Shared types and domain rules.
//!
//! This crate provides the types and rules used across all Larder components:
//! - `storefront` - Public shopping API
//! - `admin` - Back-office API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains types and pure functions - no database access, no
//! HTTP clients. The only outside state it reads is the process environment,
//! in [`env`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, pricing, emails, and statuses
//! - [`cart`] - Cart lines and login-time cart reconciliation
//! - [`catalog`] - Category/search filtering and sorting of products
//! - [`permission`] - Admin permission levels and gating
//! - [`env`] - Environment variable parsing and secret checks for the binaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod env;
pub mod permission;
pub mod types;

pub use types::*;
