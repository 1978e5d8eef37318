//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration and password login
//! - `catalog` - Cached snapshot of the active catalog
//! - `cart` - Session cart, login-time reconciliation and pricing

pub mod auth;
pub mod cart;
pub mod catalog;
