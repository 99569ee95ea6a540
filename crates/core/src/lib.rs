//! TSMarket Core - Shared types and storefront arithmetic.
//!
//! This crate provides the types and pure computations used across the
//! TSMarket client components:
//! - `client` - REST API client, cart store, session and checkout orchestration
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and arithmetic - no I/O, no storage,
//! no HTTP clients. Everything here is deterministic and cheap to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money helpers, emails, statuses and roles
//! - [`pricing`] - Checkout discount composition (level, top-10, promo)
//! - [`loyalty`] - XP to level mapping and level progress

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod loyalty;
pub mod pricing;
pub mod types;

pub use types::*;
