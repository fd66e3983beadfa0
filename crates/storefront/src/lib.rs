//! Clementine Storefront library.
//!
//! The client side of the Clementine e-commerce application: catalog access,
//! cart management, session handling, and checkout, all driven by the remote
//! REST backend. The backend owns pricing, inventory, and the order
//! lifecycle; this crate is the presentation-facing state layer.
//!
//! # Architecture
//!
//! - [`api`] - REST client for the backend (the only network boundary)
//! - [`store`] - Durable key-value store for cart/session state
//! - [`cart`] - In-memory cart mirrored into the store's active slots
//! - [`session`] - Login/registration/logout with cart reconciliation
//! - [`checkout`] - Three-step checkout wizard and order submission
//! - [`state`] - Wiring of the above into one shared handle

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod store;
