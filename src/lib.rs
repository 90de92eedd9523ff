//! # joinbarber
//!
//! Client for the Join Barber queueing service: welcome/auth screen model,
//! session state, a thin HTTP client for the remote auth API, and local
//! input validators.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend owns authentication and accounts. This crate only calls it,
//! caches the returned session on-device, and decides which screen to show.
//! The `joinbarber` binary drives these modules from a terminal.

pub mod app;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;
