//! Screens driven by the front end.

pub mod welcome;
