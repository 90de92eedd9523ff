//! Pure helpers shared by pages and state.

pub mod validation;
