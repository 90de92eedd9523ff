//! Client-side state: the persisted store and the live session.
//!
//! DESIGN
//! ======
//! `storage` owns the on-device entries, `session` owns the in-memory user and
//! loading flag and is the only writer of both.

pub mod session;
pub mod storage;
