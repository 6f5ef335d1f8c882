//! Repository implementations for database operations

pub mod blob;

pub use blob::*;
