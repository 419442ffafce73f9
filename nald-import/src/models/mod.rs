//! Data models: raw NALD rows and normalized target entities

pub mod entities;
pub mod raw;

pub use entities::*;
