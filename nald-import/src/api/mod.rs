//! Admin HTTP surface: health, manual triggers, progress events

pub mod health;
pub mod import;
pub mod sse;

pub use health::health_routes;
pub use import::import_routes;
pub use sse::event_stream;
