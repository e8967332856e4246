//! Shared data types for the civic portal: entities, submission payloads,
//! read models and notices.

pub mod api;
pub mod events;
pub mod models;
