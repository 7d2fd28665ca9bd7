//! Core library for the weekly lesson-log generator.
//!
//! The pipeline is form state → prompt + schema → model call → document
//! assembly → rendering/export. Every module except [`client`] is pure.

pub mod client;
pub mod document;
pub mod export;
pub mod form;
pub mod prompt;
pub mod render;
pub mod schema;
