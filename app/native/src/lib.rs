//! Zonesnap - zone detection and window snapping for desktop compositors.
//!
//! The library holds the snapping engine ([`modules::zoning`]), its
//! configuration layer and the CLI used to inspect zones and replay
//! scenarios. A compositor integration implements the collaborator traits in
//! [`modules::zoning::compositor`] and drives an
//! [`modules::zoning::EngineActor`].

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod modules;
pub mod schema;

pub use error::ZoneSnapError;
