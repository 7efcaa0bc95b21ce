//! Domain types for the video-generation client.
//!
//! Everything in this crate is pure: no I/O, no clocks except where a
//! caller passes `now` in. The HTTP layer lives in `vidgen-client` and the
//! stateful stores in `vidgen-stores`.

pub mod error;
pub mod filters;
pub mod generation;
pub mod history;
pub mod reconcile;
pub mod resolution;
pub mod status;
pub mod types;
