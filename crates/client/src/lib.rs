//! HTTP client for the video-generation backend.
//!
//! [`api::VideoApi`] wraps every endpoint the client uses with typed
//! request/response DTOs ([`dto`]). Stores talk to it through the
//! [`backend::VideoBackend`] trait so they can be driven by a fake in
//! tests. [`config::ClientConfig`] loads connection settings from the
//! environment.

pub mod api;
pub mod backend;
pub mod config;
pub mod dto;

pub use api::{VideoApi, VideoApiError};
pub use backend::VideoBackend;
pub use config::{ClientConfig, ConfigError};
