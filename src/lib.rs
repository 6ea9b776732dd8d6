//! bogl - dynamic OpenGL entry-point resolution and off-screen render targets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  LibraryLocator (env, ld.so.conf, dirs)  │
//! │                   ↓                      │
//! │  CapabilityResolver                      │
//! │    core passes → extension passes →      │
//! │    alias binding → CapabilityContext     │
//! │                   ↓                      │
//! │  BackendSelector → RenderTarget          │
//! │                    (FBO | PBuffer)       │
//! └──────────────────────────────────────────┘
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod target;

pub use error::{BoglError, Result};
