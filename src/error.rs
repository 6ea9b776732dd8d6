//! Error taxonomy for library lookup, symbol resolution and render targets

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by bogl
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoglError {
    /// Caller passed something the locator refuses to interpret (e.g. a relative path)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every candidate directory was searched without a loadable match
    #[error("library \"{name}\" not found (searched {searched} directories)")]
    LibraryNotFound { name: String, searched: usize },

    /// An explicit path existed but the OS loader rejected it
    #[error("failed to load {path}: {reason}")]
    LibraryLoad { path: PathBuf, reason: String },

    /// A mandatory entry point is not exported by the driver library
    #[error("missing symbol {symbol} in pass {pass} (broken driver installation?)")]
    SymbolMissing { pass: &'static str, symbol: &'static str },

    /// The driver returned no version string; no rendering context is current
    #[error("no current rendering context; create one before resolving extensions")]
    NoCurrentContext,

    /// Resolution already failed fatally; the stored reason is re-reported
    #[error("GL initialization failed: {0}")]
    InitFailed(String),

    /// enable/disable on a render target whose initialization failed
    #[error("render target is not valid")]
    NotValid,

    /// The driver refused to allocate a GPU object for a render target
    #[error("failed to create {object}: {reason}")]
    TargetCreation { object: &'static str, reason: String },

    /// Framebuffer completeness check failed
    #[error("framebuffer incomplete: {reason} (0x{status:04X})")]
    FramebufferIncomplete { status: u32, reason: &'static str },

    /// A windowing-system call in pbuffer setup failed
    #[error("pbuffer setup failed at {step}")]
    PbufferStep { step: &'static str },

    /// Configuration could not be read or parsed
    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BoglError>;
