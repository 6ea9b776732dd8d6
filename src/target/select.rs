//! Render target backend selection

use log::debug;

use super::TargetRequest;
use crate::constants::{FBO_ATTACH_TEXTURE, FBO_EXTENSIONS};
use crate::resolve::{ExtensionSet, SymbolTable};

/// Strategy behind a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Fbo,
    Pbuffer,
}

/// Picks FBO when the driver advertises it and can attach a 2D texture
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendSelector {
    force_pbuffer: bool,
}

impl BackendSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always choose pbuffer (config `render_target.force_pbuffer`)
    pub fn forcing_pbuffer(force: bool) -> Self {
        Self {
            force_pbuffer: force,
        }
    }

    /// Whether the framebuffer object path is usable at all
    pub fn fbo_available(table: &SymbolTable, extensions: &ExtensionSet) -> bool {
        let advertised = FBO_EXTENSIONS.iter().any(|ext| extensions.contains(ext));
        advertised && table.is_resolved(FBO_ATTACH_TEXTURE)
    }

    pub fn select(
        &self,
        request: &TargetRequest,
        table: &SymbolTable,
        extensions: &ExtensionSet,
    ) -> BackendKind {
        let kind = if !self.force_pbuffer && Self::fbo_available(table, extensions) {
            BackendKind::Fbo
        } else {
            BackendKind::Pbuffer
        };
        debug!(
            "Backend for {}x{} {:?}: {:?}",
            request.width, request.height, request.flags, kind
        );
        kind
    }
}
