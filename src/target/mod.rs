//! Off-screen render targets
//!
//! Handles:
//! - Backend choice (framebuffer object or windowing-system pbuffer)
//! - Attaching caller textures or owned renderbuffers
//! - Context save/restore and GPU-side copy-back for pbuffers
//!
//! A target is single-threaded: create, enable and disable it on the thread
//! that owns the current GL context. Enable/disable pairs must nest.

pub mod fbo;
pub mod glx;
pub mod pbuffer;
pub mod select;

use std::num::NonZeroU32;

use bitflags::bitflags;
use log::{info, warn};

use crate::error::{BoglError, Result};
use crate::resolve::CapabilityContext;

pub use fbo::{FboRenderTarget, FramebufferApi};
pub use glx::GlxPbufferApi;
pub use pbuffer::{Binding, PbufferApi, PbufferRenderTarget, PbufferVariant};
pub use select::{BackendKind, BackendSelector};

bitflags! {
    /// Requested channels and component type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TargetFlags: u32 {
        const RGB   = 0b0001;
        const RGBA  = 0b0010;
        const DEPTH = 0b0100;
        /// Floating-point components (doubles the requested bit depth)
        const FLOAT = 0b1000;
    }
}

impl TargetFlags {
    pub fn has_color(&self) -> bool {
        self.intersects(Self::RGB | Self::RGBA)
    }

    pub fn has_alpha(&self) -> bool {
        self.contains(Self::RGBA)
    }
}

/// GL texture name owned by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// `None` for 0, which is never a texture
    pub fn new(name: u32) -> Option<Self> {
        NonZeroU32::new(name).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub(crate) fn non_zero(self) -> NonZeroU32 {
        self.0
    }
}

/// Construction parameters of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRequest {
    pub width: u32,
    pub height: u32,
    pub flags: TargetFlags,
    /// Texture to render color into; the target never deletes it
    pub color_texture: Option<TextureId>,
    /// Texture to render depth into; the target never deletes it
    pub depth_texture: Option<TextureId>,
}

impl TargetRequest {
    pub fn new(width: u32, height: u32, flags: TargetFlags) -> Self {
        Self {
            width,
            height,
            flags,
            color_texture: None,
            depth_texture: None,
        }
    }

    pub fn with_color_texture(mut self, texture: TextureId) -> Self {
        self.color_texture = Some(texture);
        self
    }

    pub fn with_depth_texture(mut self, texture: TextureId) -> Self {
        self.depth_texture = Some(texture);
        self
    }

    /// Color channel configured (by flag or by texture)
    pub fn wants_color(&self) -> bool {
        self.flags.has_color() || self.color_texture.is_some()
    }

    /// Alpha wanted; a color texture without an explicit RGB flag keeps alpha
    pub fn wants_alpha(&self) -> bool {
        self.flags.has_alpha()
            || (self.color_texture.is_some() && !self.flags.contains(TargetFlags::RGB))
    }

    /// Depth channel configured (by flag or by texture)
    pub fn wants_depth(&self) -> bool {
        self.flags.contains(TargetFlags::DEPTH) || self.depth_texture.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BoglError::InvalidArgument(format!(
                "render target size {}x{}",
                self.width, self.height
            )));
        }
        if !self.wants_color() && !self.wants_depth() {
            return Err(BoglError::InvalidArgument(
                "render target needs a color or depth channel".into(),
            ));
        }
        Ok(())
    }
}

/// Backend lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    Uninitialized,
    /// Acquiring GPU or windowing-system resources
    Initializing,
    Valid,
    /// Initialization failed; the reason is kept for diagnostics
    Invalid(BoglError),
}

/// One off-screen destination, backed by whichever strategy was selected
pub enum RenderTarget<'a, F: FramebufferApi, P: PbufferApi> {
    Fbo(FboRenderTarget<'a, F>),
    Pbuffer(PbufferRenderTarget<'a, P>),
}

impl<'a, F: FramebufferApi, P: PbufferApi> RenderTarget<'a, F, P> {
    /// Choose a backend and initialize it
    ///
    /// Errors only for a malformed request or when the pbuffer path is
    /// chosen without a windowing-system API. Backend failures produce a
    /// target with `is_valid() == false`.
    pub fn create(
        request: TargetRequest,
        selector: &BackendSelector,
        caps: &CapabilityContext,
        framebuffers: &'a F,
        pbuffers: Option<&'a P>,
    ) -> Result<Self> {
        request.validate()?;

        let kind = selector.select(&request, caps.table(), caps.extensions());
        let target = match kind {
            BackendKind::Fbo => Self::Fbo(FboRenderTarget::new(framebuffers, request)),
            BackendKind::Pbuffer => {
                let Some(api) = pbuffers else {
                    return Err(BoglError::PbufferStep {
                        step: "no windowing-system display",
                    });
                };
                Self::Pbuffer(PbufferRenderTarget::new(api, request))
            }
        };

        match target.state() {
            TargetState::Valid => info!(
                "Render target {}x{} ready ({:?})",
                request.width, request.height, kind
            ),
            TargetState::Invalid(e) => warn!("Render target unusable ({:?}): {}", kind, e),
            TargetState::Uninitialized | TargetState::Initializing => {}
        }
        Ok(target)
    }

    pub fn backend(&self) -> BackendKind {
        match self {
            Self::Fbo(_) => BackendKind::Fbo,
            Self::Pbuffer(_) => BackendKind::Pbuffer,
        }
    }

    pub fn state(&self) -> &TargetState {
        match self {
            Self::Fbo(t) => t.state(),
            Self::Pbuffer(t) => t.state(),
        }
    }

    pub fn is_valid(&self) -> bool {
        *self.state() == TargetState::Valid
    }

    pub fn request(&self) -> &TargetRequest {
        match self {
            Self::Fbo(t) => t.request(),
            Self::Pbuffer(t) => t.request(),
        }
    }

    /// Redirect rendering into this target
    pub fn enable(&mut self) -> Result<()> {
        match self {
            Self::Fbo(t) => t.enable(),
            Self::Pbuffer(t) => t.enable(),
        }
    }

    /// Finish rendering; textures hold the result afterward
    pub fn disable(&mut self) -> Result<()> {
        match self {
            Self::Fbo(t) => t.disable(),
            Self::Pbuffer(t) => t.disable(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(TargetRequest::new(0, 16, TargetFlags::RGBA).validate().is_err());
        assert!(TargetRequest::new(16, 16, TargetFlags::empty()).validate().is_err());
        assert!(TargetRequest::new(16, 16, TargetFlags::DEPTH).validate().is_ok());

        let tex = TextureId::new(3).unwrap();
        let req = TargetRequest::new(16, 16, TargetFlags::empty()).with_color_texture(tex);
        assert!(req.validate().is_ok());
        assert!(req.wants_color());
        assert!(req.wants_alpha());
        assert!(!req.wants_depth());

        let rgb = TargetRequest::new(16, 16, TargetFlags::RGB).with_color_texture(tex);
        assert!(!rgb.wants_alpha());
    }

    #[test]
    fn test_texture_id_zero() {
        assert!(TextureId::new(0).is_none());
        assert_eq!(TextureId::new(9).map(TextureId::get), Some(9));
    }

    #[test]
    fn test_flag_helpers() {
        assert!(TargetFlags::RGB.has_color());
        assert!(!TargetFlags::RGB.has_alpha());
        assert!((TargetFlags::RGBA | TargetFlags::FLOAT).has_alpha());
        assert!(!TargetFlags::DEPTH.has_color());
    }
}
