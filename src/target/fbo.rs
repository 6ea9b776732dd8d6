//! Framebuffer object render target
//!
//! Renders into caller textures or owned renderbuffers without a context
//! switch. `disable()` finishes the pipeline so the textures can be sampled
//! right away.

use glow::HasContext;
use log::{debug, info, warn};

use super::{TargetFlags, TargetRequest, TargetState, TextureId};
use crate::error::{BoglError, Result};

/// EXT_framebuffer_object statuses dropped from core GL
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS_EXT: u32 = 0x8CD9;
const FRAMEBUFFER_INCOMPLETE_FORMATS_EXT: u32 = 0x8CDA;

/// GL calls the FBO strategy makes
///
/// Implemented for `glow::Context`; tests substitute a recording mock.
pub trait FramebufferApi {
    type Framebuffer: Copy + std::fmt::Debug;
    type Renderbuffer: Copy + std::fmt::Debug;

    fn gen_framebuffer(&self) -> std::result::Result<Self::Framebuffer, String>;
    fn destroy_framebuffer(&self, framebuffer: Self::Framebuffer);
    /// `None` binds the default framebuffer
    fn bind_target(&self, framebuffer: Option<Self::Framebuffer>);
    fn gen_renderbuffer(&self) -> std::result::Result<Self::Renderbuffer, String>;
    fn allocate_renderbuffer(
        &self,
        renderbuffer: Self::Renderbuffer,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    fn destroy_renderbuffer(&self, renderbuffer: Self::Renderbuffer);
    /// Attach to the bound framebuffer
    fn attach_texture(&self, attachment: u32, texture: TextureId);
    /// Attach to the bound framebuffer
    fn attach_renderbuffer(&self, attachment: u32, renderbuffer: Self::Renderbuffer);
    fn framebuffer_status(&self) -> u32;
    fn finish_rendering(&self);
}

impl FramebufferApi for glow::Context {
    type Framebuffer = glow::Framebuffer;
    type Renderbuffer = glow::Renderbuffer;

    fn gen_framebuffer(&self) -> std::result::Result<glow::Framebuffer, String> {
        unsafe { self.create_framebuffer() }
    }

    fn destroy_framebuffer(&self, framebuffer: glow::Framebuffer) {
        unsafe { self.delete_framebuffer(framebuffer) }
    }

    fn bind_target(&self, framebuffer: Option<glow::Framebuffer>) {
        unsafe { self.bind_framebuffer(glow::FRAMEBUFFER, framebuffer) }
    }

    fn gen_renderbuffer(&self) -> std::result::Result<glow::Renderbuffer, String> {
        unsafe { self.create_renderbuffer() }
    }

    fn allocate_renderbuffer(
        &self,
        renderbuffer: glow::Renderbuffer,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe {
            self.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            self.renderbuffer_storage(glow::RENDERBUFFER, internal_format, width, height);
            self.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    fn destroy_renderbuffer(&self, renderbuffer: glow::Renderbuffer) {
        unsafe { self.delete_renderbuffer(renderbuffer) }
    }

    fn attach_texture(&self, attachment: u32, texture: TextureId) {
        unsafe {
            self.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                attachment,
                glow::TEXTURE_2D,
                Some(glow::NativeTexture(texture.non_zero())),
                0,
            )
        }
    }

    fn attach_renderbuffer(&self, attachment: u32, renderbuffer: glow::Renderbuffer) {
        unsafe {
            self.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                attachment,
                glow::RENDERBUFFER,
                Some(renderbuffer),
            )
        }
    }

    fn framebuffer_status(&self) -> u32 {
        unsafe { self.check_framebuffer_status(glow::FRAMEBUFFER) }
    }

    fn finish_rendering(&self) {
        unsafe { self.finish() }
    }
}

/// Human-readable reason for an incomplete framebuffer
pub fn incomplete_reason(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_UNDEFINED => "undefined",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
        FRAMEBUFFER_INCOMPLETE_DIMENSIONS_EXT => "attachments differ in size",
        FRAMEBUFFER_INCOMPLETE_FORMATS_EXT => "attachments differ in format",
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
        glow::FRAMEBUFFER_UNSUPPORTED => "unsupported format combination",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "inconsistent multisampling",
        glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "incomplete layer targets",
        _ => "unknown status",
    }
}

/// Renderbuffer format for an owned color channel
fn color_format(flags: TargetFlags) -> u32 {
    match (flags.contains(TargetFlags::FLOAT), flags.has_alpha()) {
        (true, true) => glow::RGBA16F,
        (true, false) => glow::RGB16F,
        (false, true) => glow::RGBA8,
        (false, false) => glow::RGB8,
    }
}

/// Framebuffer object strategy
pub struct FboRenderTarget<'a, A: FramebufferApi> {
    api: &'a A,
    request: TargetRequest,
    framebuffer: Option<A::Framebuffer>,
    /// Renderbuffers this target allocated; caller textures never go here
    owned: Vec<A::Renderbuffer>,
    state: TargetState,
}

impl<'a, A: FramebufferApi> FboRenderTarget<'a, A> {
    /// Allocate and attach; a failure leaves the target `Invalid`
    pub fn new(api: &'a A, request: TargetRequest) -> Self {
        let mut target = Self {
            api,
            request,
            framebuffer: None,
            owned: Vec::new(),
            state: TargetState::Uninitialized,
        };

        target.state = TargetState::Initializing;
        target.state = match target.initialize() {
            Ok(()) => TargetState::Valid,
            Err(e) => {
                warn!("FBO render target: {}", e);
                TargetState::Invalid(e)
            }
        };
        target
    }

    fn initialize(&mut self) -> Result<()> {
        let api = self.api;
        let framebuffer = api
            .gen_framebuffer()
            .map_err(|reason| BoglError::TargetCreation {
                object: "framebuffer",
                reason,
            })?;
        self.framebuffer = Some(framebuffer);
        api.bind_target(Some(framebuffer));

        let result = self.attach_channels();
        let result = result.and_then(|()| {
            let status = api.framebuffer_status();
            if status == glow::FRAMEBUFFER_COMPLETE {
                Ok(())
            } else {
                Err(BoglError::FramebufferIncomplete {
                    status,
                    reason: incomplete_reason(status),
                })
            }
        });

        api.bind_target(None);
        result?;

        info!(
            "FBO created: {}x{} ({} owned renderbuffers)",
            self.request.width,
            self.request.height,
            self.owned.len()
        );
        Ok(())
    }

    fn attach_channels(&mut self) -> Result<()> {
        let request = self.request;
        if request.wants_color() {
            match request.color_texture {
                Some(texture) => self.api.attach_texture(glow::COLOR_ATTACHMENT0, texture),
                None => self.attach_owned(glow::COLOR_ATTACHMENT0, color_format(request.flags))?,
            }
        }
        if request.wants_depth() {
            match request.depth_texture {
                Some(texture) => self.api.attach_texture(glow::DEPTH_ATTACHMENT, texture),
                None => self.attach_owned(glow::DEPTH_ATTACHMENT, glow::DEPTH_COMPONENT24)?,
            }
        }
        Ok(())
    }

    fn attach_owned(&mut self, attachment: u32, internal_format: u32) -> Result<()> {
        let renderbuffer = self
            .api
            .gen_renderbuffer()
            .map_err(|reason| BoglError::TargetCreation {
                object: "renderbuffer",
                reason,
            })?;
        self.owned.push(renderbuffer);
        self.api.allocate_renderbuffer(
            renderbuffer,
            internal_format,
            self.request.width as i32,
            self.request.height as i32,
        );
        self.api.attach_renderbuffer(attachment, renderbuffer);
        Ok(())
    }

    pub fn state(&self) -> &TargetState {
        &self.state
    }

    pub fn request(&self) -> &TargetRequest {
        &self.request
    }

    fn valid_framebuffer(&self) -> Result<A::Framebuffer> {
        match (&self.state, self.framebuffer) {
            (TargetState::Valid, Some(framebuffer)) => Ok(framebuffer),
            _ => Err(BoglError::NotValid),
        }
    }

    pub fn enable(&mut self) -> Result<()> {
        let framebuffer = self.valid_framebuffer()?;
        self.api.bind_target(Some(framebuffer));
        Ok(())
    }

    /// Back to the default framebuffer, then wait for the GPU
    pub fn disable(&mut self) -> Result<()> {
        self.valid_framebuffer()?;
        self.api.bind_target(None);
        self.api.finish_rendering();
        Ok(())
    }
}

impl<A: FramebufferApi> Drop for FboRenderTarget<'_, A> {
    fn drop(&mut self) {
        for renderbuffer in self.owned.drain(..) {
            self.api.destroy_renderbuffer(renderbuffer);
        }
        if let Some(framebuffer) = self.framebuffer.take() {
            self.api.destroy_framebuffer(framebuffer);
        }
        debug!("FBO render target destroyed");
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockFramebuffers;
    use super::*;

    #[test]
    fn test_external_color_owned_depth() {
        let api = MockFramebuffers::default();
        let color = TextureId::new(77).unwrap();
        let request = TargetRequest::new(128, 64, TargetFlags::RGBA | TargetFlags::DEPTH)
            .with_color_texture(color);

        let target = FboRenderTarget::new(&api, request);
        assert_eq!(*target.state(), TargetState::Valid);
        drop(target);

        let calls = api.log.calls();
        assert!(calls.contains(&format!("attach_texture 0x{:X} 77", glow::COLOR_ATTACHMENT0)));
        assert!(calls.contains(&format!(
            "storage 2 0x{:X} 128x64",
            glow::DEPTH_COMPONENT24
        )));
        // Owned depth renderbuffer and the framebuffer go away, texture 77 does not
        assert!(calls.contains(&"destroy_renderbuffer 2".to_string()));
        assert!(calls.contains(&"destroy_framebuffer 1".to_string()));
        assert_eq!(api.log.count_prefix("destroy_"), 2);
    }

    #[test]
    fn test_owned_color_format() {
        let api = MockFramebuffers::default();
        let request = TargetRequest::new(8, 8, TargetFlags::RGB | TargetFlags::FLOAT);
        let _target = FboRenderTarget::new(&api, request);
        assert!(api
            .log
            .calls()
            .contains(&format!("storage 2 0x{:X} 8x8", glow::RGB16F)));
        assert_eq!(api.log.count_prefix("gen_renderbuffer"), 1);
    }

    #[test]
    fn test_incomplete_is_invalid() {
        let api = MockFramebuffers::default();
        api.status.set(glow::FRAMEBUFFER_UNSUPPORTED);
        let mut target = FboRenderTarget::new(&api, TargetRequest::new(8, 8, TargetFlags::RGBA));

        assert_eq!(
            *target.state(),
            TargetState::Invalid(BoglError::FramebufferIncomplete {
                status: glow::FRAMEBUFFER_UNSUPPORTED,
                reason: "unsupported format combination",
            })
        );
        assert_eq!(target.enable(), Err(BoglError::NotValid));
        assert_eq!(target.disable(), Err(BoglError::NotValid));
        // Default framebuffer restored after the failed check
        assert_eq!(api.log.calls().last().map(String::as_str), Some("bind 0"));
        drop(target);
        assert!(api.log.calls().contains(&"destroy_framebuffer 1".to_string()));
    }

    #[test]
    fn test_renderbuffer_failure_is_creation_error() {
        let api = MockFramebuffers::default();
        api.no_renderbuffers.set(true);
        let target = FboRenderTarget::new(&api, TargetRequest::new(8, 8, TargetFlags::DEPTH));

        assert_eq!(
            *target.state(),
            TargetState::Invalid(BoglError::TargetCreation {
                object: "renderbuffer",
                reason: "out of memory".into(),
            })
        );
        drop(target);
        assert_eq!(api.log.count_prefix("destroy_renderbuffer"), 0);
        assert!(api.log.calls().contains(&"destroy_framebuffer 1".to_string()));
    }

    #[test]
    fn test_enable_disable_finishes() {
        let api = MockFramebuffers::default();
        let mut target = FboRenderTarget::new(&api, TargetRequest::new(8, 8, TargetFlags::RGBA));
        target.enable().unwrap();
        target.disable().unwrap();

        let calls = api.log.calls();
        let n = calls.len();
        assert_eq!(&calls[n - 3..], &["bind 1", "bind 0", "finish"]);
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(incomplete_reason(0x8CD9), "attachments differ in size");
        assert_eq!(incomplete_reason(0x1234), "unknown status");
    }
}
