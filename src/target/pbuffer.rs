//! Windowing-system pbuffer render target
//!
//! Fallback for drivers without framebuffer objects. Rendering happens in a
//! separate drawable and context sharing objects with the application's
//! context; `disable()` copies the result into the caller's textures before
//! switching back.

use std::fmt::Debug;

use log::{debug, info, warn};

use super::{TargetFlags, TargetRequest, TargetState, TextureId};
use crate::constants::*;
use crate::error::{BoglError, Result};
use crate::resolve::{ExtensionSet, GlVersion};

/// Which off-screen buffer API the windowing system offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbufferVariant {
    /// GLX 1.3 core pbuffers
    Glx13,
    /// GLX_SGIX_fbconfig + GLX_SGIX_pbuffer
    Sgix,
}

impl PbufferVariant {
    /// Newer API first, SGIX only when both extensions are advertised
    pub fn detect(version: Option<GlVersion>, extensions: &ExtensionSet) -> Option<Self> {
        if version.is_some_and(|v| v.at_least(1, 3)) {
            return Some(Self::Glx13);
        }
        if extensions.contains("GLX_SGIX_fbconfig") && extensions.contains("GLX_SGIX_pbuffer") {
            return Some(Self::Sgix);
        }
        None
    }

    /// [`detect`](Self::detect) after dropping disabled tokens;
    /// `GLX_VERSION_1_3` among them turns off the core path
    pub fn detect_enabled(
        version: Option<GlVersion>,
        extensions: &ExtensionSet,
        disabled: &[String],
    ) -> Option<Self> {
        let mut extensions = extensions.clone();
        let mut version = version;
        for token in disabled {
            if token == GLX_VERSION_1_3_TOKEN {
                version = None;
            }
            extensions.remove(token);
        }
        Self::detect(version, &extensions)
    }

    pub fn choose_config_call(self) -> &'static str {
        match self {
            Self::Glx13 => "glXChooseFBConfig",
            Self::Sgix => "glXChooseFBConfigSGIX",
        }
    }

    pub fn create_pbuffer_call(self) -> &'static str {
        match self {
            Self::Glx13 => "glXCreatePbuffer",
            Self::Sgix => "glXCreateGLXPbufferSGIX",
        }
    }

    pub fn create_context_call(self) -> &'static str {
        match self {
            Self::Glx13 => "glXCreateNewContext",
            Self::Sgix => "glXCreateContextWithConfigSGIX",
        }
    }

    pub fn make_current_call(self) -> &'static str {
        match self {
            Self::Glx13 => "glXMakeContextCurrent",
            Self::Sgix => "glXMakeCurrent",
        }
    }
}

/// Frame buffer configuration attributes, `GLX_NONE` terminated
///
/// Channels come from the whole request, so a caller texture gets a matching
/// buffer even without the flag. Float targets double the per-channel depth
/// and ask for float components.
pub fn config_attribs(request: &TargetRequest) -> Vec<i32> {
    let float = request.flags.contains(TargetFlags::FLOAT);
    let bits = if float { CHANNEL_BITS * 2 } else { CHANNEL_BITS };

    let mut attribs = vec![
        GLX_DRAWABLE_TYPE,
        GLX_PBUFFER_BIT,
        GLX_RENDER_TYPE,
        if float { GLX_RGBA_FLOAT_BIT_ARB } else { GLX_RGBA_BIT },
        GLX_DOUBLEBUFFER,
        GLX_FALSE,
        GLX_RED_SIZE,
        bits,
        GLX_GREEN_SIZE,
        bits,
        GLX_BLUE_SIZE,
        bits,
    ];
    if request.wants_alpha() {
        attribs.extend([GLX_ALPHA_SIZE, bits]);
    }
    if request.wants_depth() {
        attribs.extend([GLX_DEPTH_SIZE, DEPTH_BITS]);
    }
    attribs.push(GLX_NONE);
    attribs
}

/// Pbuffer creation attributes, `GLX_NONE` terminated
///
/// SGIX passes the size as call arguments instead.
pub fn pbuffer_attribs(variant: PbufferVariant, width: u32, height: u32) -> Vec<i32> {
    let mut attribs = Vec::with_capacity(9);
    if variant == PbufferVariant::Glx13 {
        attribs.extend([GLX_PBUFFER_WIDTH, width as i32, GLX_PBUFFER_HEIGHT, height as i32]);
    }
    attribs.extend([
        GLX_LARGEST_PBUFFER,
        GLX_TRUE,
        GLX_PRESERVED_CONTENTS,
        GLX_TRUE,
        GLX_NONE,
    ]);
    attribs
}

/// Drawables and context bound to the calling thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding<D, C> {
    pub draw: Option<D>,
    pub read: Option<D>,
    pub context: Option<C>,
}

impl<D: Copy, C> Binding<D, C> {
    /// Same drawable for drawing and reading
    pub fn single(drawable: Option<D>, context: Option<C>) -> Self {
        Self {
            draw: drawable,
            read: drawable,
            context,
        }
    }
}

/// Windowing-system calls the pbuffer strategy makes
pub trait PbufferApi {
    type Config: Copy;
    type Drawable: Copy + PartialEq + Debug;
    type Context: Copy + PartialEq + Debug;

    /// Inspect the windowing system's version and capability string
    fn variant(&self) -> Option<PbufferVariant>;
    fn choose_config(&self, variant: PbufferVariant, attribs: &[i32]) -> Option<Self::Config>;
    fn create_pbuffer(
        &self,
        variant: PbufferVariant,
        config: Self::Config,
        width: u32,
        height: u32,
        attribs: &[i32],
    ) -> Option<Self::Drawable>;
    /// New context sharing objects with the current one
    fn create_context(
        &self,
        variant: PbufferVariant,
        config: Self::Config,
        flags: TargetFlags,
    ) -> Option<Self::Context>;
    /// Currently bound drawables and context
    fn current(&self) -> Binding<Self::Drawable, Self::Context>;
    fn make_current(
        &self,
        variant: PbufferVariant,
        binding: Binding<Self::Drawable, Self::Context>,
    ) -> bool;
    /// GPU-side copy of the current read buffer into `texture`
    fn copy_to_texture(&self, texture: TextureId, width: u32, height: u32);
    fn destroy_context(&self, context: Self::Context);
    fn destroy_pbuffer(&self, variant: PbufferVariant, drawable: Self::Drawable);
}

type SavedBinding<P> = Binding<<P as PbufferApi>::Drawable, <P as PbufferApi>::Context>;

/// Pbuffer strategy
pub struct PbufferRenderTarget<'a, P: PbufferApi> {
    api: &'a P,
    request: TargetRequest,
    variant: Option<PbufferVariant>,
    pbuffer: Option<P::Drawable>,
    context: Option<P::Context>,
    /// Binding to restore on `disable()`, set while enabled
    previous: Option<SavedBinding<P>>,
    state: TargetState,
}

impl<'a, P: PbufferApi> PbufferRenderTarget<'a, P> {
    /// Create the pbuffer and its context; a failure leaves the target `Invalid`
    pub fn new(api: &'a P, request: TargetRequest) -> Self {
        let mut target = Self {
            api,
            request,
            variant: None,
            pbuffer: None,
            context: None,
            previous: None,
            state: TargetState::Uninitialized,
        };

        target.state = TargetState::Initializing;
        target.state = match target.initialize() {
            Ok(()) => TargetState::Valid,
            Err(e) => {
                warn!("Pbuffer render target: {}", e);
                TargetState::Invalid(e)
            }
        };
        target
    }

    fn initialize(&mut self) -> Result<()> {
        let variant = self.api.variant().ok_or(BoglError::PbufferStep {
            step: "GLX 1.3 or GLX_SGIX_pbuffer",
        })?;
        self.variant = Some(variant);

        let config = self
            .api
            .choose_config(variant, &config_attribs(&self.request))
            .ok_or(BoglError::PbufferStep {
                step: variant.choose_config_call(),
            })?;

        let attribs = pbuffer_attribs(variant, self.request.width, self.request.height);
        let pbuffer = self
            .api
            .create_pbuffer(variant, config, self.request.width, self.request.height, &attribs)
            .ok_or(BoglError::PbufferStep {
                step: variant.create_pbuffer_call(),
            })?;
        self.pbuffer = Some(pbuffer);

        let context = self
            .api
            .create_context(variant, config, self.request.flags)
            .ok_or(BoglError::PbufferStep {
                step: variant.create_context_call(),
            })?;
        self.context = Some(context);

        info!(
            "Pbuffer created ({:?}): {}x{}",
            variant, self.request.width, self.request.height
        );
        Ok(())
    }

    pub fn state(&self) -> &TargetState {
        &self.state
    }

    pub fn request(&self) -> &TargetRequest {
        &self.request
    }

    pub fn variant(&self) -> Option<PbufferVariant> {
        self.variant
    }

    pub fn is_enabled(&self) -> bool {
        self.previous.is_some()
    }

    fn valid_variant(&self) -> Result<PbufferVariant> {
        match (&self.state, self.variant) {
            (TargetState::Valid, Some(variant)) => Ok(variant),
            _ => Err(BoglError::NotValid),
        }
    }

    /// Remember the current binding, then make the pbuffer current
    pub fn enable(&mut self) -> Result<()> {
        let variant = self.valid_variant()?;
        if self.previous.is_some() {
            warn!("Pbuffer render target enabled twice; keeping first saved binding");
        } else {
            self.previous = Some(self.api.current());
        }

        if !self
            .api
            .make_current(variant, Binding::single(self.pbuffer, self.context))
        {
            self.previous = None;
            return Err(BoglError::PbufferStep {
                step: variant.make_current_call(),
            });
        }
        Ok(())
    }

    /// Copy color then depth into the caller's textures, then restore
    pub fn disable(&mut self) -> Result<()> {
        let variant = self.valid_variant()?;
        let Some(previous) = self.previous.take() else {
            debug!("Pbuffer render target disabled while not enabled");
            return Ok(());
        };

        let (width, height) = (self.request.width, self.request.height);
        if let Some(texture) = self.request.color_texture {
            self.api.copy_to_texture(texture, width, height);
        }
        if let Some(texture) = self.request.depth_texture {
            self.api.copy_to_texture(texture, width, height);
        }

        if !self.api.make_current(variant, previous) {
            return Err(BoglError::PbufferStep {
                step: variant.make_current_call(),
            });
        }
        Ok(())
    }
}

impl<P: PbufferApi> Drop for PbufferRenderTarget<'_, P> {
    fn drop(&mut self) {
        let Some(variant) = self.variant else {
            return;
        };
        if let Some(previous) = self.previous.take() {
            warn!("Pbuffer render target dropped while enabled");
            self.api.make_current(variant, previous);
        }
        // Context before the drawable it renders to
        if let Some(context) = self.context.take() {
            self.api.destroy_context(context);
        }
        if let Some(pbuffer) = self.pbuffer.take() {
            self.api.destroy_pbuffer(variant, pbuffer);
        }
        debug!("Pbuffer render target destroyed");
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockPbuffers;
    use super::*;

    fn textured_request() -> TargetRequest {
        TargetRequest::new(32, 16, TargetFlags::RGBA | TargetFlags::DEPTH)
            .with_color_texture(TextureId::new(5).unwrap())
            .with_depth_texture(TextureId::new(6).unwrap())
    }

    #[test]
    fn test_copy_back_before_restore() {
        let api = MockPbuffers::new(Some(PbufferVariant::Glx13));
        let mut target = PbufferRenderTarget::new(&api, textured_request());
        assert_eq!(*target.state(), TargetState::Valid);

        target.enable().unwrap();
        assert_eq!(api.bound.get(), Binding::single(Some(2), Some(200)));
        target.disable().unwrap();

        // Previous binding restored exactly, read drawable included
        assert_eq!(
            api.bound.get(),
            Binding {
                draw: Some(1),
                read: Some(3),
                context: Some(100)
            }
        );
        let color = api.log.position("copy 5 32x16 from 2").unwrap();
        let depth = api.log.position("copy 6 32x16 from 2").unwrap();
        let restore = api.log.position("make_current 1/3 100").unwrap();
        assert!(color < depth);
        assert!(depth < restore);
    }

    #[test]
    fn test_no_copy_without_textures() {
        let api = MockPbuffers::new(Some(PbufferVariant::Sgix));
        let mut target = PbufferRenderTarget::new(&api, TargetRequest::new(8, 8, TargetFlags::RGB));
        target.enable().unwrap();
        target.disable().unwrap();
        assert_eq!(api.log.count_prefix("copy"), 0);
        assert!(!target.is_enabled());
    }

    #[test]
    fn test_destroy_order() {
        let api = MockPbuffers::new(Some(PbufferVariant::Glx13));
        drop(PbufferRenderTarget::new(&api, textured_request()));
        let context = api.log.position("destroy_context 200").unwrap();
        let pbuffer = api.log.position("destroy_pbuffer 2").unwrap();
        assert!(context < pbuffer);
    }

    #[test]
    fn test_failed_step_is_named() {
        let mut api = MockPbuffers::new(Some(PbufferVariant::Sgix));
        api.fail = Some("create_context");
        let mut target = PbufferRenderTarget::new(&api, textured_request());
        assert_eq!(
            *target.state(),
            TargetState::Invalid(BoglError::PbufferStep {
                step: "glXCreateContextWithConfigSGIX"
            })
        );
        assert_eq!(target.enable(), Err(BoglError::NotValid));
        drop(target);
        // The pbuffer created before the failure is still released
        assert!(api.log.position("destroy_pbuffer 2").is_some());
        assert_eq!(api.log.count_prefix("destroy_context"), 0);
    }

    #[test]
    fn test_no_variant() {
        let api = MockPbuffers::new(None);
        let target = PbufferRenderTarget::new(&api, textured_request());
        assert!(matches!(
            target.state(),
            TargetState::Invalid(BoglError::PbufferStep { .. })
        ));
        assert_eq!(api.log.calls(), vec!["variant".to_string()]);
    }

    #[test]
    fn test_variant_detection() {
        let sgix = ExtensionSet::parse("GLX_SGIX_fbconfig GLX_SGIX_pbuffer");
        let partial = ExtensionSet::parse("GLX_SGIX_fbconfig");
        assert_eq!(
            PbufferVariant::detect(Some(GlVersion::new(1, 4)), &ExtensionSet::new()),
            Some(PbufferVariant::Glx13)
        );
        assert_eq!(
            PbufferVariant::detect(Some(GlVersion::new(1, 2)), &sgix),
            Some(PbufferVariant::Sgix)
        );
        assert_eq!(PbufferVariant::detect(None, &partial), None);
    }

    #[test]
    fn test_disabled_tokens_force_fallback() {
        let both = ExtensionSet::parse("GLX_SGIX_fbconfig GLX_SGIX_pbuffer");
        let glx14 = Some(GlVersion::new(1, 4));

        let no_core = vec![GLX_VERSION_1_3_TOKEN.to_string()];
        assert_eq!(
            PbufferVariant::detect_enabled(glx14, &both, &no_core),
            Some(PbufferVariant::Sgix)
        );

        let no_sgix = vec![GLX_VERSION_1_3_TOKEN.to_string(), "GLX_SGIX_pbuffer".to_string()];
        assert_eq!(PbufferVariant::detect_enabled(glx14, &both, &no_sgix), None);
        assert_eq!(
            PbufferVariant::detect_enabled(glx14, &both, &[]),
            Some(PbufferVariant::Glx13)
        );
    }

    #[test]
    fn test_float_attribs_double_bits() {
        let attribs = config_attribs(&TargetRequest::new(
            8,
            8,
            TargetFlags::RGBA | TargetFlags::FLOAT,
        ));
        let pairs: Vec<_> = attribs.chunks(2).filter(|c| c.len() == 2).collect();
        assert!(pairs.contains(&&[GLX_RED_SIZE, 16][..]));
        assert!(pairs.contains(&&[GLX_ALPHA_SIZE, 16][..]));
        assert!(pairs.contains(&&[GLX_RENDER_TYPE, GLX_RGBA_FLOAT_BIT_ARB][..]));
        assert_eq!(attribs.last(), Some(&GLX_NONE));

        let plain = config_attribs(&TargetRequest::new(8, 8, TargetFlags::RGB));
        assert!(!plain.contains(&GLX_ALPHA_SIZE));
        assert!(!plain.contains(&GLX_DEPTH_SIZE));
    }

    #[test]
    fn test_texture_channels_shape_config() {
        let request = TargetRequest::new(32, 16, TargetFlags::empty())
            .with_color_texture(TextureId::new(5).unwrap())
            .with_depth_texture(TextureId::new(6).unwrap());
        let attribs = config_attribs(&request);
        let pairs: Vec<_> = attribs.chunks(2).filter(|c| c.len() == 2).collect();
        assert!(pairs.contains(&&[GLX_DEPTH_SIZE, DEPTH_BITS][..]));
        assert!(pairs.contains(&&[GLX_ALPHA_SIZE, CHANNEL_BITS][..]));

        // Through the target: the chosen config carries a depth buffer
        let api = MockPbuffers::new(Some(PbufferVariant::Glx13));
        let mut target = PbufferRenderTarget::new(&api, request);
        target.enable().unwrap();
        target.disable().unwrap();
        assert!(api.log.position(&format!("choose_config {}", attribs.len())).is_some());
        assert!(api.log.position("copy 6 32x16 from 2").is_some());
    }

    #[test]
    fn test_pbuffer_attribs_by_variant() {
        let glx13 = pbuffer_attribs(PbufferVariant::Glx13, 64, 32);
        assert_eq!(&glx13[..4], &[GLX_PBUFFER_WIDTH, 64, GLX_PBUFFER_HEIGHT, 32]);
        let sgix = pbuffer_attribs(PbufferVariant::Sgix, 64, 32);
        assert_eq!(
            sgix,
            vec![GLX_LARGEST_PBUFFER, GLX_TRUE, GLX_PRESERVED_CONTENTS, GLX_TRUE, GLX_NONE]
        );
    }
}
