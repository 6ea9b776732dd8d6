//! GLX pbuffer platform
//!
//! Calls GLX through the resolved capability table, so nothing here links
//! against libGL directly. The copy-back goes through glow.

use std::ffi::{c_char, c_int, c_uint, c_ulong, c_void, CStr};
use std::ptr;

use glow::HasContext;
use log::{debug, warn};

use super::pbuffer::{Binding, PbufferApi, PbufferVariant};
use super::{TargetFlags, TextureId};
use crate::constants::{GLX_RGBA_FLOAT_TYPE_ARB, GLX_RGBA_TYPE, GLX_TRUE};
use crate::error::{BoglError, Result};
use crate::resolve::{CapabilityContext, ExtensionSet, GlVersion};

type Display = c_void;
type GlxFbConfig = *mut c_void;
type GlxContext = *mut c_void;
type GlxDrawable = c_ulong;

type QueryVersionFn = unsafe extern "C" fn(*mut Display, *mut c_int, *mut c_int) -> c_int;
type QueryExtensionsStringFn = unsafe extern "C" fn(*mut Display, c_int) -> *const c_char;
type ChooseFbConfigFn =
    unsafe extern "C" fn(*mut Display, c_int, *const c_int, *mut c_int) -> *mut GlxFbConfig;
type CreatePbufferFn = unsafe extern "C" fn(*mut Display, GlxFbConfig, *const c_int) -> GlxDrawable;
type CreatePbufferSgixFn =
    unsafe extern "C" fn(*mut Display, GlxFbConfig, c_uint, c_uint, *const c_int) -> GlxDrawable;
type CreateContextFn =
    unsafe extern "C" fn(*mut Display, GlxFbConfig, c_int, GlxContext, c_int) -> GlxContext;
type MakeContextCurrentFn =
    unsafe extern "C" fn(*mut Display, GlxDrawable, GlxDrawable, GlxContext) -> c_int;
type MakeCurrentFn = unsafe extern "C" fn(*mut Display, GlxDrawable, GlxContext) -> c_int;
type GetCurrentDrawableFn = unsafe extern "C" fn() -> GlxDrawable;
type GetCurrentContextFn = unsafe extern "C" fn() -> GlxContext;
type DestroyContextFn = unsafe extern "C" fn(*mut Display, GlxContext);
type DestroyDrawableFn = unsafe extern "C" fn(*mut Display, GlxDrawable);
type XFreeFn = unsafe extern "C" fn(*mut c_void) -> c_int;

/// Xlib allocates the config array; XFree releases it
const XLIB_NAME: &str = "libX11.so.6";

/// GLX side of the pbuffer strategy
pub struct GlxPbufferApi<'a> {
    caps: &'a CapabilityContext,
    gl: &'a glow::Context,
    display: *mut Display,
    screen: c_int,
    xlib: Option<libloading::Library>,
}

impl<'a> GlxPbufferApi<'a> {
    /// # Safety
    /// `display` must be an open Xlib `Display*` that outlives this value.
    pub unsafe fn new(
        caps: &'a CapabilityContext,
        gl: &'a glow::Context,
        display: *mut c_void,
        screen: i32,
    ) -> Result<Self> {
        if display.is_null() {
            return Err(BoglError::InvalidArgument("null X display".into()));
        }
        let xlib = match libloading::Library::new(XLIB_NAME) {
            Ok(lib) => Some(lib),
            Err(e) => {
                warn!("{} unavailable, config arrays will leak: {}", XLIB_NAME, e);
                None
            }
        };
        Ok(Self {
            caps,
            gl,
            display,
            screen,
            xlib,
        })
    }

    fn function<F: Copy>(&self, name: &str) -> Option<F> {
        let f = unsafe { self.caps.function::<F>(name) };
        if f.is_none() {
            debug!("{} not resolved", name);
        }
        f
    }

    fn server_version(&self) -> Option<GlVersion> {
        let query: QueryVersionFn = self.function("glXQueryVersion")?;
        let (mut major, mut minor) = (0, 0);
        if unsafe { query(self.display, &mut major, &mut minor) } == 0 {
            return None;
        }
        Some(GlVersion::new(major as u32, minor as u32))
    }

    fn extensions(&self) -> ExtensionSet {
        let Some(query) = self.function::<QueryExtensionsStringFn>("glXQueryExtensionsString")
        else {
            return ExtensionSet::new();
        };
        let s = unsafe { query(self.display, self.screen) };
        if s.is_null() {
            return ExtensionSet::new();
        }
        ExtensionSet::parse(&unsafe { CStr::from_ptr(s) }.to_string_lossy())
    }

    fn free(&self, ptr: *mut c_void) {
        let Some(xlib) = &self.xlib else {
            return;
        };
        unsafe {
            if let Ok(xfree) = xlib.get::<XFreeFn>(b"XFree\0") {
                xfree(ptr);
            }
        }
    }
}

impl PbufferApi for GlxPbufferApi<'_> {
    type Config = GlxFbConfig;
    type Drawable = GlxDrawable;
    type Context = GlxContext;

    fn variant(&self) -> Option<PbufferVariant> {
        let version = self.server_version();
        let variant = PbufferVariant::detect_enabled(
            version,
            &self.extensions(),
            self.caps.disabled_extensions(),
        );
        debug!("GLX server {:?}, pbuffer variant {:?}", version, variant);
        variant
    }

    fn choose_config(&self, variant: PbufferVariant, attribs: &[i32]) -> Option<GlxFbConfig> {
        let choose: ChooseFbConfigFn = self.function(variant.choose_config_call())?;
        let mut count: c_int = 0;
        let configs = unsafe { choose(self.display, self.screen, attribs.as_ptr(), &mut count) };
        if configs.is_null() {
            return None;
        }
        let first = (count > 0).then(|| unsafe { *configs });
        self.free(configs as *mut c_void);
        first.filter(|c| !c.is_null())
    }

    fn create_pbuffer(
        &self,
        variant: PbufferVariant,
        config: GlxFbConfig,
        width: u32,
        height: u32,
        attribs: &[i32],
    ) -> Option<GlxDrawable> {
        let drawable = match variant {
            PbufferVariant::Glx13 => {
                let create: CreatePbufferFn = self.function(variant.create_pbuffer_call())?;
                unsafe { create(self.display, config, attribs.as_ptr()) }
            }
            PbufferVariant::Sgix => {
                let create: CreatePbufferSgixFn = self.function(variant.create_pbuffer_call())?;
                unsafe { create(self.display, config, width, height, attribs.as_ptr()) }
            }
        };
        (drawable != 0).then_some(drawable)
    }

    fn create_context(
        &self,
        variant: PbufferVariant,
        config: GlxFbConfig,
        flags: TargetFlags,
    ) -> Option<GlxContext> {
        let create: CreateContextFn = self.function(variant.create_context_call())?;
        let share = self
            .function::<GetCurrentContextFn>("glXGetCurrentContext")
            .map_or(ptr::null_mut(), |current| unsafe { current() });
        let render_type = if flags.contains(TargetFlags::FLOAT) {
            GLX_RGBA_FLOAT_TYPE_ARB
        } else {
            GLX_RGBA_TYPE
        };
        let context = unsafe { create(self.display, config, render_type, share, GLX_TRUE) };
        (!context.is_null()).then_some(context)
    }

    fn current(&self) -> Binding<GlxDrawable, GlxContext> {
        let drawable = |name: &str| {
            self.function::<GetCurrentDrawableFn>(name)
                .map(|f| unsafe { f() })
                .filter(|d| *d != 0)
        };
        let draw = drawable("glXGetCurrentDrawable");
        // GLX 1.3; older servers read from the draw drawable
        let read = drawable("glXGetCurrentReadDrawable").or(draw);
        let context = self
            .function::<GetCurrentContextFn>("glXGetCurrentContext")
            .map(|f| unsafe { f() })
            .filter(|c| !c.is_null());
        Binding {
            draw,
            read,
            context,
        }
    }

    fn make_current(
        &self,
        variant: PbufferVariant,
        binding: Binding<GlxDrawable, GlxContext>,
    ) -> bool {
        let draw = binding.draw.unwrap_or(0);
        let read = binding.read.unwrap_or(draw);
        let context = binding.context.unwrap_or(ptr::null_mut());
        let ok = match variant {
            PbufferVariant::Glx13 => self
                .function::<MakeContextCurrentFn>(variant.make_current_call())
                .map(|f| unsafe { f(self.display, draw, read, context) }),
            PbufferVariant::Sgix => self
                .function::<MakeCurrentFn>(variant.make_current_call())
                .map(|f| unsafe { f(self.display, draw, context) }),
        };
        ok.is_some_and(|r| r != 0)
    }

    fn copy_to_texture(&self, texture: TextureId, width: u32, height: u32) {
        unsafe {
            self.gl.bind_texture(
                glow::TEXTURE_2D,
                Some(glow::NativeTexture(texture.non_zero())),
            );
            self.gl.copy_tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                0,
                0,
                width as i32,
                height as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn destroy_context(&self, context: GlxContext) {
        if let Some(destroy) = self.function::<DestroyContextFn>("glXDestroyContext") {
            unsafe { destroy(self.display, context) };
        }
    }

    fn destroy_pbuffer(&self, variant: PbufferVariant, drawable: GlxDrawable) {
        let name = match variant {
            PbufferVariant::Glx13 => "glXDestroyPbuffer",
            PbufferVariant::Sgix => "glXDestroyGLXPbufferSGIX",
        };
        if let Some(destroy) = self.function::<DestroyDrawableFn>(name) {
            unsafe { destroy(self.display, drawable) };
        }
    }
}
