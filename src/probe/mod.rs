//! Capability probe
//!
//! Resolves GL the way an application would, prints what was found and
//! exercises one render target when framebuffer objects are available.

mod egl;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use log::info;

use bogl::config::Config;
use bogl::loader::{LibraryLocator, SystemLoader};
use bogl::resolve::{CapabilityContext, CapabilityResolver, CurrentContextQuery};
use bogl::target::{
    BackendKind, BackendSelector, GlxPbufferApi, RenderTarget, TargetFlags, TargetRequest,
    TextureId,
};

/// Size of the render target exercised by the probe
const PROBE_TARGET_SIZE: u32 = 64;

/// Command line overrides
#[derive(Debug, Default)]
pub struct ProbeOptions {
    pub gl_library: Option<String>,
    pub glu_library: Option<String>,
    pub no_context: bool,
}

pub fn run(config: &Config, opts: &ProbeOptions) -> Result<()> {
    let mut options = config.resolver_options();
    if let Some(lib) = &opts.gl_library {
        options.gl_library = lib.clone();
    }
    if let Some(glu) = &opts.glu_library {
        options.glu_library = Some(glu.clone());
    }

    let policy = config.to_search_policy();
    let locator = LibraryLocator::new(SystemLoader, policy.clone());
    let resolver = CapabilityResolver::new(locator, options);
    let mut caps = CapabilityContext::new();

    resolver
        .resolve_core(&mut caps)
        .context("GL core resolution failed")?;

    if opts.no_context {
        println!("{}", caps.report());
        return Ok(());
    }

    let egl_path = LibraryLocator::new(SystemLoader, policy)
        .locate(&config.library.egl)
        .context("EGL library not found")?
        .path;
    let _context = egl::HeadlessContext::new(&egl_path)?;

    resolver
        .resolve_extensions(&mut caps, &CurrentContextQuery::new())
        .context("GL extension resolution failed")?;
    println!("{}", caps.report());

    let selector = config.backend_selector();
    let request = TargetRequest::new(
        PROBE_TARGET_SIZE,
        PROBE_TARGET_SIZE,
        TargetFlags::RGBA | TargetFlags::DEPTH,
    );
    let kind = selector.select(&request, caps.table(), caps.extensions());
    println!("Render target backend: {:?}", kind);

    match kind {
        BackendKind::Fbo => exercise_fbo(&caps, &selector, request),
        BackendKind::Pbuffer => {
            println!("Pbuffer targets need a GLX display; skipped in headless mode");
            Ok(())
        }
    }
}

/// Render a clear color into a texture through an FBO target
fn exercise_fbo(
    caps: &CapabilityContext,
    selector: &BackendSelector,
    request: TargetRequest,
) -> Result<()> {
    let gl = unsafe { caps.glow_context() };
    let size = request.width as i32;

    let texture = unsafe {
        let texture = gl
            .create_texture()
            .map_err(|e| anyhow!("Failed to create probe texture: {}", e))?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            size,
            size,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            None,
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);
        texture
    };

    let result = (|| -> Result<()> {
        let color = TextureId::new(texture.0.get()).ok_or_else(|| anyhow!("Texture name 0"))?;
        let mut target = RenderTarget::<glow::Context, GlxPbufferApi>::create(
            request.with_color_texture(color),
            selector,
            caps,
            &gl,
            None,
        )?;
        if !target.is_valid() {
            return Err(anyhow!("Render target invalid: {:?}", target.state()));
        }

        target.enable()?;
        unsafe {
            gl.viewport(0, 0, size, size);
            gl.clear_color(0.0, 1.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        target.disable()?;
        info!("FBO render target exercised");
        Ok(())
    })();

    unsafe { gl.delete_texture(texture) };
    result?;
    println!("FBO render target: OK");
    Ok(())
}
