//! Headless EGL context
//!
//! A 1x1 pbuffer surface with desktop OpenGL bound, just enough for the
//! driver to answer GL_VERSION and GL_EXTENSIONS.

use anyhow::{anyhow, Context, Result};
use khronos_egl as egl;
use log::info;
use std::path::Path;

/// EGL instance type (dynamic loading)
type EglInstance = egl::Instance<egl::Dynamic<libloading::Library, egl::EGL1_4>>;

/// EGL context current on the calling thread until dropped
pub struct HeadlessContext {
    instance: EglInstance,
    display: egl::Display,
    context: egl::Context,
    surface: egl::Surface,
}

impl HeadlessContext {
    /// Initialize EGL from the given library file and make a context current
    pub fn new(library: &Path) -> Result<Self> {
        let lib = unsafe {
            libloading::Library::new(library)
                .with_context(|| format!("Failed to load EGL library {}", library.display()))?
        };

        let instance: EglInstance = unsafe {
            egl::DynamicInstance::<egl::EGL1_4>::load_required_from(lib)
                .context("Failed to create EGL instance")?
        };

        let display = unsafe { instance.get_display(egl::DEFAULT_DISPLAY) }
            .ok_or_else(|| anyhow!("No default EGL display"))?;

        instance
            .initialize(display)
            .context("Failed to initialize EGL")?;

        if let Ok(version_str) = instance.query_string(Some(display), egl::VERSION) {
            info!("EGL version: {}", version_str.to_string_lossy());
        }

        // Desktop GL, not ES: the resolver targets libGL
        instance
            .bind_api(egl::OPENGL_API)
            .context("Failed to bind OpenGL API")?;

        let config = Self::choose_config(&instance, display)?;

        let context = instance
            .create_context(display, config, None, &[egl::NONE])
            .context("Failed to create EGL context")?;

        let surface_attribs = [egl::WIDTH, 1, egl::HEIGHT, 1, egl::NONE];
        let surface = match instance.create_pbuffer_surface(display, config, &surface_attribs) {
            Ok(surface) => surface,
            Err(e) => {
                let _ = instance.destroy_context(display, context);
                return Err(anyhow!("Failed to create EGL pbuffer surface: {}", e));
            }
        };

        instance
            .make_current(display, Some(surface), Some(surface), Some(context))
            .context("Failed to make EGL context current")?;

        info!("Headless EGL context created");

        Ok(Self {
            instance,
            display,
            context,
            surface,
        })
    }

    /// Choose EGL config
    fn choose_config(instance: &EglInstance, display: egl::Display) -> Result<egl::Config> {
        let config_attribs = [
            egl::SURFACE_TYPE,
            egl::PBUFFER_BIT,
            egl::RED_SIZE,
            8,
            egl::GREEN_SIZE,
            8,
            egl::BLUE_SIZE,
            8,
            egl::ALPHA_SIZE,
            8,
            egl::RENDERABLE_TYPE,
            egl::OPENGL_BIT,
            egl::NONE,
        ];

        instance
            .choose_first_config(display, &config_attribs)
            .context("choose_first_config failed")?
            .ok_or_else(|| anyhow!("No suitable EGL config found"))
    }
}

impl Drop for HeadlessContext {
    fn drop(&mut self) {
        let _ = self.instance.make_current(self.display, None, None, None);
        let _ = self.instance.destroy_surface(self.display, self.surface);
        let _ = self.instance.destroy_context(self.display, self.context);
        let _ = self.instance.terminate(self.display);
    }
}
