//! Configuration file management
//!
//! Loads TOML configuration files and converts them into search policy and
//! resolver options.
//! Default config path: ~/.config/bogl/config.toml

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_LOADER_CONFIG;
use crate::error::{BoglError, Result};
use crate::loader::SearchPolicy;
use crate::resolve::ResolverOptions;
use crate::target::BackendSelector;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library lookup settings
    pub library: LibraryConfig,
    /// Entry-point resolution settings
    pub resolver: ResolverConfig,
    /// Render target settings
    pub render_target: RenderTargetConfig,
}

/// Library lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// GL library: logical name ("GL") or absolute path
    pub gl: String,
    /// GLU library; empty skips GLU
    pub glu: String,
    /// EGL library used by the probe for a headless context
    pub egl: String,
    /// Directories searched after the standard ones
    pub extra_dirs: Vec<PathBuf>,
    /// Loader configuration file (ld.so.conf format); empty disables it
    pub loader_conf: String,
}

/// Entry-point resolution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extension tokens treated as not advertised
    /// Example: ["GL_EXT_framebuffer_object"] to work around a broken driver
    pub disabled_extensions: Vec<String>,
    /// Skip GL 1.3-2.0 version passes
    pub skip_version_passes: bool,
}

/// Render target settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTargetConfig {
    /// Use pbuffers even when framebuffer objects are available
    pub force_pbuffer: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            gl: "GL".to_string(),
            glu: String::new(),
            egl: "EGL".to_string(),
            extra_dirs: Vec::new(),
            loader_conf: DEFAULT_LOADER_CONFIG.to_string(),
        }
    }
}

/// Environment variables applied on top of the file
const ENV_CONFIG: &str = "BOGL_CONFIG";
const ENV_GL_LIBRARY: &str = "BOGL_GL_LIBRARY";
const ENV_DISABLED_EXTENSIONS: &str = "BOGL_DISABLE_EXTENSIONS";
const ENV_FORCE_PBUFFER: &str = "BOGL_FORCE_PBUFFER";

impl Config {
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/bogl/config.toml";

    /// Config file in use: `$BOGL_CONFIG`, then the user file, then the
    /// system file. `None` means built-in defaults.
    pub fn config_path() -> Option<PathBuf> {
        let user = dirs::config_dir().map(|dir| dir.join("bogl").join("config.toml"));
        std::env::var_os(ENV_CONFIG)
            .map(PathBuf::from)
            .into_iter()
            .chain(user)
            .chain(Some(PathBuf::from(Self::SYSTEM_CONFIG_PATH)))
            .find(|path| path.exists())
    }

    /// File (or defaults), then environment overrides, then validation
    ///
    /// A broken file is reported and ignored.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from_file(&path).unwrap_or_else(|e| {
                warn!("Ignoring config: {}", e);
                Self::default()
            }),
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate();
        info!(
            "GL library \"{}\", {} extra dirs, {} disabled extensions",
            config.library.gl,
            config.library.extra_dirs.len(),
            config.resolver.disabled_extensions.len()
        );
        config
    }

    /// Apply `BOGL_*` overrides read through `lookup`
    ///
    /// Disabled extensions are appended to the file's list, comma or space
    /// separated.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(gl) = lookup(ENV_GL_LIBRARY).filter(|v| !v.is_empty()) {
            self.library.gl = gl;
        }
        if let Some(list) = lookup(ENV_DISABLED_EXTENSIONS) {
            let disabled = &mut self.resolver.disabled_extensions;
            for token in list.split(|c: char| c == ',' || c.is_whitespace()) {
                if !token.is_empty() && !disabled.iter().any(|t| t == token) {
                    disabled.push(token.to_string());
                }
            }
        }
        if let Some(force) = lookup(ENV_FORCE_PBUFFER) {
            self.render_target.force_pbuffer = matches!(force.as_str(), "1" | "true" | "yes");
        }
    }

    /// Drop settings the locator would refuse
    pub fn validate(&mut self) {
        self.library.extra_dirs.retain(|dir| {
            let keep = dir.is_absolute();
            if !keep {
                warn!("Ignoring relative library directory {}", dir.display());
            }
            keep
        });
        if self.library.gl.trim().is_empty() {
            warn!("Empty GL library name, using \"GL\"");
            self.library.gl = LibraryConfig::default().gl;
        }
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BoglError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| BoglError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BoglError::Config(e.to_string()))
    }

    /// Library search policy: environment, loader config, standard dirs, extras
    pub fn to_search_policy(&self) -> SearchPolicy {
        let mut policy = SearchPolicy::from_environment();
        policy.loader_config = if self.library.loader_conf.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.library.loader_conf))
        };
        policy.extra_dirs = self.library.extra_dirs.clone();
        policy
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            gl_library: self.library.gl.clone(),
            glu_library: (!self.library.glu.is_empty()).then(|| self.library.glu.clone()),
            disabled_extensions: self.resolver.disabled_extensions.clone(),
            skip_version_passes: self.resolver.skip_version_passes,
        }
    }

    pub fn backend_selector(&self) -> BackendSelector {
        BackendSelector::forcing_pbuffer(self.render_target.force_pbuffer)
    }
}
