//! Capability resolution
//!
//! ```text
//! Unresolved → CoreResolving → CoreResolved ──(context current)──→ ExtensionsResolved → Ready
//!                   │
//!                   └→ CoreFailed (terminal)
//! ```
//!
//! The core phase needs no context. The extension phase reads the driver's
//! extension string, which requires a current rendering context; the
//! production query reports `NoCurrentContext` instead of guessing.

use std::collections::HashSet;
use std::ffi::{c_char, c_int, c_void, CStr};
use std::fmt;
use std::path::PathBuf;
use std::ptr::NonNull;

use log::{debug, error, info, warn};

use super::alias::{AliasRule, ExtensionAliasBinder, ALIASES};
use super::extensions::{DriverInfo, ExtensionSet, GlVersion};
use super::pass::{
    resolve_core, resolve_extension, LibraryKind, PassOutcome, ResolutionPass, Source,
};
use super::passes::{EXTENSION_PASSES, GLU_CORE_PASSES, GL_CORE_PASSES, VERSION_PASSES};
use super::table::{BootstrapQuery, ProcAddr, ProcQuery, SymbolSource, SymbolTable};
use crate::constants::{BOOTSTRAP_PASS, BOOTSTRAP_SYMBOL};
use crate::error::{BoglError, Result};
use crate::loader::{LibraryLoader, LibraryLocator, SystemLoader};

type GlGetStringFn = unsafe extern "C" fn(u32) -> *const u8;
type GlGetStringiFn = unsafe extern "C" fn(u32, u32) -> *const u8;
type GlGetIntegervFn = unsafe extern "C" fn(u32, *mut i32);
type GlxQueryExtensionsStringFn = unsafe extern "C" fn(*mut c_void, c_int) -> *const c_char;

/// Resolution progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    Unresolved,
    CoreResolving,
    /// Terminal: the toolkit cannot render
    CoreFailed(BoglError),
    CoreResolved,
    ExtensionsResolved,
    Ready,
}

/// Resolved GL capability: the symbol table plus what the driver advertised
///
/// Written only by [`CapabilityResolver`]; read by everything that issues GL
/// calls. Not thread-safe: use it from the thread owning the GL context.
pub struct CapabilityContext {
    table: SymbolTable,
    query: Option<BootstrapQuery>,
    driver: DriverInfo,
    libraries: Vec<PathBuf>,
    disabled: Vec<String>,
    state: ResolverState,
}

impl CapabilityContext {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            query: None,
            driver: DriverInfo::default(),
            libraries: Vec::new(),
            disabled: Vec::new(),
            state: ResolverState::Unresolved,
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ResolverState::Ready
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn driver_info(&self) -> &DriverInfo {
        &self.driver
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.driver.extensions
    }

    pub fn has_extension(&self, token: &str) -> bool {
        self.driver.extensions.contains(token)
    }

    /// Files loaded during the core phase
    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }

    /// Extension tokens the configuration turned off
    pub fn disabled_extensions(&self) -> &[String] {
        &self.disabled
    }

    /// Address for `name`: the table first, then the bootstrap query
    pub fn proc_address(&self, name: &str) -> Option<ProcAddr> {
        self.table
            .get(name)
            .or_else(|| self.query.as_ref().and_then(|q| q.query(name)))
    }

    /// Typed function pointer for `name`
    ///
    /// # Safety
    /// `F` must match the entry point's C signature.
    pub unsafe fn function<F: Copy>(&self, name: &str) -> Option<F> {
        self.proc_address(name).map(|addr| addr.cast::<F>())
    }

    /// Build a glow context dispatching through this table
    ///
    /// Official names bound to ARB/EXT variants resolve to those variants.
    ///
    /// # Safety
    /// A GL context must be current on this thread.
    pub unsafe fn glow_context(&self) -> glow::Context {
        glow::Context::from_loader_function(|name| {
            self.proc_address(name)
                .map_or(std::ptr::null(), ProcAddr::as_ptr)
        })
    }

    /// Forget everything so resolution can run again after a context change.
    /// A fatal core failure is kept.
    pub fn reset(&mut self) {
        if let ResolverState::CoreFailed(e) = &self.state {
            warn!("Not resetting failed GL capability: {}", e);
            return;
        }
        self.table.clear();
        self.query = None;
        self.driver = DriverInfo::default();
        self.libraries.clear();
        self.disabled.clear();
        self.state = ResolverState::Unresolved;
    }

    /// Summary for diagnostics
    pub fn report(&self) -> CapabilityReport {
        CapabilityReport {
            state: self.state.clone(),
            libraries: self.libraries.clone(),
            version: self.driver.version,
            resolved: self.table.resolved_count(),
            missing: self.table.missing_count(),
            extensions: self.driver.extensions.len(),
            aliases: self.table.aliases().collect(),
        }
    }
}

impl Default for CapabilityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CapabilityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityContext")
            .field("state", &self.state)
            .field("libraries", &self.libraries)
            .field("entries", &self.table.len())
            .field("version", &self.driver.version)
            .finish()
    }
}

/// Printable capability summary
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub state: ResolverState,
    pub libraries: Vec<PathBuf>,
    pub version: GlVersion,
    pub resolved: usize,
    pub missing: usize,
    pub extensions: usize,
    pub aliases: Vec<&'static str>,
}

impl fmt::Display for CapabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State:       {:?}", self.state)?;
        for lib in &self.libraries {
            writeln!(f, "Library:     {}", lib.display())?;
        }
        writeln!(f, "GL version:  {}", self.version)?;
        writeln!(f, "Resolved:    {} entry points", self.resolved)?;
        writeln!(f, "Unavailable: {} entry points", self.missing)?;
        writeln!(f, "Extensions:  {} advertised", self.extensions)?;
        write!(f, "Aliases:     {}", self.aliases.len())?;
        for name in &self.aliases {
            write!(f, "\n  {}", name)?;
        }
        Ok(())
    }
}

/// Source of the driver's version and extension string
pub trait ExtensionQuery {
    fn driver_info(&self, caps: &CapabilityContext) -> Result<DriverInfo>;
}

/// Fixed answer, for callers that already know what the driver reports
impl ExtensionQuery for DriverInfo {
    fn driver_info(&self, _caps: &CapabilityContext) -> Result<DriverInfo> {
        Ok(self.clone())
    }
}

/// Reads the current context through the resolved table
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentContextQuery {
    display: Option<NonNull<c_void>>,
    screen: i32,
}

impl CurrentContextQuery {
    /// GL extensions only
    pub fn new() -> Self {
        Self::default()
    }

    /// GL extensions merged with the GLX extensions of `display`/`screen`
    pub fn with_glx_display(display: *mut c_void, screen: i32) -> Self {
        Self {
            display: NonNull::new(display),
            screen,
        }
    }
}

unsafe fn c_string(ptr: *const u8) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(
        CStr::from_ptr(ptr as *const c_char)
            .to_string_lossy()
            .into_owned(),
    )
}

impl ExtensionQuery for CurrentContextQuery {
    fn driver_info(&self, caps: &CapabilityContext) -> Result<DriverInfo> {
        let get_string = unsafe { caps.function::<GlGetStringFn>("glGetString") }.ok_or(
            BoglError::SymbolMissing {
                pass: "GL_VERSION_1_1",
                symbol: "glGetString",
            },
        )?;

        let version = unsafe { c_string(get_string(glow::VERSION)) }
            .ok_or(BoglError::NoCurrentContext)?;
        info!("OpenGL: {}", version);
        let version = GlVersion::parse(&version);

        let mut extensions = unsafe { c_string(get_string(glow::EXTENSIONS)) }
            .map(|s| ExtensionSet::parse(&s))
            .unwrap_or_default();

        // Core profiles only expose the indexed query
        if extensions.is_empty() && version.at_least(3, 0) {
            let get_integer = unsafe { caps.function::<GlGetIntegervFn>("glGetIntegerv") };
            let get_string_i = unsafe { caps.function::<GlGetStringiFn>("glGetStringi") };
            if let (Some(get_integer), Some(get_string_i)) = (get_integer, get_string_i) {
                let mut count = 0i32;
                unsafe { get_integer(glow::NUM_EXTENSIONS, &mut count) };
                for i in 0..count.max(0) as u32 {
                    if let Some(token) = unsafe { c_string(get_string_i(glow::EXTENSIONS, i)) } {
                        extensions.insert(token);
                    }
                }
            }
        }

        if let Some(display) = self.display {
            let query = unsafe {
                caps.function::<GlxQueryExtensionsStringFn>("glXQueryExtensionsString")
            };
            if let Some(query) = query {
                let glx = unsafe { c_string(query(display.as_ptr(), self.screen) as *const u8) };
                if let Some(glx) = glx {
                    extensions.merge(&ExtensionSet::parse(&glx));
                }
            }
        }

        debug!("Driver advertises {} extensions", extensions.len());
        Ok(DriverInfo::new(version, extensions))
    }
}

/// What to load and which extensions to ignore
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Logical name or absolute path of the GL library
    pub gl_library: String,
    /// GLU library; `None` skips GLU entirely
    pub glu_library: Option<String>,
    /// Tokens treated as not advertised
    pub disabled_extensions: Vec<String>,
    /// Skip GL 1.3+ version passes (extension passes still run)
    pub skip_version_passes: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            gl_library: "GL".to_string(),
            glu_library: None,
            disabled_extensions: Vec::new(),
            skip_version_passes: false,
        }
    }
}

/// Drives the resolution state machine of a [`CapabilityContext`]
pub struct CapabilityResolver<L: LibraryLoader = SystemLoader> {
    locator: LibraryLocator<L>,
    options: ResolverOptions,
    core_passes: &'static [ResolutionPass],
    version_passes: &'static [ResolutionPass],
    extension_passes: &'static [ResolutionPass],
    aliases: &'static [AliasRule],
}

impl<L: LibraryLoader> CapabilityResolver<L> {
    pub fn new(locator: LibraryLocator<L>, options: ResolverOptions) -> Self {
        Self {
            locator,
            options,
            core_passes: GL_CORE_PASSES,
            version_passes: VERSION_PASSES,
            extension_passes: EXTENSION_PASSES,
            aliases: ALIASES,
        }
    }

    /// Replace the built-in pass tables
    pub fn with_passes(
        mut self,
        core: &'static [ResolutionPass],
        version: &'static [ResolutionPass],
        extension: &'static [ResolutionPass],
    ) -> Self {
        self.core_passes = core;
        self.version_passes = version;
        self.extension_passes = extension;
        self
    }

    /// Replace the built-in alias table
    pub fn with_aliases(mut self, aliases: &'static [AliasRule]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Run both phases. Calling again on a resolved context starts over.
    pub fn resolve(&self, caps: &mut CapabilityContext, query: &dyn ExtensionQuery) -> Result<()> {
        self.resolve_core(caps)?;
        self.resolve_extensions(caps, query)
    }

    /// Core phase: locate libraries, bootstrap, mandatory passes
    pub fn resolve_core(&self, caps: &mut CapabilityContext) -> Result<()> {
        match &caps.state {
            ResolverState::CoreFailed(e) => return Err(BoglError::InitFailed(e.to_string())),
            ResolverState::Unresolved => {}
            _ => {
                info!("Re-resolving GL entry points");
                caps.reset();
            }
        }

        caps.state = ResolverState::CoreResolving;
        match self.run_core(caps) {
            Ok(()) => {
                info!(
                    "GL core resolved: {} entry points",
                    caps.table.resolved_count()
                );
                caps.state = ResolverState::CoreResolved;
                Ok(())
            }
            Err(e) => {
                error!("GL core resolution failed: {}", e);
                caps.state = ResolverState::CoreFailed(e.clone());
                Err(e)
            }
        }
    }

    fn run_core(&self, caps: &mut CapabilityContext) -> Result<()> {
        let gl = self.locator.locate(&self.options.gl_library)?;
        caps.libraries.push(gl.path.clone());

        let Some(bootstrap) = gl.library.symbol(BOOTSTRAP_SYMBOL) else {
            caps.table.set(BOOTSTRAP_SYMBOL, None);
            return Err(BoglError::SymbolMissing {
                pass: BOOTSTRAP_PASS,
                symbol: BOOTSTRAP_SYMBOL,
            });
        };
        caps.table.set(BOOTSTRAP_SYMBOL, Some(bootstrap));
        caps.query = Some(unsafe { BootstrapQuery::from_addr(bootstrap) });

        let glu = match &self.options.glu_library {
            Some(name) => {
                let glu = self.locator.locate(name)?;
                caps.libraries.push(glu.path.clone());
                Some(glu)
            }
            None => None,
        };

        let glu_passes: &[ResolutionPass] = if glu.is_some() { GLU_CORE_PASSES } else { &[] };
        for pass in self.core_passes.iter().chain(glu_passes) {
            let library: &dyn SymbolSource = match pass.source {
                Source::Library(LibraryKind::Gl) => &gl.library,
                Source::Library(LibraryKind::Glu) => match &glu {
                    Some(glu) => &glu.library,
                    None => continue,
                },
                Source::Query => {
                    warn!("{}: optional pass in core list, skipped", pass.name);
                    continue;
                }
            };
            resolve_core(pass, library, &mut caps.table)?;
        }

        Ok(())
    }

    /// Extension phase: query the driver, run gated passes, bind aliases
    ///
    /// Requires a current GL context when used with [`CurrentContextQuery`].
    /// A missing context leaves the state at `CoreResolved` so the caller
    /// can create one and retry.
    pub fn resolve_extensions(
        &self,
        caps: &mut CapabilityContext,
        query: &dyn ExtensionQuery,
    ) -> Result<()> {
        match &caps.state {
            ResolverState::CoreResolved => {}
            ResolverState::ExtensionsResolved | ResolverState::Ready => {
                debug!("Re-resolving GL extensions");
                self.forget_optional(caps);
            }
            ResolverState::CoreFailed(e) => return Err(BoglError::InitFailed(e.to_string())),
            ResolverState::Unresolved | ResolverState::CoreResolving => {
                return Err(BoglError::InvalidArgument(
                    "core entry points must be resolved before extensions".into(),
                ))
            }
        }

        let Some(proc_query) = caps.query else {
            return Err(BoglError::InvalidArgument("no address query available".into()));
        };

        let mut info = query.driver_info(caps)?;
        for token in &self.options.disabled_extensions {
            if info.extensions.remove(token) {
                info!("Extension {} disabled by config", token);
            }
        }

        let version_passes: &[ResolutionPass] = if self.options.skip_version_passes {
            &[]
        } else {
            self.version_passes
        };
        let mut skipped = 0;
        for pass in version_passes.iter().chain(self.extension_passes) {
            let outcome = resolve_extension(pass, &proc_query, &info, &mut caps.table);
            if outcome == PassOutcome::Skipped {
                skipped += 1;
            }
        }
        debug!("{} optional passes not supported by driver", skipped);

        caps.driver = info;
        caps.disabled = self.options.disabled_extensions.clone();
        caps.state = ResolverState::ExtensionsResolved;

        ExtensionAliasBinder::new(self.aliases).bind(&mut caps.table);
        caps.state = ResolverState::Ready;

        info!(
            "GL {} ready: {} entry points, {} extensions",
            caps.driver.version,
            caps.table.resolved_count(),
            caps.driver.extensions.len()
        );
        Ok(())
    }

    /// Back to `CoreResolved`: optional entries, aliases and driver info go,
    /// core entries stay
    fn forget_optional(&self, caps: &mut CapabilityContext) {
        let core: HashSet<&str> = self
            .core_passes
            .iter()
            .chain(GLU_CORE_PASSES)
            .flat_map(|pass| pass.entries.iter().copied())
            .collect();
        let optional = self
            .version_passes
            .iter()
            .chain(self.extension_passes)
            .flat_map(|pass| pass.entries.iter().copied())
            .filter(|name| !core.contains(name));

        caps.table.forget(optional);
        caps.driver = DriverInfo::default();
        caps.state = ResolverState::CoreResolved;
    }
}
