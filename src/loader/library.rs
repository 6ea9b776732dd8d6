//! Native shared library handles
//!
//! Libraries loaded here are never unloaded: GL drivers register atexit
//! handlers and thread-local state that must outlive the display connection.

use std::ffi::c_void;
use std::fmt;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{BoglError, Result};
use crate::resolve::{ProcAddr, SymbolSource};

enum LoadState {
    Unloaded,
    Loaded(ManuallyDrop<libloading::Library>),
    Failed(String),
}

/// Owns one OS library handle for an absolute path
pub struct DynamicLibraryHandle {
    path: PathBuf,
    state: LoadState,
}

impl DynamicLibraryHandle {
    /// Create an unloaded handle. The path must be absolute.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(BoglError::InvalidArgument(format!(
                "library path must be absolute: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            state: LoadState::Unloaded,
        })
    }

    /// Load the library. Only the first call touches the OS loader;
    /// later calls report the outcome of that first attempt.
    pub fn load(&mut self) -> Result<()> {
        match &self.state {
            LoadState::Loaded(_) => return Ok(()),
            LoadState::Failed(reason) => {
                return Err(BoglError::LibraryLoad {
                    path: self.path.clone(),
                    reason: reason.clone(),
                })
            }
            LoadState::Unloaded => {}
        }

        if !self.path.exists() {
            let reason = "no such file".to_string();
            self.state = LoadState::Failed(reason.clone());
            return Err(BoglError::LibraryLoad {
                path: self.path.clone(),
                reason,
            });
        }

        // Running library constructors is the point of loading a driver
        match unsafe { libloading::Library::new(&self.path) } {
            Ok(lib) => {
                info!("Loaded {}", self.path.display());
                self.state = LoadState::Loaded(ManuallyDrop::new(lib));
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                debug!("dlopen {} failed: {}", self.path.display(), reason);
                self.state = LoadState::Failed(reason.clone());
                Err(BoglError::LibraryLoad {
                    path: self.path.clone(),
                    reason,
                })
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SymbolSource for DynamicLibraryHandle {
    fn symbol(&self, name: &str) -> Option<ProcAddr> {
        let LoadState::Loaded(lib) = &self.state else {
            return None;
        };
        let sym = unsafe { lib.get::<*mut c_void>(name.as_bytes()) }.ok()?;
        ProcAddr::new(*sym as *const c_void)
    }
}

impl fmt::Debug for DynamicLibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLibraryHandle")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Turns a candidate file into a loaded library
///
/// The locator is generic over this so directory search can be exercised
/// without real driver binaries.
pub trait LibraryLoader {
    type Library: SymbolSource;

    fn load(&self, path: &Path) -> Result<Self::Library>;
}

/// Loads through the OS dynamic linker
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

impl LibraryLoader for SystemLoader {
    type Library = DynamicLibraryHandle;

    fn load(&self, path: &Path) -> Result<Self::Library> {
        let mut handle = DynamicLibraryHandle::new(path)?;
        handle.load()?;
        Ok(handle)
    }
}
