//! Library search
//!
//! Directory priority:
//! 1. Dynamic linker environment variable
//! 2. Loader configuration file (with includes)
//! 3. Standard system directories
//! 4. Vendor directory
//! 5. Extra directories from user config

use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use super::ldconfig::{parse_loader_config, wildcard_match};
use super::library::LibraryLoader;
use crate::constants::{
    DEFAULT_LOADER_CONFIG, LINKER_PATH_VAR, PATH_LIST_SEPARATOR, SHARED_LIBRARY_SUFFIX,
    SYSTEM_LIBRARY_DIRS, VENDOR_LIBRARY_DIR,
};
use crate::error::{BoglError, Result};

/// Where to look for libraries
#[derive(Debug, Clone, Default)]
pub struct SearchPolicy {
    /// Raw value of the linker search-path variable
    pub env_paths: Option<String>,
    /// Loader configuration file
    pub loader_config: Option<PathBuf>,
    pub system_dirs: Vec<PathBuf>,
    pub vendor_dir: Option<PathBuf>,
    pub extra_dirs: Vec<PathBuf>,
}

impl SearchPolicy {
    /// Policy for the running process: environment, /etc/ld.so.conf, standard dirs
    pub fn from_environment() -> Self {
        Self {
            env_paths: std::env::var(LINKER_PATH_VAR).ok(),
            loader_config: Some(PathBuf::from(DEFAULT_LOADER_CONFIG)),
            system_dirs: SYSTEM_LIBRARY_DIRS.iter().map(PathBuf::from).collect(),
            vendor_dir: Some(PathBuf::from(VENDOR_LIBRARY_DIR)),
            extra_dirs: Vec::new(),
        }
    }

    /// Search directories in priority order, duplicates removed
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut push = |dir: PathBuf| {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        };

        if let Some(env) = &self.env_paths {
            env.split(PATH_LIST_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .filter(|p| p.is_absolute())
                .for_each(&mut push);
        }

        if let Some(conf) = &self.loader_config {
            parse_loader_config(conf).into_iter().for_each(&mut push);
        }

        self.system_dirs.iter().cloned().for_each(&mut push);

        if let Some(vendor) = &self.vendor_dir {
            push(vendor.clone());
        }

        self.extra_dirs.iter().cloned().for_each(&mut push);

        dirs
    }
}

/// A library together with the file it was loaded from
#[derive(Debug)]
pub struct LocatedLibrary<T> {
    pub path: PathBuf,
    pub library: T,
}

/// Finds and loads libraries by logical name or absolute path
#[derive(Debug)]
pub struct LibraryLocator<L: LibraryLoader> {
    loader: L,
    policy: SearchPolicy,
}

impl<L: LibraryLoader> LibraryLocator<L> {
    pub fn new(loader: L, policy: SearchPolicy) -> Self {
        Self { loader, policy }
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Locate and load `name`
    ///
    /// `name` is either a logical name ("GL") or an absolute path.
    /// Relative paths are rejected.
    pub fn locate(&self, name: &str) -> Result<LocatedLibrary<L::Library>> {
        if name.is_empty() {
            return Err(BoglError::InvalidArgument("empty library name".into()));
        }

        if name.contains('/') {
            let path = Path::new(name);
            if !path.is_absolute() {
                return Err(BoglError::InvalidArgument(format!(
                    "relative library path not supported: {}",
                    name
                )));
            }
            if !path.exists() {
                return Err(BoglError::LibraryNotFound {
                    name: name.to_string(),
                    searched: 0,
                });
            }
            let library = self.loader.load(path)?;
            info!("Using library {}", path.display());
            return Ok(LocatedLibrary {
                path: path.to_path_buf(),
                library,
            });
        }

        let patterns = [
            format!("{}.{}*", name, SHARED_LIBRARY_SUFFIX),
            format!("lib{}.{}*", name, SHARED_LIBRARY_SUFFIX),
        ];

        let dirs = self.policy.search_dirs();
        for dir in &dirs {
            for path in matching_files(dir, &patterns) {
                trace!("Trying {}", path.display());
                match self.loader.load(&path) {
                    Ok(library) => {
                        info!("Found {} at {}", name, path.display());
                        return Ok(LocatedLibrary { path, library });
                    }
                    Err(e) => debug!("Skipping {}: {}", path.display(), e),
                }
            }
        }

        Err(BoglError::LibraryNotFound {
            name: name.to_string(),
            searched: dirs.len(),
        })
    }
}

/// Files in `dir` matching any pattern, in name order
fn matching_files(dir: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            trace!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| patterns.iter().any(|p| wildcard_match(p, n)))
        .collect();
    names.sort();
    names.into_iter().map(|n| dir.join(n)).collect()
}
