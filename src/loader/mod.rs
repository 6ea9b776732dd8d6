//! Native library discovery and loading
//!
//! Handles:
//! - Loader config parsing (ld.so.conf with includes)
//! - Directory search for versioned shared objects
//! - Permanent (never unloaded) library handles

pub mod ldconfig;
pub mod library;
pub mod locator;

pub use library::{DynamicLibraryHandle, LibraryLoader, SystemLoader};
pub use locator::{LibraryLocator, LocatedLibrary, SearchPolicy};
