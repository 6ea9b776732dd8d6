//! Resolution passes
//!
//! A pass is a named batch of entry points sharing one gate. Core passes
//! read exported symbols from a library and fail on the first miss.
//! Optional passes go through the address query and tolerate misses.

use log::{debug, trace};

use super::extensions::DriverInfo;
use super::table::{ProcQuery, SymbolSource, SymbolTable};
use crate::error::{BoglError, Result};

/// Library a core pass reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Gl,
    Glu,
}

/// Condition under which an optional pass runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Core passes: always run, always mandatory
    Always,
    /// Driver advertises this exact extension token
    Extension(&'static str),
    /// Driver version is at least (major, minor)
    Version(u32, u32),
}

/// Where a pass finds its addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Library(LibraryKind),
    Query,
}

/// Static description of one batch of entry points
#[derive(Debug, Clone, Copy)]
pub struct ResolutionPass {
    pub name: &'static str,
    pub source: Source,
    pub gate: Gate,
    pub entries: &'static [&'static str],
}

impl ResolutionPass {
    pub const fn core(
        name: &'static str,
        library: LibraryKind,
        entries: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            source: Source::Library(library),
            gate: Gate::Always,
            entries,
        }
    }

    pub const fn version(
        name: &'static str,
        major: u32,
        minor: u32,
        entries: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            source: Source::Query,
            gate: Gate::Version(major, minor),
            entries,
        }
    }

    pub const fn extension(
        name: &'static str,
        extension: &'static str,
        entries: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            source: Source::Query,
            gate: Gate::Extension(extension),
            entries,
        }
    }

    /// Mandatory passes abort initialization on any miss
    pub fn is_mandatory(&self) -> bool {
        matches!(self.source, Source::Library(_))
    }

    /// Whether an optional pass should run for this driver
    pub fn is_enabled(&self, info: &DriverInfo) -> bool {
        match self.gate {
            Gate::Always => true,
            Gate::Extension(ext) => info.extensions.contains(ext),
            Gate::Version(major, minor) => info.version.at_least(major, minor),
        }
    }
}

/// Outcome of an optional pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Gate not satisfied; nothing attempted
    Skipped,
    Resolved { found: usize, missing: usize },
}

/// Resolve every entry of a core pass by exact symbol name.
///
/// Stops at the first missing symbol. Entries resolved before the miss stay
/// in the table; there is no rollback.
pub fn resolve_core(
    pass: &ResolutionPass,
    library: &dyn SymbolSource,
    table: &mut SymbolTable,
) -> Result<usize> {
    for &name in pass.entries {
        match library.symbol(name) {
            Some(addr) => table.set(name, Some(addr)),
            None => {
                table.set(name, None);
                return Err(BoglError::SymbolMissing {
                    pass: pass.name,
                    symbol: name,
                });
            }
        }
    }
    debug!("{}: {} entry points", pass.name, pass.entries.len());
    Ok(pass.entries.len())
}

/// Resolve an optional pass through the address query if its gate allows it.
///
/// Misses are stored as null entries.
pub fn resolve_extension(
    pass: &ResolutionPass,
    query: &dyn ProcQuery,
    info: &DriverInfo,
    table: &mut SymbolTable,
) -> PassOutcome {
    if !pass.is_enabled(info) {
        trace!("{}: not supported, skipped", pass.name);
        return PassOutcome::Skipped;
    }

    let mut found = 0;
    let mut missing = 0;
    for &name in pass.entries {
        let addr = query.query(name);
        if addr.is_some() {
            found += 1;
        } else {
            trace!("{}: {} not available", pass.name, name);
            missing += 1;
        }
        table.set(name, addr);
    }

    debug!("{}: {} found, {} missing", pass.name, found, missing);
    PassOutcome::Resolved { found, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::extensions::{ExtensionSet, GlVersion};
    use crate::resolve::table::{fake_addr, ProcAddr};
    use std::cell::RefCell;
    use std::collections::HashMap;

    static CORE: ResolutionPass = ResolutionPass::core(
        "GL_TEST_core",
        LibraryKind::Gl,
        &["glAlpha", "glBravo", "glCharlie", "glDelta"],
    );

    static EXAMPLE: ResolutionPass =
        ResolutionPass::extension("EXT_example", "EXT_example", &["glExampleEXT", "glOtherEXT"]);

    /// Answers a fixed set of names and logs every request
    #[derive(Default)]
    struct RecordingQuery {
        known: HashMap<&'static str, ProcAddr>,
        asked: RefCell<Vec<String>>,
    }

    impl ProcQuery for RecordingQuery {
        fn query(&self, name: &str) -> Option<ProcAddr> {
            self.asked.borrow_mut().push(name.to_string());
            self.known.get(name).copied()
        }
    }

    fn library(names: &[&str]) -> HashMap<String, ProcAddr> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), fake_addr(i)))
            .collect()
    }

    #[test]
    fn test_core_pass_all_present() {
        let lib = library(&["glAlpha", "glBravo", "glCharlie", "glDelta"]);
        let mut table = SymbolTable::new();
        assert_eq!(resolve_core(&CORE, &lib, &mut table).unwrap(), 4);
        assert_eq!(table.resolved_count(), 4);
    }

    #[test]
    fn test_core_pass_fails_fast_with_partial_fill() {
        let lib = library(&["glAlpha", "glBravo", "glDelta"]);
        let mut table = SymbolTable::new();

        let err = resolve_core(&CORE, &lib, &mut table).unwrap_err();
        assert_eq!(
            err,
            BoglError::SymbolMissing {
                pass: "GL_TEST_core",
                symbol: "glCharlie"
            }
        );
        // Entries before the miss remain resolved
        assert!(table.is_resolved("glAlpha"));
        assert!(table.is_resolved("glBravo"));
        assert!(!table.is_resolved("glCharlie"));
        // Entries after the miss were never attempted
        assert!(!table.contains("glDelta"));
    }

    #[test]
    fn test_extension_gate_blocks_attempts() {
        let query = RecordingQuery::default();
        let info = DriverInfo::new(GlVersion::new(2, 1), ExtensionSet::parse("EXT_other"));
        let mut table = SymbolTable::new();

        let outcome = resolve_extension(&EXAMPLE, &query, &info, &mut table);
        assert_eq!(outcome, PassOutcome::Skipped);
        assert!(query.asked.borrow().is_empty());
        assert!(!table.contains("glExampleEXT"));
        assert!(!table.contains("glOtherEXT"));
    }

    #[test]
    fn test_extension_misses_are_null() {
        let mut query = RecordingQuery::default();
        query.known.insert("glExampleEXT", fake_addr(7));
        let info = DriverInfo::new(GlVersion::BASELINE, ExtensionSet::parse("EXT_example"));
        let mut table = SymbolTable::new();

        let outcome = resolve_extension(&EXAMPLE, &query, &info, &mut table);
        assert_eq!(outcome, PassOutcome::Resolved { found: 1, missing: 1 });
        assert_eq!(table.get("glExampleEXT"), Some(fake_addr(7)));
        assert!(table.contains("glOtherEXT"));
        assert!(!table.is_resolved("glOtherEXT"));
    }

    #[test]
    fn test_version_gate() {
        let pass = ResolutionPass::version("GL_VERSION_1_5", 1, 5, &["glGenBuffers"]);
        let old = DriverInfo::new(GlVersion::new(1, 4), ExtensionSet::new());
        let new = DriverInfo::new(GlVersion::new(2, 0), ExtensionSet::new());
        assert!(!pass.is_enabled(&old));
        assert!(pass.is_enabled(&new));
        assert!(!pass.is_mandatory());
        assert!(CORE.is_mandatory());
    }
}
