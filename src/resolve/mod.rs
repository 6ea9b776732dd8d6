//! GL entry-point resolution
//!
//! Handles:
//! - Core passes read straight from the GL/GLU libraries (fatal on miss)
//! - Version and extension passes through glXGetProcAddressARB
//! - Binding official names to ARB/EXT variants
//! - The resolution state machine and capability queries

pub mod alias;
pub mod extensions;
pub mod pass;
pub mod passes;
pub mod resolver;
pub mod table;

pub use alias::{AliasRule, ExtensionAliasBinder, ALIASES};
pub use extensions::{DriverInfo, ExtensionSet, GlVersion};
pub use pass::{Gate, LibraryKind, PassOutcome, ResolutionPass, Source};
pub use resolver::{
    CapabilityContext, CapabilityReport, CapabilityResolver, CurrentContextQuery,
    ExtensionQuery, ResolverOptions, ResolverState,
};
pub use table::{BootstrapQuery, ProcAddr, ProcQuery, SymbolSource, SymbolTable};
