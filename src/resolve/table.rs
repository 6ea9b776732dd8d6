//! Entry-point addresses and the table that holds them

use std::collections::{BTreeSet, HashMap};
use std::ffi::{c_void, CString};
use std::ptr::NonNull;

/// Non-null address of a resolved entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcAddr(NonNull<c_void>);

impl ProcAddr {
    pub fn new(ptr: *const c_void) -> Option<Self> {
        NonNull::new(ptr as *mut c_void).map(Self)
    }

    pub fn as_ptr(self) -> *const c_void {
        self.0.as_ptr()
    }

    /// Reinterpret as a typed function pointer
    ///
    /// # Safety
    /// `F` must be a function pointer type matching the entry point's real signature.
    pub unsafe fn cast<F: Copy>(self) -> F {
        debug_assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*const c_void>()
        );
        std::mem::transmute_copy::<*const c_void, F>(&self.as_ptr())
    }
}

/// Anything that can look up an exported symbol by exact name
pub trait SymbolSource {
    fn symbol(&self, name: &str) -> Option<ProcAddr>;
}

impl<S: SymbolSource + ?Sized> SymbolSource for &S {
    fn symbol(&self, name: &str) -> Option<ProcAddr> {
        (**self).symbol(name)
    }
}

impl SymbolSource for HashMap<String, ProcAddr> {
    fn symbol(&self, name: &str) -> Option<ProcAddr> {
        self.get(name).copied()
    }
}

/// Generic "get proc address" lookup used for extension entry points
pub trait ProcQuery {
    fn query(&self, name: &str) -> Option<ProcAddr>;
}

/// `glXGetProcAddressARB` signature
pub type GetProcAddressFn = unsafe extern "C" fn(*const u8) -> *const c_void;

/// Address query backed by the bootstrap entry point
#[derive(Debug, Clone, Copy)]
pub struct BootstrapQuery {
    get_proc_address: GetProcAddressFn,
}

impl BootstrapQuery {
    /// # Safety
    /// `addr` must point at a function with the `glXGetProcAddressARB` signature.
    pub unsafe fn from_addr(addr: ProcAddr) -> Self {
        Self {
            get_proc_address: addr.cast::<GetProcAddressFn>(),
        }
    }
}

impl ProcQuery for BootstrapQuery {
    fn query(&self, name: &str) -> Option<ProcAddr> {
        let c_name = CString::new(name).ok()?;
        let ptr = unsafe { (self.get_proc_address)(c_name.as_ptr() as *const u8) };
        ProcAddr::new(ptr)
    }
}

/// Entry-point name → address map
///
/// A key present with `None` was attempted and found missing; an absent key
/// was never attempted.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: HashMap<&'static str, Option<ProcAddr>>,
    aliases: BTreeSet<&'static str>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup outcome, overwriting any earlier one
    pub fn set(&mut self, name: &'static str, addr: Option<ProcAddr>) {
        self.entries.insert(name, addr);
    }

    /// Register `official` as another name for an already resolved address
    pub fn bind_alias(&mut self, official: &'static str, addr: ProcAddr) {
        self.entries.insert(official, Some(addr));
        self.aliases.insert(official);
    }

    pub fn get(&self, name: &str) -> Option<ProcAddr> {
        self.entries.get(name).copied().flatten()
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether a lookup for `name` was attempted at all
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names bound by the alias pass, sorted
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.aliases.iter().copied()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.aliases.clear();
    }

    /// Drop the lookups for `names` and every alias binding, keep the rest
    pub fn forget<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) {
        for name in names {
            self.entries.remove(name);
        }
        for alias in std::mem::take(&mut self.aliases) {
            self.entries.remove(alias);
        }
    }
}

/// Fabricated, never-called addresses for tests
#[cfg(test)]
pub(crate) fn fake_addr(n: usize) -> ProcAddr {
    ProcAddr::new((0x1000 + n * 16) as *const c_void).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempted_vs_missing() {
        let mut table = SymbolTable::new();
        table.set("glBegin", Some(fake_addr(1)));
        table.set("glFooEXT", None);

        assert!(table.is_resolved("glBegin"));
        assert!(table.contains("glFooEXT"));
        assert!(!table.is_resolved("glFooEXT"));
        assert!(!table.contains("glNeverAsked"));
        assert_eq!(table.resolved_count(), 1);
        assert_eq!(table.missing_count(), 1);
    }

    #[test]
    fn test_forget_keeps_other_entries() {
        let mut table = SymbolTable::new();
        table.set("glBegin", Some(fake_addr(1)));
        table.set("glBlendColorEXT", Some(fake_addr(2)));
        table.bind_alias("glBlendColor", fake_addr(2));

        table.forget(["glBlendColorEXT"]);
        assert!(table.is_resolved("glBegin"));
        assert!(!table.contains("glBlendColorEXT"));
        assert!(!table.contains("glBlendColor"));
        assert_eq!(table.aliases().count(), 0);
    }

    #[test]
    fn test_overwrite_on_rerun() {
        let mut table = SymbolTable::new();
        table.set("glBegin", Some(fake_addr(1)));
        table.set("glBegin", Some(fake_addr(2)));
        assert_eq!(table.get("glBegin"), Some(fake_addr(2)));
        assert_eq!(table.len(), 1);
    }

    unsafe extern "C" fn answer_query(name: *const u8) -> *const c_void {
        let name = std::ffi::CStr::from_ptr(name as *const std::ffi::c_char);
        if name.to_bytes() == b"glKnownARB" {
            0x4242 as *const c_void
        } else {
            std::ptr::null()
        }
    }

    #[test]
    fn test_bootstrap_query_calls_through() {
        let addr = ProcAddr::new(answer_query as *const c_void).unwrap();
        let query = unsafe { BootstrapQuery::from_addr(addr) };
        assert_eq!(query.query("glKnownARB").map(|a| a.as_ptr() as usize), Some(0x4242));
        assert_eq!(query.query("glUnknown"), None);
        assert_eq!(query.query("bad\0name"), None);
    }
}
