//! End-to-end resolution through the public API
//!
//! Libraries are fabricated files plus in-memory symbol maps; the bootstrap
//! query is a real `extern "C"` function so the production query path runs.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use bogl::constants::BOOTSTRAP_SYMBOL;
use bogl::loader::{LibraryLoader, LibraryLocator, SearchPolicy};
use bogl::resolve::passes::EXTENSION_PASSES;
use bogl::resolve::{
    CapabilityContext, CapabilityResolver, DriverInfo, ExtensionSet, GlVersion, LibraryKind,
    ProcAddr, ResolutionPass, ResolverOptions, ResolverState,
};
use bogl::target::{
    BackendKind, BackendSelector, Binding, FramebufferApi, PbufferApi, PbufferVariant,
    RenderTarget, TargetFlags, TargetRequest, TextureId,
};
use bogl::BoglError;

// ========== Fixtures ==========

static COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir(PathBuf);

impl TempDir {
    fn new(tag: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "bogl-flow-{}-{}-{}",
            tag,
            std::process::id(),
            n
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    fn mkdir(&self, rel: &str) -> PathBuf {
        let dir = self.0.join(rel);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

thread_local! {
    static QUERY_ANSWERS: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());
}

unsafe extern "C" fn get_proc_address(name: *const u8) -> *const c_void {
    let name = CStr::from_ptr(name as *const c_char).to_string_lossy();
    QUERY_ANSWERS.with(|a| a.borrow().get(name.as_ref()).copied().unwrap_or(0)) as *const c_void
}

fn answer_queries(names: &[&str]) {
    QUERY_ANSWERS.with(|a| {
        let mut a = a.borrow_mut();
        a.clear();
        for (i, name) in names.iter().enumerate() {
            a.insert(name.to_string(), 0x9000 + i * 16);
        }
    });
}

fn addr(n: usize) -> ProcAddr {
    ProcAddr::new((0x1000 + n * 16) as *const c_void).unwrap()
}

/// Symbol maps keyed by file name
struct MapLoader {
    libraries: HashMap<String, HashMap<String, ProcAddr>>,
}

impl LibraryLoader for MapLoader {
    type Library = HashMap<String, ProcAddr>;

    fn load(&self, path: &Path) -> bogl::Result<Self::Library> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.libraries
            .get(&name)
            .cloned()
            .ok_or_else(|| BoglError::LibraryLoad {
                path: path.to_path_buf(),
                reason: "not a GL library".into(),
            })
    }
}

static CORE: &[ResolutionPass] = &[
    ResolutionPass::core("GL_VERSION_1_1", LibraryKind::Gl, &["glBegin", "glEnd", "glGetString"]),
    ResolutionPass::core("GL_VERSION_1_2", LibraryKind::Gl, &["glDrawRangeElements"]),
];

fn gl_library(missing: Option<&str>) -> HashMap<String, ProcAddr> {
    const EXPORTS: [&str; 4] = ["glBegin", "glEnd", "glGetString", "glDrawRangeElements"];
    let mut lib: HashMap<String, ProcAddr> = EXPORTS
        .iter()
        .enumerate()
        .filter(|(_, n)| Some(**n) != missing)
        .map(|(i, n)| (n.to_string(), addr(i)))
        .collect();
    lib.insert(
        BOOTSTRAP_SYMBOL.to_string(),
        ProcAddr::new(get_proc_address as *const c_void).unwrap(),
    );
    lib
}

fn resolver(dirs: Vec<PathBuf>, gl: HashMap<String, ProcAddr>) -> CapabilityResolver<MapLoader> {
    let mut libraries = HashMap::new();
    libraries.insert("libGL.so.1".to_string(), gl);
    let policy = SearchPolicy {
        system_dirs: dirs,
        ..SearchPolicy::default()
    };
    CapabilityResolver::new(
        LibraryLocator::new(MapLoader { libraries }, policy),
        ResolverOptions::default(),
    )
    .with_passes(CORE, &[], EXTENSION_PASSES)
}

fn gl_dir(tmp: &TempDir) -> PathBuf {
    let dir = tmp.mkdir("lib");
    std::fs::write(dir.join("libGL.so.1"), b"").unwrap();
    dir
}

fn driver(extensions: &str) -> DriverInfo {
    DriverInfo::new(GlVersion::new(2, 1), ExtensionSet::parse(extensions))
}

// ========== Mock GPU / windowing system ==========

#[derive(Default)]
struct CountingFramebuffers {
    calls: Cell<usize>,
}

impl FramebufferApi for CountingFramebuffers {
    type Framebuffer = u32;
    type Renderbuffer = u32;

    fn gen_framebuffer(&self) -> Result<u32, String> {
        self.calls.set(self.calls.get() + 1);
        Ok(1)
    }
    fn destroy_framebuffer(&self, _framebuffer: u32) {}
    fn bind_target(&self, _framebuffer: Option<u32>) {
        self.calls.set(self.calls.get() + 1);
    }
    fn gen_renderbuffer(&self) -> Result<u32, String> {
        Ok(2)
    }
    fn allocate_renderbuffer(&self, _rb: u32, _format: u32, _w: i32, _h: i32) {}
    fn destroy_renderbuffer(&self, _rb: u32) {}
    fn attach_texture(&self, _attachment: u32, _texture: TextureId) {}
    fn attach_renderbuffer(&self, _attachment: u32, _rb: u32) {}
    fn framebuffer_status(&self) -> u32 {
        glow::FRAMEBUFFER_COMPLETE
    }
    fn finish_rendering(&self) {}
}

/// Counts every call; any call at all means the pbuffer path ran
#[derive(Default)]
struct CountingPbuffers {
    calls: Cell<usize>,
}

impl CountingPbuffers {
    fn hit(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl PbufferApi for CountingPbuffers {
    type Config = u32;
    type Drawable = u32;
    type Context = u32;

    fn variant(&self) -> Option<PbufferVariant> {
        self.hit();
        Some(PbufferVariant::Glx13)
    }
    fn choose_config(&self, _v: PbufferVariant, _attribs: &[i32]) -> Option<u32> {
        self.hit();
        Some(1)
    }
    fn create_pbuffer(
        &self,
        _v: PbufferVariant,
        _c: u32,
        _w: u32,
        _h: u32,
        _a: &[i32],
    ) -> Option<u32> {
        self.hit();
        Some(1)
    }
    fn create_context(&self, _v: PbufferVariant, _c: u32, _f: TargetFlags) -> Option<u32> {
        self.hit();
        Some(1)
    }
    fn current(&self) -> Binding<u32, u32> {
        self.hit();
        Binding::single(None, None)
    }
    fn make_current(&self, _v: PbufferVariant, _b: Binding<u32, u32>) -> bool {
        self.hit();
        true
    }
    fn copy_to_texture(&self, _t: TextureId, _w: u32, _h: u32) {
        self.hit();
    }
    fn destroy_context(&self, _c: u32) {
        self.hit();
    }
    fn destroy_pbuffer(&self, _v: PbufferVariant, _d: u32) {
        self.hit();
    }
}

// ========== Scenarios ==========

#[test]
fn empty_search_dirs_report_library_not_found() {
    let tmp = TempDir::new("empty");
    let empty = tmp.mkdir("nothing");
    let resolver = resolver(vec![empty], gl_library(None));

    let mut caps = CapabilityContext::new();
    let err = resolver.resolve_core(&mut caps).unwrap_err();
    assert_eq!(
        err,
        BoglError::LibraryNotFound {
            name: "GL".into(),
            searched: 1
        }
    );
    assert!(matches!(caps.state(), ResolverState::CoreFailed(_)));
}

#[test]
fn missing_core_symbol_is_fatal_and_named() {
    let tmp = TempDir::new("missing");
    let resolver = resolver(vec![gl_dir(&tmp)], gl_library(Some("glDrawRangeElements")));

    let mut caps = CapabilityContext::new();
    let err = resolver.resolve(&mut caps, &driver("")).unwrap_err();
    assert_eq!(
        err,
        BoglError::SymbolMissing {
            pass: "GL_VERSION_1_2",
            symbol: "glDrawRangeElements"
        }
    );
    assert!(err.to_string().contains("glDrawRangeElements"));

    // Terminal: a second attempt re-reports without resolving again
    assert!(matches!(
        resolver.resolve(&mut caps, &driver("")),
        Err(BoglError::InitFailed(_))
    ));
}

#[test]
fn empty_extension_string_reaches_ready_with_core_only() {
    let tmp = TempDir::new("noext");
    let resolver = resolver(vec![gl_dir(&tmp)], gl_library(None));
    answer_queries(&["glFramebufferTexture2DEXT", "glActiveTextureARB"]);

    let mut caps = CapabilityContext::new();
    resolver.resolve(&mut caps, &driver("")).unwrap();

    assert!(caps.is_ready());
    assert!(caps.table().is_resolved("glDrawRangeElements"));
    // Gated passes never ran, so nothing beyond the core was attempted
    assert!(!caps.table().contains("glFramebufferTexture2DEXT"));
    assert!(!caps.table().contains("glActiveTextureARB"));
    assert!(!caps.table().is_resolved("glFramebufferTexture2D"));
}

#[test]
fn fbo_selected_and_pbuffer_path_untouched() {
    let tmp = TempDir::new("fbo");
    let resolver = resolver(vec![gl_dir(&tmp)], gl_library(None));
    answer_queries(&[
        "glIsRenderbufferEXT",
        "glBindRenderbufferEXT",
        "glDeleteRenderbuffersEXT",
        "glGenRenderbuffersEXT",
        "glRenderbufferStorageEXT",
        "glGetRenderbufferParameterivEXT",
        "glIsFramebufferEXT",
        "glBindFramebufferEXT",
        "glDeleteFramebuffersEXT",
        "glGenFramebuffersEXT",
        "glCheckFramebufferStatusEXT",
        "glFramebufferTexture1DEXT",
        "glFramebufferTexture2DEXT",
        "glFramebufferTexture3DEXT",
        "glFramebufferRenderbufferEXT",
        "glGetFramebufferAttachmentParameterivEXT",
        "glGenerateMipmapEXT",
    ]);

    let mut caps = CapabilityContext::new();
    resolver
        .resolve(&mut caps, &driver("GL_EXT_framebuffer_object"))
        .unwrap();
    assert!(caps.table().is_resolved("glFramebufferTexture2D"));
    assert_eq!(
        caps.table().get("glFramebufferTexture2D"),
        caps.table().get("glFramebufferTexture2DEXT")
    );

    let framebuffers = CountingFramebuffers::default();
    let pbuffers = CountingPbuffers::default();
    let request = TargetRequest::new(32, 32, TargetFlags::RGBA | TargetFlags::DEPTH)
        .with_color_texture(TextureId::new(4).unwrap());

    let mut target = RenderTarget::create(
        request,
        &BackendSelector::new(),
        &caps,
        &framebuffers,
        Some(&pbuffers),
    )
    .unwrap();
    assert_eq!(target.backend(), BackendKind::Fbo);
    assert!(target.is_valid());
    target.enable().unwrap();
    target.disable().unwrap();
    drop(target);

    assert!(framebuffers.calls.get() > 0);
    assert_eq!(pbuffers.calls.get(), 0);
}

#[test]
fn pbuffer_chosen_without_fbo_extension() {
    let tmp = TempDir::new("pbuffer");
    let resolver = resolver(vec![gl_dir(&tmp)], gl_library(None));
    answer_queries(&[]);

    let mut caps = CapabilityContext::new();
    resolver.resolve(&mut caps, &driver("GL_ARB_multitexture")).unwrap();

    let framebuffers = CountingFramebuffers::default();
    let pbuffers = CountingPbuffers::default();
    let request = TargetRequest::new(16, 16, TargetFlags::RGB);

    let target = RenderTarget::create(
        request,
        &BackendSelector::new(),
        &caps,
        &framebuffers,
        Some(&pbuffers),
    )
    .unwrap();
    assert_eq!(target.backend(), BackendKind::Pbuffer);
    assert!(target.is_valid());
    assert_eq!(framebuffers.calls.get(), 0);

    // Without a windowing-system API the pbuffer path cannot be built
    let err = RenderTarget::<CountingFramebuffers, CountingPbuffers>::create(
        request,
        &BackendSelector::new(),
        &caps,
        &framebuffers,
        None,
    );
    assert!(matches!(err, Err(BoglError::PbufferStep { .. })));
}
