//! Global constants for bogl
//!
//! Consolidates search paths, bootstrap symbol names and windowing-system
//! tokens to eliminate magic numbers throughout the codebase.

// ============================================================================
// Library Search
// ============================================================================

/// Dynamic linker search-path variable
#[cfg(target_os = "macos")]
pub const LINKER_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
#[cfg(target_os = "aix")]
pub const LINKER_PATH_VAR: &str = "LIBPATH";
#[cfg(not(any(target_os = "macos", target_os = "aix")))]
pub const LINKER_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Separator used inside the linker search-path variable
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Shared object suffix (versioned names like `.so.1.2` are matched by wildcard)
#[cfg(target_os = "macos")]
pub const SHARED_LIBRARY_SUFFIX: &str = "dylib";
#[cfg(not(target_os = "macos"))]
pub const SHARED_LIBRARY_SUFFIX: &str = "so";

/// Loader configuration consulted after the environment
pub const DEFAULT_LOADER_CONFIG: &str = "/etc/ld.so.conf";

/// Standard library directories (32 and 64 bit layouts)
pub const SYSTEM_LIBRARY_DIRS: &[&str] = &[
    "/lib",
    "/usr/lib",
    "/lib64",
    "/usr/lib64",
    "/lib32",
    "/usr/lib32",
    "/usr/local/lib",
    "/usr/local/lib64",
];

/// Vendor directory appended after the standard ones (legacy XFree86/X.org layout)
pub const VENDOR_LIBRARY_DIR: &str = "/usr/X11R6/lib";

// ============================================================================
// Resolution
// ============================================================================

/// Address-query entry point; must be exported directly by libGL
pub const BOOTSTRAP_SYMBOL: &str = "glXGetProcAddressARB";

/// Pass name used in diagnostics for the bootstrap lookup
pub const BOOTSTRAP_PASS: &str = "GLX_ARB_get_proc_address";

/// Extension tokens that make the FBO backend eligible
pub const FBO_EXTENSIONS: &[&str] = &["GL_EXT_framebuffer_object", "GL_ARB_framebuffer_object"];

/// Entry point the FBO backend cannot work without
pub const FBO_ATTACH_TEXTURE: &str = "glFramebufferTexture2D";

// ============================================================================
// GLX Tokens
// ============================================================================

pub const GLX_NONE: i32 = 0;
pub const GLX_TRUE: i32 = 1;
pub const GLX_FALSE: i32 = 0;
pub const GLX_DOUBLEBUFFER: i32 = 5;
pub const GLX_RED_SIZE: i32 = 8;
pub const GLX_GREEN_SIZE: i32 = 9;
pub const GLX_BLUE_SIZE: i32 = 10;
pub const GLX_ALPHA_SIZE: i32 = 11;
pub const GLX_DEPTH_SIZE: i32 = 12;
pub const GLX_EXTENSIONS: i32 = 3;

/// Shared by GLX 1.3 and GLX_SGIX_fbconfig (same token values)
pub const GLX_DRAWABLE_TYPE: i32 = 0x8010;
pub const GLX_RENDER_TYPE: i32 = 0x8011;
pub const GLX_RGBA_BIT: i32 = 0x0001;
pub const GLX_PBUFFER_BIT: i32 = 0x0004;
pub const GLX_RGBA_TYPE: i32 = 0x8014;

pub const GLX_PRESERVED_CONTENTS: i32 = 0x801B;
pub const GLX_LARGEST_PBUFFER: i32 = 0x801C;
pub const GLX_PBUFFER_HEIGHT: i32 = 0x8040;
pub const GLX_PBUFFER_WIDTH: i32 = 0x8041;

/// Pseudo extension token that turns off the GLX 1.3 pbuffer path
pub const GLX_VERSION_1_3_TOKEN: &str = "GLX_VERSION_1_3";

/// GLX_ARB_fbconfig_float
pub const GLX_RGBA_FLOAT_TYPE_ARB: i32 = 0x20B9;
pub const GLX_RGBA_FLOAT_BIT_ARB: i32 = 0x0004;

// ============================================================================
// Render Targets
// ============================================================================

/// Bits per color channel for fixed-point targets
pub const CHANNEL_BITS: i32 = 8;

/// Depth buffer bits requested for pbuffers
pub const DEPTH_BITS: i32 = 24;
