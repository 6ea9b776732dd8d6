//! bogl-probe - report what the GL driver provides
//!
//! Locates and resolves libGL with the same search rules as the library,
//! creates a headless context to read the extension string and tries the
//! render target backend that would be chosen.

mod probe;

use anyhow::{anyhow, Result};
use log::info;

use bogl::config::Config;
use probe::ProbeOptions;

/// Print help message
fn print_help() {
    println!(
        r#"bogl-probe {} - OpenGL entry-point and render target probe

USAGE:
    bogl-probe [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --lib NAME|PATH         GL library to resolve (default: config or "GL")
    --glu NAME|PATH         Also resolve GLU from this library
    --no-context            Stop after core resolution (no EGL context)

ENVIRONMENT:
    LD_LIBRARY_PATH         Searched before ld.so.conf and system directories
    BOGL_CONFIG             Config file path
    BOGL_GL_LIBRARY         Overrides [library] gl
    BOGL_DISABLE_EXTENSIONS Extra disabled tokens (comma separated)
    BOGL_FORCE_PBUFFER      1 to always choose pbuffer targets
    RUST_LOG                Log filter (default: warn)

CONFIG FILE:
    ~/.config/bogl/config.toml
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Value following `flag`, if the flag is present
fn flag_value(args: &[String], flag: &str) -> Result<Option<String>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .filter(|v| !v.starts_with('-'))
            .cloned()
            .map(Some)
            .ok_or_else(|| anyhow!("{} requires a value", flag)),
        None => Ok(None),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Check command line arguments
    let args: Vec<String> = std::env::args().collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("bogl-probe {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let opts = ProbeOptions {
        gl_library: flag_value(&args, "--lib")?,
        glu_library: flag_value(&args, "--glu")?,
        no_context: args.iter().any(|a| a == "--no-context"),
    };

    info!("bogl-probe starting...");
    let config = Config::load();
    probe::run(&config, &opts)
}
