//! Dynamic loader configuration (ld.so.conf) parsing
//!
//! Format:
//! - `/dir` lines name a search directory
//! - `include PATTERN` recursively parses other files (globs allowed)
//! - `#` starts a comment
//!
//! Relative include patterns are resolved against the including file's directory.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use log::{debug, trace};

/// Collect search directories from a loader config file and everything it includes
pub fn parse_loader_config(path: &Path) -> Vec<PathBuf> {
    let mut parser = LoaderConfigParser::default();
    parser.parse_file(path);
    parser.dirs
}

#[derive(Default)]
struct LoaderConfigParser {
    scanned: HashSet<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl LoaderConfigParser {
    fn parse_file(&mut self, path: &Path) {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !self.scanned.insert(key) {
            trace!("ld.so.conf: already scanned {}", path.display());
            return;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("ld.so.conf: cannot read {}: {}", path.display(), e);
                return;
            }
        };

        let base = path.parent().unwrap_or_else(|| Path::new("/"));

        for raw in content.lines() {
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();

            if line.starts_with('/') {
                // libc5-era "dir=TYPE" suffixes and trailing tokens are ignored
                let dir = line
                    .split(|c: char| c.is_whitespace() || c == '=')
                    .next()
                    .unwrap_or(line);
                let dir = PathBuf::from(dir);
                if !self.dirs.contains(&dir) {
                    self.dirs.push(dir);
                }
            } else if let Some(rest) = line.strip_prefix("include") {
                if !rest.starts_with(char::is_whitespace) {
                    continue;
                }
                for pattern in rest.split_whitespace() {
                    let pattern = base.join(pattern);
                    for file in expand_wildcards(&pattern) {
                        self.parse_file(&file);
                    }
                }
            }
        }
    }
}

/// Expand `*` and `?` segment by segment. Non-wildcard patterns yield
/// themselves if they exist. Matches are returned in name order.
pub fn expand_wildcards(pattern: &Path) -> Vec<PathBuf> {
    let mut current: Vec<PathBuf> = vec![PathBuf::new()];

    for component in pattern.components() {
        let segment = match component {
            Component::Normal(s) => s.to_string_lossy().into_owned(),
            other => {
                for p in &mut current {
                    p.push(other.as_os_str());
                }
                continue;
            }
        };

        if !has_wildcard(&segment) {
            for p in &mut current {
                p.push(&segment);
            }
            continue;
        }

        let mut next = Vec::new();
        for base in &current {
            let dir = if base.as_os_str().is_empty() {
                Path::new(".")
            } else {
                base.as_path()
            };
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            let mut names: Vec<String> = entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| wildcard_match(&segment, name))
                .collect();
            names.sort();
            next.extend(names.into_iter().map(|n| base.join(n)));
        }
        current = next;
    }

    current.retain(|p| !p.as_os_str().is_empty() && p.exists());
    current
}

pub(crate) fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Shell-style match supporting `*` and `?`. A leading dot must be matched literally.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }

    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
