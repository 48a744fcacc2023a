//! Shared test infrastructure for integration tests.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate an executable on PATH so process tests can skip when it is absent.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// True when every named tool is available; logs the first missing one.
pub fn have_tools(names: &[&str]) -> bool {
    for name in names {
        if find_in_path(name).is_none() {
            eprintln!("Skipping: {name} not found on PATH");
            return false;
        }
    }
    true
}

/// Write `json` as `name` inside `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).expect("write script");
    path
}

/// A lesson template with a nested file and a relative symlink.
pub fn lesson_template() -> TempDir {
    let dir = tempfile::tempdir().expect("create template dir");
    fs::create_dir_all(dir.path().join("docs")).expect("create docs");
    fs::write(dir.path().join("docs/intro.txt"), "welcome\n").expect("write intro");
    #[cfg(unix)]
    std::os::unix::fs::symlink("docs/intro.txt", dir.path().join("intro-link"))
        .expect("create symlink");
    dir
}
