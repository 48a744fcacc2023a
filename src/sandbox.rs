//! Scratch directory lifecycle and path containment.
//!
//! Every command a tutorial runs is confined to a per-run temporary
//! directory. Before anything spawns, the working directory and every
//! argument that names an existing filesystem entry are resolved (symlinks
//! included) and must stay under the scratch root.
//!
//! Arguments that do not exist yet cannot be judged and pass unchecked, so
//! this is a best-effort guard against mistakes, not a security boundary.
use crate::error::{Result, TutorError};
use crate::exec::CommandLine;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// A per-run scratch directory, removed on [`Sandbox::close`] or drop.
#[derive(Debug)]
pub struct Sandbox {
    root: PathBuf,
    dir: TempDir,
}

impl Sandbox {
    /// Create a fresh scratch directory, optionally seeded from `template`.
    ///
    /// The template's top-level entries are copied into the scratch root;
    /// symlinks are recreated as symlinks rather than followed.
    pub fn create(prefix: Option<&str>, template: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        if let Some(prefix) = prefix {
            builder.prefix(prefix);
        }
        let dir = builder
            .tempdir()
            .map_err(|err| TutorError::io("create scratch directory", err))?;
        let root = dir
            .path()
            .canonicalize()
            .map_err(|err| TutorError::io("resolve scratch directory", err))?;

        if let Some(template) = template {
            copy_tree(template, &root)?;
            tracing::info!(
                root = %root.display(),
                template = %template.display(),
                "scratch directory seeded"
            );
        } else {
            tracing::info!(root = %root.display(), "scratch directory created");
        }
        Ok(Self { root, dir })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the scratch directory, reporting any failure.
    pub fn close(self) -> Result<()> {
        let root = self.root;
        self.dir
            .close()
            .map_err(|err| TutorError::io(format!("remove {}", root.display()), err))?;
        tracing::debug!(root = %root.display(), "scratch directory removed");
        Ok(())
    }
}

/// Copy the contents of `src` into `dest`, preserving symlinks.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    let entries =
        fs::read_dir(src).map_err(|err| TutorError::io(format!("read {}", src.display()), err))?;
    for entry in entries {
        let entry = entry.map_err(|err| TutorError::io(format!("read {}", src.display()), err))?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|err| TutorError::io(format!("stat {}", path.display()), err))?;
        if file_type.is_symlink() {
            let link = fs::read_link(&path)
                .map_err(|err| TutorError::io(format!("read link {}", path.display()), err))?;
            copy_symlink(&link, &target)?;
        } else if file_type.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|err| TutorError::io(format!("create {}", target.display()), err))?;
            copy_tree(&path, &target)?;
        } else {
            fs::copy(&path, &target)
                .map_err(|err| TutorError::io(format!("copy {}", path.display()), err))?;
        }
    }
    Ok(())
}

fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(link, target)
            .map_err(|err| TutorError::io(format!("create symlink {}", target.display()), err))
    }
    #[cfg(not(unix))]
    {
        let _ = link;
        Err(TutorError::io(
            format!("create symlink {}", target.display()),
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "symlinks are unsupported on this platform",
            ),
        ))
    }
}

/// Resolve `path` the way `realpath` does without requiring it to exist.
///
/// Each existing prefix is canonicalized, so symlinks and `..` are resolved
/// against the real filesystem; missing components are kept lexically.
pub fn resolve_path(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = resolved.canonicalize() {
                    resolved = real;
                }
            }
        }
    }
    resolved
}

fn ensure_inside(root: &Path, path: &Path) -> Result<PathBuf> {
    let real_root = resolve_path(root);
    let real_path = resolve_path(path);
    if real_path.starts_with(&real_root) {
        Ok(real_path)
    } else {
        tracing::warn!(
            path = %path.display(),
            resolved = %real_path.display(),
            root = %real_root.display(),
            "path escapes scratch directory"
        );
        Err(TutorError::SandboxEscape {
            path: path.to_path_buf(),
            root: real_root,
        })
    }
}

/// Require the working directory to live under the scratch root.
///
/// Returns the resolved directory.
pub fn check_exec_dir(root: &Path, dir: &Path) -> Result<PathBuf> {
    ensure_inside(root, dir)
}

/// Require every argument naming an existing path to live under the root.
///
/// Relative arguments are resolved against `dir`, the directory the
/// command will run in. Every argument is checked whole; one that also
/// holds several shell words (a quoted sub-command) is split again and
/// every piece is checked too.
pub fn check_command(root: &Path, dir: &Path, command: &CommandLine) -> Result<()> {
    let tokens = match command {
        CommandLine::Argv(argv) => argv.clone(),
        CommandLine::Shell(script) => {
            shell_words::split(script).unwrap_or_else(|_| vec![script.clone()])
        }
    };
    check_tokens(root, dir, &tokens)
}

fn check_tokens(root: &Path, dir: &Path, tokens: &[String]) -> Result<()> {
    for token in tokens {
        check_token(root, dir, token)?;
        let words = shell_words::split(token).unwrap_or_default();
        match words.as_slice() {
            [] => {}
            [word] if word == token => {}
            [word] => check_token(root, dir, word)?,
            _ => check_tokens(root, dir, &words)?,
        }
    }
    Ok(())
}

/// Check `token` as a path, and the value of a `--opt=value` token.
fn check_token(root: &Path, dir: &Path, token: &str) -> Result<()> {
    check_path(root, dir, token)?;
    if token.starts_with('-') {
        if let Some((_, value)) = token.split_once('=') {
            check_path(root, dir, value)?;
        }
    }
    Ok(())
}

fn check_path(root: &Path, dir: &Path, token: &str) -> Result<()> {
    if token.is_empty() {
        return Ok(());
    }
    let candidate = dir.join(token);
    if !candidate.exists() {
        return Ok(());
    }
    ensure_inside(root, &candidate)?;
    Ok(())
}
