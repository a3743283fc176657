use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=CODESHOT_GIT_HASH={hash}");

    if let Some(git_dir) = resolve_git_dir() {
        for name in ["HEAD", "refs", "packed-refs"] {
            emit_rerun(&git_dir.join(name));
        }
    }
}

fn resolve_git_dir() -> Option<PathBuf> {
    if let Some(from_env) = env::var_os("GIT_DIR") {
        return Some(PathBuf::from(from_env));
    }

    let dot_git = PathBuf::from(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }

    gitdir_from_file(&dot_git)
}

/// Worktrees and submodules point at the real directory from a `.git` file;
/// relative targets are resolved against the directory holding that file.
pub(crate) fn gitdir_from_file(dot_git: &Path) -> Option<PathBuf> {
    let contents = fs::read_to_string(dot_git).ok()?;
    let rest = contents.strip_prefix("gitdir:")?;
    let mut resolved = PathBuf::from(rest.trim());
    if resolved.is_relative()
        && let Some(parent) = dot_git.parent()
    {
        resolved = parent.join(resolved);
    }
    Some(resolved)
}

fn emit_rerun(path: &Path) {
    if path.exists()
        && let Some(display) = path.to_str()
    {
        println!("cargo:rerun-if-changed={display}");
    }
}
