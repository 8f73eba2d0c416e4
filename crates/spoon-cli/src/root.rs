use spoon_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the directory holding the state file.
///
/// Priority:
/// 1. `--root` flag / `SPOON_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` with a state file
/// 3. Nearest ancestor of `cwd` with `.git/`
/// 4. `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, |dir| dir.join(paths::STATE_FILE).is_file())
        .or_else(|| find_upward(&cwd, |dir| dir.join(".git").is_dir()))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| found(dir))
        .map(Path::to_path_buf)
}
