use crate::error::{Result, SpoonError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const STATE_FILE: &str = ".spoon-state.json";
pub const CONFIG_FILE: &str = "spoon.yaml";
pub const GLOBAL_CONFIG_FILE: &str = ".config/spoon/config.yaml";

pub const LOCK_SUFFIX: &str = ".lock";
pub const CORRUPT_SUFFIX: &str = ".corrupt";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Resolve the state file. Relative names are taken from `root`.
pub fn state_path(root: &Path, file_name: &str) -> PathBuf {
    let p = Path::new(file_name);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn global_config_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(SpoonError::HomeNotFound)?;
    Ok(home.join(GLOBAL_CONFIG_FILE))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Sidecar file holding the advisory lock for `state`.
pub fn lock_path(state: &Path) -> PathBuf {
    with_suffix(state, LOCK_SUFFIX)
}

/// Where an unreadable state file is moved aside to.
pub fn corrupt_path(state: &Path) -> PathBuf {
    with_suffix(state, CORRUPT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            state_path(root, STATE_FILE),
            PathBuf::from("/tmp/proj/.spoon-state.json")
        );
        assert_eq!(
            state_path(root, "/var/spoon.json"),
            PathBuf::from("/var/spoon.json")
        );
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/spoon.yaml"));
    }

    #[test]
    fn sidecar_paths_keep_full_name() {
        let state = Path::new("/tmp/proj/.spoon-state.json");
        assert_eq!(
            lock_path(state),
            PathBuf::from("/tmp/proj/.spoon-state.json.lock")
        );
        assert_eq!(
            corrupt_path(state),
            PathBuf::from("/tmp/proj/.spoon-state.json.corrupt")
        );
    }
}
