//! Paths and common operations for the `kin/` directory.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Walk upward from `start` to find the directory containing `kin/tree.json`.
pub fn find_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("kin").join("tree.json").exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => bail!("no family tree found; run `kin init` to start one here"),
        }
    }
}

/// Walk upward from the current working directory to find the tree root.
pub fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_root_from(&cwd)
}

pub fn kin_dir(root: &Path) -> PathBuf {
    root.join("kin")
}

pub fn tree_path(root: &Path) -> PathBuf {
    root.join("kin").join("tree.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_root_from_direct() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("kin")).unwrap();
        fs::write(dir.path().join("kin/tree.json"), "{}").unwrap();
        let root = find_root_from(dir.path()).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn find_root_from_subdir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("kin")).unwrap();
        fs::write(dir.path().join("kin/tree.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("notes/deep")).unwrap();
        let root = find_root_from(&dir.path().join("notes/deep")).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn find_root_fails_without_init() {
        let dir = TempDir::new().unwrap();
        assert!(find_root_from(dir.path()).is_err());
    }
}
