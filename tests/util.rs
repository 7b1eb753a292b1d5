#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Builds a tree `depth` levels deep where every directory holds `branching`
/// subdirectories (except the last level) and `files_per_dir` files.
/// Every file whose index is even contains `needle`.
pub fn create_tree(
    dir: &Path,
    depth: usize,
    branching: usize,
    files_per_dir: usize,
) -> io::Result<()> {
    if depth == 0 {
        return Ok(());
    }

    for i in 0..files_per_dir {
        let content = if i % 2 == 0 {
            format!("line one\nthe needle {i}\n")
        } else {
            format!("nothing to see {i}\n")
        };
        fs::write(dir.join(format!("file_{i}.txt")), content)?;
    }

    if depth > 1 {
        for i in 0..branching {
            let sub = dir.join(format!("subdir_{i}"));
            fs::create_dir(&sub)?;
            create_tree(&sub, depth - 1, branching, files_per_dir)?;
        }
    }
    Ok(())
}

/// Counts directories (including `root`) and regular files with walkdir.
pub fn count_entries(root: &Path) -> (usize, usize) {
    let mut dirs = 0;
    let mut files = 0;
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = entry.expect("walkdir failed");
        if entry.file_type().is_dir() {
            dirs += 1;
        } else if entry.file_type().is_file() {
            files += 1;
        }
    }
    (dirs, files)
}

/// The scenario from the README: one matching file at the root, one
/// non-matching file in a subdirectory.
pub fn needle_haystack(root: &Path) -> io::Result<(PathBuf, PathBuf, PathBuf)> {
    let sub = root.join("sub");
    fs::create_dir(&sub)?;
    let a = root.join("a.txt");
    let b = sub.join("b.txt");
    fs::write(&a, "needle")?;
    fs::write(&b, "haystack")?;
    Ok((sub, a, b))
}
