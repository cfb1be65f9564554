#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const CONFIG: &str = "[group]\nname = \"Ujirani Mwema\"\nmonthly_due = 5000\n";

pub const ROSTER: &str = "id,name,phone,enrolled,active\n\
                          M-01,Asha Mwita,,2024-01-05,true\n";

/// A scratch directory holding the files one CLI run needs.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes the standard config, one-member roster and the given operations.
    pub fn import_files(&self, operations: &str) -> (PathBuf, PathBuf, PathBuf) {
        (
            self.write("ledger.toml", CONFIG),
            self.write("members.csv", ROSTER),
            self.write("operations.csv", operations),
        )
    }
}
