use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway repository on disk, removed on drop.
pub struct FixtureRepo {
    dir: TempDir,
}

impl FixtureRepo {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}")),
        }
    }

    /// Builder form of [`FixtureRepo::write`].
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    pub fn with_binary(self, relative: &str, content: &[u8]) -> Self {
        self.write_bytes(relative, content);
        self
    }

    pub fn write(&self, relative: &str, content: &str) {
        self.write_bytes(relative, content.as_bytes());
    }

    pub fn write_bytes(&self, relative: &str, content: &[u8]) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("create {}: {e}", parent.display()));
        }
        std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    }

    pub fn remove(&self, relative: &str) {
        let path = self.path().join(relative);
        std::fs::remove_file(&path).unwrap_or_else(|e| panic!("remove {}: {e}", path.display()));
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// The three-file layout: two Python files of 10 and 20 lines plus a
    /// binary `c.txt`.
    pub fn three_file() -> Self {
        let a = "\
import os


def alpha(path):
    \"\"\"Read a file.\"\"\"
    return os.path.exists(path)


def beta():
    return alpha('x')
";
        let mut b = String::from("from a import alpha\n\n\nclass Gamma:\n");
        b.push_str("    def __init__(self):\n        self.items = []\n\n");
        b.push_str("    def add(self, item):\n        self.items.append(item)\n        return alpha(item)\n\n");
        b.push_str("    def size(self):\n        return len(self.items)\n\n\n");
        b.push_str("def delta():\n    g = Gamma()\n    g.add('y')\n    return g.size()\n");
        b.push_str("# end\n");
        Self::new()
            .with_file("a.py", a)
            .with_file("b.py", &b)
            .with_binary("c.txt", &[0x7f, b'E', b'L', b'F', 0x00, 0x01, 0x02])
    }
}

impl Default for FixtureRepo {
    fn default() -> Self {
        Self::new()
    }
}
