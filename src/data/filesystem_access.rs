//! Well-known directories the service looks in for model files.

use std::path::PathBuf;

const APP_DIR: &str = "headcount";

#[derive(Debug, Clone, Copy)]
pub enum FsAccess {
    Cache,
    Current,
}

impl FsAccess {
    /// Base directory for this kind, e.g. `~/.cache` on Linux.
    pub fn raw_path(&self) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Cache => dirs::cache_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        base_path.ok_or_else(|| {
            anyhow::anyhow!("Unsupported operating system. Supported OS: Linux, MacOS, Windows.")
        })
    }

    /// `<base>/headcount`, e.g. `~/.cache/headcount`. Not created on disk.
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        let mut path = self.raw_path()?;
        if !matches!(self, FsAccess::Current) {
            path.push(APP_DIR);
        }
        Ok(path)
    }

    /// `<base>/headcount/<file>`, falling back to `./<file>` when the base
    /// directory cannot be resolved.
    pub fn file_or_local(&self, file: &str) -> PathBuf {
        match self.path() {
            Ok(dir) => dir.join(file),
            Err(_) => PathBuf::from(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_dir_has_no_app_subdir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(FsAccess::Current.path().unwrap(), cwd);
        assert_eq!(FsAccess::Current.file_or_local("m.onnx"), cwd.join("m.onnx"));
    }
}
