//! Templates loaded from a directory on disk.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Component, Path, PathBuf};

use crate::template::{TemplateError, TemplateRenderer};

/// Serves page files from under `root`.
///
/// Request paths are resolved relative to the root; any path that would leave it
/// (`..`, absolute prefixes) is reported as not found.
#[derive(Debug, Clone)]
pub struct FileTemplateResolver {
    root: PathBuf,
}

impl FileTemplateResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl TemplateRenderer for FileTemplateResolver {
    fn render(&self, path: &str) -> Result<Box<dyn Read + Send>, TemplateError> {
        let not_found = || TemplateError::ResourceNotFound(path.to_string());
        let location = self.locate(path).ok_or_else(not_found)?;

        match File::open(&location) {
            Ok(file) if location.is_file() => Ok(Box::new(BufReader::new(file))),
            Ok(_) => Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(source) => Err(TemplateError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/index.html"), "<h1>index</h1>").unwrap();
        dir
    }

    #[test]
    fn test_renders_file_under_root() {
        let dir = scratch_dir();
        let resolver = FileTemplateResolver::new(dir.path());
        let mut body = String::new();
        resolver
            .render("/pages/index.html")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<h1>index</h1>");
    }

    #[test]
    fn test_missing_directory_and_traversal_are_not_found() {
        let dir = scratch_dir();
        let resolver = FileTemplateResolver::new(dir.path());
        for path in ["/pages/missing.html", "/pages", "/../etc/passwd", "/", ""] {
            assert!(
                matches!(resolver.render(path), Err(TemplateError::ResourceNotFound(_))),
                "{path} should not resolve"
            );
        }
    }
}
