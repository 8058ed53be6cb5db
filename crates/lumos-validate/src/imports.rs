//! # Import Resolver
//!
//! Maps an import path (`common/geometry`) to a file on disk. Candidates
//! are `<dir>/<import>.msg` for each configured search directory in order,
//! then the importing file's own directory. The first existing file wins.
//!
//! Results, hits and misses alike, are cached per resolver instance. The
//! cache must be cleared with [`ImportResolver::clear_cache`] when the
//! files under the search directories change between runs.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use lumos_core::SOURCE_EXTENSION;

/// An import that matched no candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMiss {
    pub import: String,
    /// Every directory tried, in order.
    pub searched: Vec<PathBuf>,
}

impl fmt::Display for ImportMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dirs: Vec<String> = self
            .searched
            .iter()
            .map(|d| format!("'{}'", d.display()))
            .collect();
        write!(
            f,
            "cannot resolve import '{}': no {}.{} in search directories [{}]",
            self.import,
            normalize_import(&self.import),
            SOURCE_EXTENSION,
            dirs.join(", ")
        )
    }
}

type CacheKey = (String, Option<PathBuf>);

/// Resolves import paths against an ordered list of search directories.
#[derive(Debug)]
pub struct ImportResolver {
    search_paths: Vec<PathBuf>,
    cache: Mutex<HashMap<CacheKey, Option<PathBuf>>>,
}

/// Collapse repeated and surrounding slashes.
pub fn normalize_import(import: &str) -> String {
    import
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl ImportResolver {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Directories tried for an import from a file in `importing_dir`.
    pub fn search_dirs(&self, importing_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut dirs = self.search_paths.clone();
        if let Some(dir) = importing_dir {
            dirs.push(if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir.to_path_buf()
            });
        }
        dirs
    }

    /// Resolve `import` to an existing file.
    pub fn resolve_import(
        &self,
        import: &str,
        importing_dir: Option<&Path>,
    ) -> Result<PathBuf, ImportMiss> {
        let normalized = normalize_import(import);
        let key = (normalized.clone(), importing_dir.map(Path::to_path_buf));

        if let Some(cached) = self.cache.lock().get(&key) {
            return cached.clone().ok_or_else(|| ImportMiss {
                import: import.to_string(),
                searched: self.search_dirs(importing_dir),
            });
        }

        let file_name = format!("{normalized}.{SOURCE_EXTENSION}");
        let dirs = self.search_dirs(importing_dir);
        let found = dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file());

        match &found {
            Some(path) => tracing::debug!(import = %normalized, path = %path.display(), "import resolved"),
            None => tracing::debug!(import = %normalized, "import not found"),
        }
        self.cache.lock().insert(key, found.clone());

        found.ok_or(ImportMiss {
            import: import.to_string(),
            searched: dirs,
        })
    }

    /// Number of cached resolutions.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}
