use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Find a free path for `filename` inside `dir`.
///
/// Tries `<dir>/<filename>` first, then `<base>_1<ext>`, `<base>_2<ext>`, ...
/// until `taken` says no. There is no upper bound on the counter.
pub fn unique_path_by(dir: &Path, filename: &str, taken: impl Fn(&Path) -> bool) -> PathBuf {
    let candidate = dir.join(filename);
    if !taken(&candidate) {
        return candidate;
    }

    let (base, ext) = split_extension(filename);
    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(format!("{}_{}{}", base, counter, ext));
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Free path judged only by what exists on disk right now
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    unique_path_by(dir, filename, |path| path.exists())
}

/// Split `name.ext` into (`name`, `.ext`). Leading dots belong to the
/// base, so `.bashrc` has no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading..].rfind('.') {
        Some(dot) => filename.split_at(leading + dot),
        None => (filename, ""),
    }
}

/// Hands out destination paths inside the cache directory.
///
/// On top of the on-disk check it remembers every path it has issued,
/// so two allocations made before either file is written (a download
/// still in flight, say) never receive the same path. Paths are handed
/// back with `release` when their file is deleted.
#[derive(Debug)]
pub struct CacheAllocator {
    dir: PathBuf,
    issued: HashSet<PathBuf>,
}

impl CacheAllocator {
    pub fn new(dir: PathBuf) -> Self {
        CacheAllocator {
            dir,
            issued: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn allocate(&mut self, filename: &str) -> PathBuf {
        let issued = &self.issued;
        let path = unique_path_by(&self.dir, filename, |p| p.exists() || issued.contains(p));
        self.issued.insert(path.clone());
        path
    }

    /// Whether `path` lives inside the cache directory. Paths that
    /// climb out with `..` never count.
    pub fn owns(&self, path: &Path) -> bool {
        path.starts_with(&self.dir)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }

    /// Hand a path back once its file is gone, so the name can be
    /// issued again
    pub fn release(&mut self, path: &Path) {
        self.issued.remove(path);
    }

    /// Forget everything issued so far (after the cache was wiped)
    pub fn reset(&mut self) {
        self.issued.clear();
    }
}
