//! Cache directory resolution
//!
//! The cache root depends on the debug flag: debug builds write to the
//! external cache root so files are easy to inspect, release builds to the
//! internal one. Every directory handed out is created on demand; a failed
//! creation is logged and the path is still returned.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::dirs;

/// Roots the cache directories are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirs {
    internal_cache_root: PathBuf,
    external_cache_root: Option<PathBuf>,
    external_storage_root: Option<PathBuf>,
    package_name: String,
    debug: bool,
}

impl CacheDirs {
    pub fn new(
        internal_cache_root: impl Into<PathBuf>,
        external_cache_root: Option<PathBuf>,
        external_storage_root: Option<PathBuf>,
        package_name: impl Into<String>,
        debug: bool,
    ) -> Self {
        Self {
            internal_cache_root: internal_cache_root.into(),
            external_cache_root,
            external_storage_root,
            package_name: package_name.into(),
            debug,
        }
    }

    /// Derive the roots from the platform directories
    ///
    /// - internal cache root: `<cache dir>/<package>`
    /// - external cache root: `<data local dir>/<package>/cache`
    /// - external storage root: the user's home directory
    ///
    /// Falls back to the system temp directory when the platform has no
    /// cache directory.
    pub fn from_system(package_name: &str, debug: bool) -> Self {
        let internal = ::dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(package_name);
        let external = ::dirs::data_local_dir().map(|d| d.join(package_name).join("cache"));
        let storage = ::dirs::home_dir();
        Self::new(internal, external, storage, package_name, debug)
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Internal cache root, regardless of the debug flag
    pub fn internal_cache_root(&self) -> &Path {
        &self.internal_cache_root
    }

    pub fn external_cache_root(&self) -> Option<&Path> {
        self.external_cache_root.as_deref()
    }

    pub fn external_storage_root(&self) -> Option<&Path> {
        self.external_storage_root.as_deref()
    }

    /// Cache root: the external one in debug mode when present, else internal
    pub fn cache_dir(&self) -> PathBuf {
        let root = match (&self.external_cache_root, self.debug) {
            (Some(external), true) => external.clone(),
            _ => self.internal_cache_root.clone(),
        };
        create_dir_if_needed(&root);
        root
    }

    /// `<cache dir>/images`
    pub fn image_cache_dir(&self) -> PathBuf {
        let dir = self.cache_dir().join(dirs::DIR_IMAGES);
        create_dir_if_needed(&dir);
        dir
    }

    /// `<cache dir>/datas`
    pub fn data_cache_dir(&self) -> PathBuf {
        let dir = self.cache_dir().join(dirs::DIR_DATAS);
        create_dir_if_needed(&dir);
        dir
    }

    /// `<external cache root>/logs`, or under the internal root without one
    pub fn log_dir(&self) -> PathBuf {
        let root = self
            .external_cache_root
            .as_ref()
            .unwrap_or(&self.internal_cache_root);
        let dir = root.join(dirs::DIR_LOGS);
        create_dir_if_needed(&dir);
        dir
    }

    /// `<external storage>/<package>`, or `None` without external storage
    pub fn sd_root_dir(&self) -> Option<PathBuf> {
        let root = self
            .external_storage_root
            .as_ref()?
            .join(&self.package_name);
        create_dir_if_needed(&root);
        Some(root)
    }

    pub fn sd_image_dir(&self) -> Option<PathBuf> {
        self.sd_sub_dir(dirs::DIR_IMAGES)
    }

    pub fn sd_data_dir(&self) -> Option<PathBuf> {
        self.sd_sub_dir(dirs::DIR_DATAS)
    }

    pub fn sd_temp_dir(&self) -> Option<PathBuf> {
        self.sd_sub_dir(dirs::DIR_TMP)
    }

    fn sd_sub_dir(&self, name: &str) -> Option<PathBuf> {
        let dir = self.sd_root_dir()?.join(name);
        create_dir_if_needed(&dir);
        Some(dir)
    }
}

/// Create `path` if it does not exist; returns whether it exists afterwards
fn create_dir_if_needed(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }
    match std::fs::create_dir_all(path) {
        Ok(()) => {
            debug!("createDirIfNeed, create success, dir:{}", path.display());
            true
        }
        Err(e) => {
            warn!("createDirIfNeed, create failed, dir:{}, {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs_in(temp: &TempDir, debug: bool, external: bool) -> CacheDirs {
        CacheDirs::new(
            temp.path().join("internal"),
            external.then(|| temp.path().join("external")),
            external.then(|| temp.path().join("sd")),
            "com.example.app",
            debug,
        )
    }

    #[test]
    fn test_debug_selects_external_root() {
        let temp = TempDir::new().unwrap();
        let cache = dirs_in(&temp, true, true);
        assert_eq!(cache.cache_dir(), temp.path().join("external"));

        let release = dirs_in(&temp, false, true);
        assert_eq!(release.cache_dir(), temp.path().join("internal"));
    }

    #[test]
    fn test_debug_without_external_falls_back() {
        let temp = TempDir::new().unwrap();
        let cache = dirs_in(&temp, true, false);
        assert_eq!(cache.cache_dir(), temp.path().join("internal"));
        assert_eq!(cache.log_dir(), temp.path().join("internal").join("logs"));
    }

    #[test]
    fn test_subdirectories_are_created() {
        let temp = TempDir::new().unwrap();
        let cache = dirs_in(&temp, false, true);

        let images = cache.image_cache_dir();
        let datas = cache.data_cache_dir();
        let logs = cache.log_dir();

        assert_eq!(images, temp.path().join("internal").join("images"));
        assert_eq!(datas, temp.path().join("internal").join("datas"));
        assert_eq!(logs, temp.path().join("external").join("logs"));
        assert!(images.is_dir());
        assert!(datas.is_dir());
        assert!(logs.is_dir());
    }

    #[test]
    fn test_sd_dirs() {
        let temp = TempDir::new().unwrap();
        let cache = dirs_in(&temp, true, true);
        let root = temp.path().join("sd").join("com.example.app");

        assert_eq!(cache.sd_root_dir(), Some(root.clone()));
        assert_eq!(cache.sd_image_dir(), Some(root.join("images")));
        assert_eq!(cache.sd_data_dir(), Some(root.join("datas")));
        assert_eq!(cache.sd_temp_dir(), Some(root.join("tmp")));
        assert!(root.join("tmp").is_dir());
    }

    #[test]
    fn test_sd_dirs_absent_without_storage() {
        let temp = TempDir::new().unwrap();
        let cache = dirs_in(&temp, true, false);
        assert!(cache.sd_root_dir().is_none());
        assert!(cache.sd_image_dir().is_none());
        assert!(cache.sd_data_dir().is_none());
        assert!(cache.sd_temp_dir().is_none());
    }

    #[test]
    fn test_uncreatable_dir_is_still_returned() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let cache = CacheDirs::new(&blocker, None, None, "pkg", false);
        let images = cache.image_cache_dir();
        assert_eq!(images, blocker.join("images"));
        assert!(!images.exists());
    }
}
