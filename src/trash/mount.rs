//! Mount-root resolution.
//!
//! # Platform Support
//!
//! - **Unix**: walk upward until the device id changes between a directory and
//!   its parent, or the directory is its own parent
//! - **Windows**: the drive (or UNC share) root of the path
//! - **Other**: the filesystem root
//!
//! The backend is selected at build time behind the [`MountResolver`] trait, so
//! callers never branch on the platform themselves.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Maps an arbitrary path to the root of the filesystem it lives on.
pub trait MountResolver: fmt::Debug + Send + Sync {
    /// Resolve the mount root owning `path`.
    ///
    /// `path` does not need to exist; resolution starts from its deepest
    /// existing ancestor.
    ///
    /// # Errors
    ///
    /// Fails only when a relative path cannot be made absolute.
    fn resolve_mount(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Resolver backed by the host platform's mount semantics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMountResolver;

impl MountResolver for SystemMountResolver {
    fn resolve_mount(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = absolutize(path)?;
        let mount = platform::find_mount(&absolute);
        log::trace!("Mount of {} is {}", path.display(), mount.display());
        Ok(mount)
    }
}

/// Resolver with a fixed list of mount roots.
///
/// A path under one of the configured roots resolves to the longest matching
/// root; anything else falls back to [`SystemMountResolver`]. Useful for
/// treating plain directories as separate devices.
#[derive(Debug, Default, Clone)]
pub struct FixedMountResolver {
    roots: Vec<PathBuf>,
}

impl FixedMountResolver {
    /// Create a resolver with no fixed roots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mount root. Relative or symlinked roots are resolved now.
    #[must_use]
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let resolved = absolutize(root).unwrap_or_else(|_| root.to_path_buf());
        self.roots.push(resolved);
        self
    }

    /// Configured roots.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl MountResolver for FixedMountResolver {
    fn resolve_mount(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = absolutize(path)?;
        let fixed = self
            .roots
            .iter()
            .filter(|root| absolute.starts_with(root))
            .max_by_key(|root| root.components().count());

        match fixed {
            Some(root) => Ok(root.clone()),
            None => SystemMountResolver.resolve_mount(&absolute),
        }
    }
}

/// Absolute, symlink-resolved form of `path`.
///
/// The deepest existing ancestor is canonicalised and the missing tail is
/// re-appended unchanged.
pub(crate) fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for part in tail.iter().rev() {
                resolved.push(part);
            }
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

#[cfg(unix)]
mod platform {
    use std::os::unix::fs::MetadataExt;
    use std::path::{Path, PathBuf};

    fn is_mount_point(path: &Path) -> bool {
        let Ok(meta) = path.symlink_metadata() else {
            return false;
        };
        if meta.file_type().is_symlink() {
            return false;
        }
        let Ok(parent) = path.join("..").symlink_metadata() else {
            return false;
        };
        meta.dev() != parent.dev() || meta.ino() == parent.ino()
    }

    pub(super) fn find_mount(absolute: &Path) -> PathBuf {
        let mut current = absolute;
        loop {
            if is_mount_point(current) {
                return current.to_path_buf();
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return current.to_path_buf(),
            }
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::path::{Component, Path, PathBuf};

    pub(super) fn find_mount(absolute: &Path) -> PathBuf {
        let mut components = absolute.components();
        match components.next() {
            Some(Component::Prefix(prefix)) => {
                let mut root = PathBuf::from(prefix.as_os_str());
                root.push(Component::RootDir.as_os_str());
                root
            }
            _ => absolute.to_path_buf(),
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    use std::path::{Component, Path, PathBuf};

    pub(super) fn find_mount(absolute: &Path) -> PathBuf {
        absolute
            .components()
            .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
            .collect()
    }
}
