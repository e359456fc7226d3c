use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directories inside a web workspace that hold vendored, generated or VCS
/// content and must never be patched.
pub const FORBIDDEN_DIRS: &[&str] = &["node_modules", ".git", "dist", "build"];

/// Workspace safety checks to prevent editing files outside the target workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Absolute path to workspace root
    workspace_root: PathBuf,
    /// Directory names refused anywhere below the root
    forbidden_dirs: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is in forbidden directory '{dir}': {path}")]
    ForbiddenPath { path: PathBuf, dir: String },

    #[error("Failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceGuard {
    /// Create a new workspace guard with the given root.
    ///
    /// The workspace root will be canonicalized to handle symlinks correctly.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Self::with_forbidden(
            workspace_root,
            FORBIDDEN_DIRS.iter().map(|d| d.to_string()).collect(),
        )
    }

    /// Create a guard with a custom list of forbidden directory names.
    pub fn with_forbidden(
        workspace_root: impl AsRef<Path>,
        forbidden_dirs: Vec<String>,
    ) -> Result<Self, SafetyError> {
        let root = workspace_root.as_ref();
        let workspace_root = root.canonicalize().map_err(|source| SafetyError::Resolve {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            workspace_root,
            forbidden_dirs,
        })
    }

    /// Check if a path is safe to edit.
    ///
    /// Relative paths are resolved against the workspace root. Returns the
    /// canonicalized absolute path if safe. A missing file fails here with
    /// [`SafetyError::Resolve`].
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        let canonical = absolute
            .canonicalize()
            .map_err(|source| SafetyError::Resolve {
                path: absolute.clone(),
                source,
            })?;

        self.check_canonical(&canonical)?;

        Ok(canonical)
    }

    /// Re-validate a previously-validated canonical path.
    ///
    /// Call this immediately before write: the path is re-canonicalized and
    /// re-checked in case a symlink was swapped in since validation.
    pub fn revalidate(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let canonical = path.canonicalize().map_err(|source| SafetyError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        let relative = canonical.strip_prefix(&self.workspace_root).map_err(|_| {
            SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            }
        })?;

        for component in relative.components() {
            if let Component::Normal(name) = component {
                if let Some(dir) = self
                    .forbidden_dirs
                    .iter()
                    .find(|forbidden| name == forbidden.as_str())
                {
                    return Err(SafetyError::ForbiddenPath {
                        path: canonical.to_path_buf(),
                        dir: dir.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the workspace root.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}
