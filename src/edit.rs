use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The fundamental edit primitive: exact literal replacement of every occurrence.
///
/// Matching is purely textual. The replacement knows nothing about the syntax of
/// the file it is applied to, so a search literal should be specific enough not
/// to match in unintended places.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Replacement does nothing until apply() is called"]
pub struct Replacement {
    /// Literal text to look for
    pub search: String,
    /// Literal text written in place of each occurrence
    pub replace: String,
}

impl Replacement {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Replace all non-overlapping occurrences of `search`, scanning left to right.
    ///
    /// Returns the new content and the number of occurrences replaced. An empty
    /// search literal matches nothing.
    pub fn apply(&self, content: &str) -> (String, usize) {
        if self.search.is_empty() {
            return (content.to_string(), 0);
        }

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0;

        for (start, matched) in content.match_indices(self.search.as_str()) {
            out.push_str(&content[last..start]);
            out.push_str(&self.replace);
            last = start + matched.len();
            count += 1;
        }

        if count == 0 {
            return (content.to_string(), 0);
        }

        out.push_str(&content[last..]);
        (out, count)
    }

    /// True if the search literal occurs in `content`.
    pub fn matches(&self, content: &str) -> bool {
        !self.search.is_empty() && content.contains(self.search.as_str())
    }

    /// True if the replacement text contains the search text, i.e. the
    /// replacement inserts around the literal instead of rewriting it.
    pub fn is_insertion(&self) -> bool {
        !self.search.is_empty() && self.replace.contains(self.search.as_str())
    }

    /// Like [`Replacement::apply`], but an occurrence lying entirely inside an
    /// existing copy of the replacement text is left alone.
    ///
    /// Returns the new content, the number of occurrences replaced and the
    /// number kept because they were already wrapped by the replacement. Only
    /// insertions can keep occurrences; any other replacement behaves exactly
    /// like `apply`.
    pub fn apply_outside_replacements(&self, content: &str) -> (String, usize, usize) {
        if !self.is_insertion() {
            let (out, replaced) = self.apply(content);
            return (out, replaced, 0);
        }

        let applied: Vec<(usize, usize)> = content
            .match_indices(self.replace.as_str())
            .map(|(start, matched)| (start, start + matched.len()))
            .collect();

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut replaced = 0;
        let mut kept = 0;

        for (start, matched) in content.match_indices(self.search.as_str()) {
            let end = start + matched.len();
            if applied.iter().any(|&(lo, hi)| lo <= start && end <= hi) {
                kept += 1;
                continue;
            }
            out.push_str(&content[last..start]);
            out.push_str(&self.replace);
            last = end;
            replaced += 1;
        }

        if replaced == 0 {
            return (content.to_string(), 0, kept);
        }

        out.push_str(&content[last..]);
        (out, replaced, kept)
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, EditError> {
    let bytes = fs::read(path).map_err(|source| EditError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| EditError::Utf8 {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the file on disk keeps its old content.
/// The permissions of an existing file are carried over to the replacement.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let write_err = |source: std::io::Error| EditError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Tempfile must live on the same filesystem for rename to be atomic
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(content).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_err)?;
    }

    temp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
