//! Catalog Patcher: applies the shopping-cart patch to the wine catalog page
//!
//! The patch is a short, ordered list of exact literal replacements run
//! against `src/pages/CatalogoVinos.tsx`. Nothing here parses the target's
//! syntax; a rule either finds its search text verbatim or it does nothing.
//!
//! # Architecture
//!
//! Every rule compiles down to one primitive, [`Replacement`], which swaps all
//! occurrences of a literal. The [`config`] layer holds the built-in rules,
//! loads externalized rule sets from TOML, and runs a rule set against its
//! target file.
//!
//! # Safety
//!
//! - The target is read once and written once, after all rules have run
//! - Atomic file writes (tempfile + fsync + rename)
//! - Workspace boundary enforcement, `node_modules`/`.git` are off limits
//! - UTF-8 validation
//! - Re-running on a patched file changes nothing
//!
//! # Example
//!
//! ```no_run
//! use catalog_patcher::{apply_config, ApplyOptions, PatchConfig};
//! use std::path::Path;
//!
//! let report = apply_config(&PatchConfig::builtin(), Path::new("."), ApplyOptions::default());
//!
//! match report {
//!     Ok(report) => println!("Patched {}", report.file.display()),
//!     Err(e) => eprintln!("Patch failed: {}", e),
//! }
//! ```

pub mod config;
pub mod edit;
pub mod hint;
pub mod safety;

// Re-exports
pub use config::{
    apply_config, apply_rules, load_from_path, load_from_str, load_or_builtin, ApplicationError,
    ApplyOptions, ConfigError, PatchConfig, PatchReport, Rule, RuleOutcome, RuleStatus,
    CATALOG_PAGE,
};
pub use edit::{atomic_write, read_text, EditError, Replacement};
pub use hint::{closest_line, LineHint};
pub use safety::{SafetyError, WorkspaceGuard};
