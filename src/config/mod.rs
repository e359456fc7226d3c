pub mod applicator;
pub mod builtin;
pub mod loader;
pub mod schema;

pub use applicator::{
    apply_config, apply_rules, ApplicationError, ApplyOptions, PatchReport, RuleOutcome,
    RuleStatus,
};
pub use builtin::CATALOG_PAGE;
pub use loader::{load_from_path, load_from_str, load_or_builtin, ConfigError};
pub use schema::{Metadata, PatchConfig, Rule, ValidationError, ValidationIssue};
