//! Rule applicator - reads the target, applies every rule in order, writes once
//!
//! The whole file is held in memory. Rules run strictly in sequence, each one
//! seeing the output of the previous one, and the file is written only after
//! all of them have been computed. A crash before the write leaves the target
//! untouched.

use crate::config::schema::{PatchConfig, Rule};
use crate::edit::{atomic_write, read_text, EditError};
use crate::hint::{closest_line, LineHint};
use crate::safety::{SafetyError, WorkspaceGuard};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    /// Search literal found and replaced `occurrences` times
    Applied { occurrences: usize },
    /// Nothing left to replace and the replacement is already in place
    AlreadyApplied,
    /// Neither the search literal nor the replacement was found
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub id: String,
    pub description: String,
    pub status: RuleStatus,
    /// For `NotFound`: closest line in the content this rule was run against
    pub hint: Option<LineHint>,
}

impl RuleOutcome {
    pub fn matched(&self) -> bool {
        !matches!(self.status, RuleStatus::NotFound)
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            RuleStatus::Applied { occurrences: 1 } => write!(f, "{}: applied", self.id),
            RuleStatus::Applied { occurrences } => {
                write!(f, "{}: applied ({} occurrences)", self.id, occurrences)
            }
            RuleStatus::AlreadyApplied => write!(f, "{}: already applied", self.id),
            RuleStatus::NotFound => write!(f, "{}: search text not found", self.id),
        }
    }
}

/// Options for [`apply_config`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Compute everything but leave the file alone
    pub dry_run: bool,
    /// Refuse to write if any rule's search text is missing
    pub strict: bool,
}

/// Result of running a rule set against its target
#[derive(Debug, Clone)]
#[must_use = "PatchReport should be checked for unmatched rules"]
pub struct PatchReport {
    pub file: PathBuf,
    pub outcomes: Vec<RuleOutcome>,
    pub original: String,
    pub patched: String,
    /// Whether the file on disk was rewritten
    pub written: bool,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        self.original != self.patched
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.matched())
    }

    pub fn all_matched(&self) -> bool {
        self.unmatched().next().is_none()
    }
}

/// Errors during rule application
#[derive(Debug)]
pub enum ApplicationError {
    /// Target rejected by the workspace guard, or could not be resolved
    Safety(SafetyError),
    /// Reading or writing the target failed
    Edit(EditError),
    /// Strict mode: these rules did not match, nothing was written
    Unmatched { file: PathBuf, rules: Vec<String> },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Safety(e) => write!(f, "{}", e),
            ApplicationError::Edit(e) => write!(f, "{}", e),
            ApplicationError::Unmatched { file, rules } => write!(
                f,
                "{} rule(s) did not match in {}: {}",
                rules.len(),
                file.display(),
                rules.join(", ")
            ),
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Safety(e) => Some(e),
            ApplicationError::Edit(e) => Some(e),
            ApplicationError::Unmatched { .. } => None,
        }
    }
}

impl From<SafetyError> for ApplicationError {
    fn from(e: SafetyError) -> Self {
        ApplicationError::Safety(e)
    }
}

impl From<EditError> for ApplicationError {
    fn from(e: EditError) -> Self {
        ApplicationError::Edit(e)
    }
}

/// Apply rules to in-memory content, in order.
///
/// Every occurrence of a rule's search text is replaced. For insert-style rules
/// (the replacement contains the search text) an occurrence already wrapped by
/// a copy of the replacement is left alone, so a second run does not insert
/// twice. A rule with nothing left to replace counts as already applied when
/// its replacement is present, and as not found otherwise.
pub fn apply_rules(rules: &[Rule], content: &str) -> (String, Vec<RuleOutcome>) {
    let mut current = content.to_string();
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let (next, replaced, kept) = rule.replacement().apply_outside_replacements(&current);

        let status = if replaced > 0 {
            current = next;
            RuleStatus::Applied {
                occurrences: replaced,
            }
        } else if kept > 0 || (!rule.replace.is_empty() && current.contains(rule.replace.as_str()))
        {
            RuleStatus::AlreadyApplied
        } else {
            RuleStatus::NotFound
        };

        let hint = match status {
            RuleStatus::NotFound => closest_line(&current, &rule.search),
            _ => None,
        };

        debug!(rule = %rule.id, ?status, "rule evaluated");

        outcomes.push(RuleOutcome {
            id: rule.id.clone(),
            description: rule.label().to_string(),
            status,
            hint,
        });
    }

    (current, outcomes)
}

/// Apply a rule set to its target inside `workspace_root`.
///
/// The target path from `config.meta.target` is resolved against the workspace
/// root and checked by [`WorkspaceGuard`]. The file is rewritten only when the
/// content actually changed and `dry_run` is off.
pub fn apply_config(
    config: &PatchConfig,
    workspace_root: &Path,
    options: ApplyOptions,
) -> Result<PatchReport, ApplicationError> {
    let guard = WorkspaceGuard::new(workspace_root)?;
    let file = guard.validate_path(&config.meta.target)?;

    info!(file = %file.display(), rules = config.rules.len(), "applying rule set");

    let original = read_text(&file)?;
    let (patched, outcomes) = apply_rules(&config.rules, &original);

    for outcome in outcomes.iter().filter(|o| !o.matched()) {
        match &outcome.hint {
            Some(hint) => warn!(
                rule = %outcome.id,
                "search text not found; closest line {}: {}",
                hint.line,
                hint.text
            ),
            None => warn!(rule = %outcome.id, "search text not found"),
        }
    }

    if options.strict {
        let missing: Vec<String> = outcomes
            .iter()
            .filter(|o| !o.matched())
            .map(|o| o.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ApplicationError::Unmatched {
                file,
                rules: missing,
            });
        }
    }

    let mut written = false;
    if patched != original && !options.dry_run {
        let file = guard.revalidate(&file)?;
        atomic_write(&file, patched.as_bytes())?;
        written = true;
        debug!(file = %file.display(), bytes = patched.len(), "target rewritten");
    }

    Ok(PatchReport {
        file,
        outcomes,
        original,
        patched,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("first", "First", "alpha", "ALPHA"),
            Rule::new("second", "", "ALPHA beta", "gamma"),
            Rule::new("third", "Third", "missing", "x"),
        ]
    }

    #[test]
    fn test_rules_run_in_order_on_previous_output() {
        let (out, outcomes) = apply_rules(&rules(), "alpha beta\n");
        assert_eq!(out, "gamma\n");
        assert_eq!(outcomes[0].status, RuleStatus::Applied { occurrences: 1 });
        assert_eq!(outcomes[1].status, RuleStatus::Applied { occurrences: 1 });
        assert_eq!(outcomes[2].status, RuleStatus::NotFound);
        assert_eq!(outcomes[1].description, "second");
    }

    #[test]
    fn test_insert_rule_is_not_reapplied() {
        let rules = vec![Rule::new("icon", "", "<ChatBot />", "<CartIcon />\n<ChatBot />")];
        let (once, _) = apply_rules(&rules, "<div>\n<ChatBot />\n</div>");
        let (twice, outcomes) = apply_rules(&rules, &once);
        assert_eq!(once, twice);
        assert_eq!(outcomes[0].status, RuleStatus::AlreadyApplied);
        assert!(outcomes[0].matched());
    }

    #[test]
    fn test_rewrite_rule_runs_when_replacement_already_present() {
        let rules = vec![Rule::new("var-to-let", "", "var ", "let ")];
        let (out, outcomes) = apply_rules(&rules, "let a = 1;\nvar b = 2;\nvar c = 3;\n");
        assert_eq!(out, "let a = 1;\nlet b = 2;\nlet c = 3;\n");
        assert_eq!(outcomes[0].status, RuleStatus::Applied { occurrences: 2 });
    }

    #[test]
    fn test_insert_rule_patches_remaining_occurrences() {
        use crate::config::builtin::{NEW_CHATBOT, OLD_CHATBOT};

        let cart_icon = PatchConfig::builtin()
            .rules
            .into_iter()
            .find(|r| r.id == "cart-icon")
            .unwrap();
        let content = format!("{NEW_CHATBOT}\n\n{OLD_CHATBOT}\n");

        let (out, outcomes) = apply_rules(&[cart_icon], &content);
        assert_eq!(outcomes[0].status, RuleStatus::Applied { occurrences: 1 });
        assert_eq!(out, format!("{NEW_CHATBOT}\n\n{NEW_CHATBOT}\n"));
        assert_eq!(out.matches("<CartIcon />").count(), 2);
    }

    #[test]
    fn test_hint_uses_buffer_seen_by_the_rule() {
        let rules = vec![
            Rule::new("rename", "", "alpha", "beta"),
            Rule::new("drifted", "", "beta lines!", "x"),
        ];
        let (_, outcomes) = apply_rules(&rules, "alpha line\n");
        assert_eq!(outcomes[1].status, RuleStatus::NotFound);
        let hint = outcomes[1].hint.as_ref().unwrap();
        assert_eq!(hint.text, "beta line");
        assert!(outcomes[0].hint.is_none());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = RuleOutcome {
            id: "imports".to_string(),
            description: String::new(),
            status: RuleStatus::Applied { occurrences: 2 },
            hint: None,
        };
        assert_eq!(outcome.to_string(), "imports: applied (2 occurrences)");
    }

    #[test]
    fn test_apply_config_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.tsx"), "alpha beta\n").unwrap();

        let mut config = PatchConfig::default();
        config.meta.target = "page.tsx".to_string();
        config.rules = rules();

        let report = apply_config(&config, dir.path(), ApplyOptions::default()).unwrap();
        assert!(report.written);
        assert!(report.changed());
        assert!(!report.all_matched());
        assert_eq!(report.unmatched().count(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("page.tsx")).unwrap(),
            "gamma\n"
        );
    }

    #[test]
    fn test_unchanged_content_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.tsx"), "nothing here\n").unwrap();

        let mut config = PatchConfig::default();
        config.meta.target = "page.tsx".to_string();
        config.rules = rules();

        let report = apply_config(&config, dir.path(), ApplyOptions::default()).unwrap();
        assert!(!report.written);
        assert!(!report.changed());
    }
}
