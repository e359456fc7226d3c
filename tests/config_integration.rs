//! Integration tests for externalized rule files
//!
//! Loads rule sets from TOML on disk and applies them through the library API.

use catalog_patcher::config::{
    apply_config, load_from_path, ApplicationError, ApplyOptions, ConfigError, PatchConfig,
    RuleStatus, ValidationIssue,
};
use catalog_patcher::SafetyError;
use std::fs;
use tempfile::TempDir;

fn write_rules(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("rules.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_rule_file_applies_in_order() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/components")).unwrap();
    fs::write(
        dir.path().join("src/components/Navbar.tsx"),
        "const label = 'Carrito';\nconst other = 'Carrito';\n",
    )
    .unwrap();

    let path = write_rules(
        &dir,
        r#"
[meta]
name = "navbar-labels"
description = "Rename cart labels"
target = "src/components/Navbar.tsx"

[[rules]]
id = "rename"
search = "'Carrito'"
replace = "'Mi carrito'"

[[rules]]
id = "first-only"
description = "Touch the first label again"
search = "const label = 'Mi carrito';"
replace = "const label = 'Mi carrito 🛒';"
"#,
    );

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.meta.name, "navbar-labels");

    let report = apply_config(&config, dir.path(), ApplyOptions::default()).unwrap();
    assert_eq!(
        report.outcomes[0].status,
        RuleStatus::Applied { occurrences: 2 }
    );
    assert_eq!(
        report.outcomes[1].status,
        RuleStatus::Applied { occurrences: 1 }
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("src/components/Navbar.tsx")).unwrap(),
        "const label = 'Mi carrito 🛒';\nconst other = 'Mi carrito';\n"
    );
}

#[test]
fn test_duplicate_ids_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(
        &dir,
        r#"
[meta]
target = "a.tsx"

[[rules]]
id = "same"
search = "a"
replace = "b"

[[rules]]
id = "same"
search = "c"
replace = "d"
"#,
    );

    match load_from_path(&path) {
        Err(ConfigError::Validation { source, .. }) => {
            assert_eq!(
                source.issues,
                vec![ValidationIssue::DuplicateId {
                    rule_id: "same".to_string()
                }]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_missing_search_field_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(
        &dir,
        r#"
[meta]
target = "a.tsx"

[[rules]]
id = "no-search"
replace = "b"
"#,
    );

    assert!(matches!(
        load_from_path(&path),
        Err(ConfigError::Toml { path: Some(_), .. })
    ));
}

#[test]
fn test_target_in_node_modules_is_refused() {
    let dir = TempDir::new().unwrap();
    let vendored = dir.path().join("node_modules/lucide-react/index.js");
    fs::create_dir_all(vendored.parent().unwrap()).unwrap();
    fs::write(&vendored, "export {};\n").unwrap();

    let path = write_rules(
        &dir,
        r#"
[meta]
target = "node_modules/lucide-react/index.js"

[[rules]]
id = "nope"
search = "export"
replace = "import"
"#,
    );
    let config = load_from_path(&path).unwrap();

    let result = apply_config(&config, dir.path(), ApplyOptions::default());
    assert!(matches!(
        result,
        Err(ApplicationError::Safety(SafetyError::ForbiddenPath { .. }))
    ));
    assert_eq!(fs::read_to_string(&vendored).unwrap(), "export {};\n");
}

#[test]
fn test_target_outside_workspace_is_refused() {
    let outer = TempDir::new().unwrap();
    let workspace = outer.path().join("web");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(outer.path().join("secret.tsx"), "x").unwrap();

    let mut config = PatchConfig::builtin();
    config.meta.target = "../secret.tsx".to_string();

    let result = apply_config(&config, &workspace, ApplyOptions::default());
    assert!(matches!(
        result,
        Err(ApplicationError::Safety(SafetyError::OutsideWorkspace { .. }))
    ));
}

#[test]
fn test_rewrite_rule_replaces_every_remaining_occurrence() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("legacy.js"),
        "let a = 1;\nvar b = 2;\nvar c = 3;\n",
    )
    .unwrap();

    let path = write_rules(
        &dir,
        r#"
[meta]
target = "legacy.js"

[[rules]]
id = "var-to-let"
search = "var "
replace = "let "
"#,
    );
    let config = load_from_path(&path).unwrap();

    let report = apply_config(
        &config,
        dir.path(),
        ApplyOptions {
            dry_run: false,
            strict: true,
        },
    )
    .unwrap();

    assert_eq!(
        report.outcomes[0].status,
        RuleStatus::Applied { occurrences: 2 }
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("legacy.js")).unwrap(),
        "let a = 1;\nlet b = 2;\nlet c = 3;\n"
    );
}

#[test]
fn test_partially_patched_page_gets_missing_cart_icon() {
    use catalog_patcher::config::builtin::{NEW_CHATBOT, OLD_CHATBOT};
    use catalog_patcher::CATALOG_PAGE;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join(CATALOG_PAGE);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, format!("{NEW_CHATBOT}\n\n{OLD_CHATBOT}\n")).unwrap();

    let mut config = PatchConfig::builtin();
    config.rules.retain(|r| r.id == "cart-icon");

    let report = apply_config(&config, dir.path(), ApplyOptions::default()).unwrap();
    assert_eq!(
        report.outcomes[0].status,
        RuleStatus::Applied { occurrences: 1 }
    );

    let patched = fs::read_to_string(&target).unwrap();
    assert_eq!(patched, format!("{NEW_CHATBOT}\n\n{NEW_CHATBOT}\n"));
    assert_eq!(patched.matches("<CartIcon />").count(), 2);

    // Nothing left to do on the next run
    let again = apply_config(&config, dir.path(), ApplyOptions::default()).unwrap();
    assert_eq!(again.outcomes[0].status, RuleStatus::AlreadyApplied);
    assert!(!again.written);
}
