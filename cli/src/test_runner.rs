use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use codespan_reporting::files::SimpleFiles;
use serde::Deserialize;

use matcher::NodeError;
use treetype::tree::literal::parse_tree;

use crate::definitions;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    /// Human-readable case description.
    pub description: Option<String>,

    /// Type description. Empty matches anything.
    #[serde(rename = "type")]
    pub type_description: String,

    /// Tree literal to convert.
    #[serde(default = "default_tree")]
    pub tree: String,

    /// Expected rendered result (trimmed comparison).
    pub expect_output: Option<String>,

    /// Expected aggregate error flag.
    pub expect_error: Option<bool>,

    /// Match error messages that must each appear somewhere in the result.
    pub expect_messages: Vec<String>,

    /// If true, the type or one of the atoms must fail to compile.
    pub expect_syntax_error: bool,

    /// Atom definitions, `name = "type"`.
    pub atoms: BTreeMap<String, String>,
}

fn default_tree() -> String {
    "nil".to_string()
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("cannot read file: {}", e)),
            };
        }
    };

    let config: CaseConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("TOML parse error: {}", e)),
            };
        }
    };

    TestResult {
        path: path.to_path_buf(),
        description: config.description.clone(),
        outcome: match check_case(&config) {
            None => TestOutcome::Pass,
            Some(reason) => TestOutcome::Fail(reason),
        },
    }
}

/// Run one case. Returns `Some(reason)` on failure.
fn check_case(config: &CaseConfig) -> Option<String> {
    let mut files = SimpleFiles::new();
    let compiled = definitions::compile_all(&mut files, &config.type_description, &config.atoms);

    if config.expect_syntax_error {
        return match compiled {
            Err(_) => None,
            Ok(_) => Some("expected syntax error, but compiling succeeded".into()),
        };
    }

    let compiled = match compiled {
        Ok(compiled) => compiled,
        Err(errors) => {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Some(format!("unexpected syntax error: {}", msgs.join("; ")));
        }
    };

    let tree = match parse_tree(&config.tree) {
        Ok(tree) => tree,
        Err(e) => return Some(format!("bad tree literal: {}", e)),
    };

    let result = matcher::convert(&tree, &compiled.schema, &compiled.atoms);
    let errors = result.tree.errors();

    if let Some(expected_output) = &config.expect_output {
        let actual = result.tree.to_string();
        let expected_trimmed = expected_output.trim();
        if actual != expected_trimmed {
            return Some(format!(
                "output mismatch\n  expected: {}\n  actual:   {}",
                expected_trimmed, actual
            ));
        }
    }

    let errors_expected = config.expect_error == Some(true) || !config.expect_messages.is_empty();
    match config.expect_error {
        Some(expected) if expected != result.has_error => {
            return Some(format!(
                "expected has_error = {}, got {}{}",
                expected,
                result.has_error,
                list_errors(&errors)
            ));
        }
        None if result.has_error && !errors_expected => {
            return Some(format!("unexpected match errors{}", list_errors(&errors)));
        }
        _ => {}
    }

    for expected in &config.expect_messages {
        if !errors.iter().any(|e| &e.message == expected) {
            return Some(format!(
                "missing error message \"{}\"{}",
                expected,
                list_errors(&errors)
            ));
        }
    }

    None
}

fn list_errors(errors: &[NodeError]) -> String {
    if errors.is_empty() {
        return "\n  actual errors:\n    (none)".to_string();
    }
    let lines: Vec<String> = errors
        .iter()
        .map(|e| format!("    - {}: {}", e.path, e.message))
        .collect();
    format!("\n  actual errors:\n{}", lines.join("\n"))
}

/// Discover `.test.toml` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(".test.toml") {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given case path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.toml files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} cases)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn ok_label(no_color: bool) -> &'static str {
    if no_color { "ok" } else { "\x1b[32mok\x1b[0m" }
}

fn failed_label(no_color: bool) -> &'static str {
    if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn case_label<'a>(result: &'a TestResult) -> &'a str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(".test.toml"))
            .unwrap_or("?")
    })
}

fn print_failures(failures: &[TestResult]) {
    eprintln!();
    eprintln!("failures:");
    for f in failures {
        eprintln!();
        eprintln!("  --- {} ---", f.path.display());
        if let TestOutcome::Fail(reason) = &f.outcome {
            for line in reason.lines() {
                eprintln!("  {}", line);
            }
        }
    }
}

/// Filter discovered categories down to the requested ones. A request also
/// selects every nested category below it.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut filtered = BTreeMap::new();
    for request in requested {
        let req = request.trim_matches('/');
        let mut found = false;
        for (cat, files) in all {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.as_str(), files);
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

/// Run all `.test.toml` files under `path` (or a single file).
/// If `categories` is non-empty, only run cases in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let mut results = Vec::new();

    if path.is_file() {
        results.push(run_single_test(path));
        report_category(None, &results, no_color);
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no .test.toml files found in {}", path.display());
            return 1;
        }

        let run_categories = select_categories(&all_categories, categories);
        if run_categories.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }

        for (cat, files) in &run_categories {
            let start = results.len();
            results.extend(files.iter().map(|file| run_single_test(file)));
            report_category(Some(*cat), &results[start..], no_color);
        }
    }

    let total = results.len();
    let failures: Vec<TestResult> = results
        .into_iter()
        .filter(|r| matches!(r.outcome, TestOutcome::Fail(_)))
        .collect();
    summarize(&failures, total, no_color)
}

fn report_category(category: Option<&str>, results: &[TestResult], no_color: bool) {
    if let Some(cat) = category {
        let header = if cat.is_empty() { "(root)" } else { cat };
        eprintln!();
        eprintln!("{}", bold(header, no_color));
    }
    for result in results {
        let label = match result.outcome {
            TestOutcome::Pass => pass_label(no_color),
            TestOutcome::Fail(_) => fail_label(no_color),
        };
        eprintln!("  {}  {}", label, case_label(result));
    }
}

fn summarize(failures: &[TestResult], total: usize, no_color: bool) -> i32 {
    if !failures.is_empty() {
        print_failures(failures);
    }

    let failed = failures.len();
    let passed = total - failed;
    eprintln!();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", ok_label(no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            failed_label(no_color),
            passed,
            failed,
            total
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_case(dir: &Path, name: &str, body: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn outcome(body: &str) -> Result<(), String> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), "case.test.toml", body);
        match run_single_test(&path).outcome {
            TestOutcome::Pass => Ok(()),
            TestOutcome::Fail(reason) => Err(reason),
        }
    }

    #[test]
    fn passing_output_case() {
        assert_eq!(
            outcome("type = \"int[]\"\ntree = \"<nil.<<nil.nil>.nil>>\"\nexpect_output = \"[0,1]\"\n"),
            Ok(())
        );
    }

    #[test]
    fn output_mismatch_is_reported() {
        let reason = outcome("type = \"int\"\ntree = \"<nil.nil>\"\nexpect_output = \"2\"\n").unwrap_err();
        assert!(reason.starts_with("output mismatch"), "{}", reason);
    }

    #[test]
    fn type_key_fills_the_type_description() {
        let config: CaseConfig = toml::from_str("type = \"<int.nil>\"\n").unwrap();
        assert_eq!(config.type_description, "<int.nil>");
        assert_eq!(CaseConfig::default().type_description, "");
    }

    #[test]
    fn defaults_match_nil_against_any() {
        assert_eq!(outcome("expect_output = \"nil\"\n"), Ok(()));
    }

    #[test]
    fn expected_messages() {
        let body = "type = \"int\"\ntree = \"<<nil.nil>.nil>\"\nexpect_messages = [\"Not a valid number\"]\n";
        assert_eq!(outcome(body), Ok(()));

        let body = "type = \"int\"\ntree = \"<<nil.nil>.nil>\"\nexpect_messages = [\"Expected nil\"]\n";
        let reason = outcome(body).unwrap_err();
        assert!(reason.contains("$: Not a valid number"), "{}", reason);
    }

    #[test]
    fn unexpected_match_errors_fail() {
        let reason = outcome("type = \"nil\"\ntree = \"<nil.nil>\"\n").unwrap_err();
        assert!(reason.starts_with("unexpected match errors"), "{}", reason);
        assert_eq!(
            outcome("type = \"nil\"\ntree = \"<nil.nil>\"\nexpect_error = true\n"),
            Ok(())
        );
    }

    #[test]
    fn syntax_error_cases() {
        assert_eq!(outcome("type = \"<int.\"\nexpect_syntax_error = true\n"), Ok(()));
        assert_eq!(
            outcome("type = \"b\"\nexpect_syntax_error = true\n[atoms]\nb = \"(nil\"\n"),
            Ok(())
        );
        let reason = outcome("type = \"int|\"\n").unwrap_err();
        assert!(reason.starts_with("unexpected syntax error"), "{}", reason);
    }

    #[test]
    fn atoms_table() {
        let body = "type = \"b[]\"\ntree = \"<nil.<<nil.nil>.nil>>\"\nexpect_output = \"[nil,<nil.nil>]\"\n[atoms]\nb = \"<nil.nil>|nil\"\n";
        assert_eq!(outcome(body), Ok(()));
    }

    #[test]
    fn categories_follow_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "top.test.toml", "");
        write_case(&dir.path().join("lists"), "a.test.toml", "");
        write_case(&dir.path().join("lists/nested"), "b.test.toml", "");
        write_case(&dir.path().join("lists"), "notes.txt", "");

        let categories = discover_categorized(dir.path());
        let names: Vec<&str> = categories.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["", "lists", "lists/nested"]);

        let selected = select_categories(&categories, &["lists".to_string()]);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected.values().map(|files| files.len()).sum::<usize>(), 2);
    }

    #[test]
    fn exit_code_reflects_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_case(dir.path(), "good.test.toml", "type = \"int\"\nexpect_output = \"0\"\n");
        assert_eq!(run_tests(dir.path(), true, &[]), 0);

        write_case(dir.path(), "bad.test.toml", "type = \"int\"\nexpect_output = \"1\"\n");
        assert_eq!(run_tests(dir.path(), true, &[]), 1);
    }

    #[test]
    fn bundled_cases_pass() {
        let cases = Path::new(env!("CARGO_MANIFEST_DIR")).join("../cases");
        assert_eq!(run_tests(&cases, true, &[]), 0);
    }
}
