//! Hygiene — enforces coding standards at test time
//!
//! Scans the canvas crate's production sources for antipatterns. Each pattern
//! has a budget (ideally zero). If you must add one, fix an existing one
//! first; the budget never grows.

use std::fs;
use std::path::{Path, PathBuf};

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const BUDGETS: &[Budget] = &[
    // Panics crash the wasm module and take the editor with it.
    Budget { pattern: ".unwrap()", max: 0, why: "panics on None/Err" },
    Budget { pattern: ".expect(", max: 0, why: "panics on None/Err" },
    Budget { pattern: "panic!(", max: 0, why: "aborts the editor" },
    Budget { pattern: "unreachable!(", max: 0, why: "aborts the editor" },
    Budget { pattern: "todo!(", max: 0, why: "unfinished stub" },
    Budget { pattern: "unimplemented!(", max: 0, why: "unfinished stub" },
    // Silent loss discards errors without inspecting them.
    Budget { pattern: "let _ =", max: 0, why: "discards a result" },
    Budget { pattern: ".ok()", max: 0, why: "discards an error" },
    // Output goes through tracing.
    Budget { pattern: "println!(", max: 0, why: "use tracing" },
    Budget { pattern: "dbg!(", max: 0, why: "debug leftover" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete unused code instead" },
];

/// Production `.rs` files under `src/`, excluding `_test.rs` siblings.
fn source_files() -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            collect(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") && !path.to_string_lossy().ends_with("_test.rs") {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, content));
            }
        }
    }
}

#[test]
fn sources_are_found() {
    assert!(source_files().iter().any(|(p, _)| p.ends_with("lib.rs")));
}

#[test]
fn antipattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for budget in BUDGETS {
        let hits: Vec<String> = files
            .iter()
            .filter_map(|(path, content)| {
                let count = content.lines().filter(|line| line.contains(budget.pattern)).count();
                (count > 0).then(|| format!("  {}: {count}", path.display()))
            })
            .collect();
        let total: usize = files
            .iter()
            .map(|(_, content)| content.lines().filter(|line| line.contains(budget.pattern)).count())
            .sum();
        if total > budget.max {
            failures.push(format!(
                "`{}` budget exceeded ({}): found {total}, max {}\n{}",
                budget.pattern,
                budget.why,
                budget.max,
                hits.join("\n")
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}
