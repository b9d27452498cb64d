//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the Conductor and the daemon MUST NOT call
//! sleep methods. Delays are `Deferred` entries on the timer queue; the daemon
//! waits on the next deadline with `sleep_until`.
//! **Exceptions**: test code

use std::fs;
use std::path::Path;

use architectural_enforcement::workspace_root;

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - Scheduling a Deferred task on the timer queue");
        eprintln!("  - tokio::time::sleep_until(next_deadline) in the daemon loop");
        eprintln!("  - Test code (#[test] or #[tokio::test] functions)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// The scanned directories must exist, otherwise the check proves nothing
#[test]
fn test_scanned_directories_exist() {
    for dir in SCANNED {
        assert!(
            workspace_root().join(dir).is_dir(),
            "missing source directory {dir}"
        );
    }
}

const SCANNED: [&str; 2] = ["conductor/core/src", "conductor/daemon/src"];

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();
    for dir in SCANNED {
        check_directory(&workspace_root().join(dir), &mut violations);
    }
    violations
}

fn check_directory(path: &Path, violations: &mut Vec<String>) {
    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
            check_file(entry.path(), violations);
        }
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let lines: Vec<&str> = content.lines().collect();
    violations.extend(scan_lines(&lines).into_iter().map(|idx| {
        format!("{}:{} - {}", path.display(), idx + 1, lines[idx].trim())
    }));
}

/// Indices of lines calling a sleep outside test code
fn scan_lines(lines: &[&str]) -> Vec<usize> {
    let test_module_start = lines
        .iter()
        .position(|l| l.trim_start().starts_with("#[cfg(test)]"));

    lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| {
            // Skip comments
            let code_part = line.split("//").next().unwrap_or(line);
            let is_sleep = code_part.contains("::sleep(") || code_part.contains(".sleep(");
            let in_tests = test_module_start.is_some_and(|start| *idx > start);
            is_sleep && !in_tests && !is_in_test_function(lines, *idx)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }

        if line.starts_with("fn ") || line.starts_with("pub fn ") || line.starts_with("async fn ")
        {
            // The attribute sits directly above the signature
            return i > 0
                && (lines[i - 1].trim().starts_with("#[test]")
                    || lines[i - 1].trim().starts_with("#[tokio::test"));
        }

        // Stop at module boundaries
        if line.starts_with("mod ") || line.starts_with("impl ") {
            return false;
        }
    }
    false
}

#[test]
fn test_sleep_violation_detection() {
    let code = [
        "async fn bad_wait() {",
        "    tokio::time::sleep(Duration::from_millis(300)).await;",
        "}",
    ];
    assert_eq!(scan_lines(&code), vec![1]);
}

#[test]
fn test_sleep_until_and_comments_allowed() {
    let code = [
        "async fn next_timer(at: Instant) {",
        "    tokio::time::sleep_until(at).await;",
        "    // never std::thread::sleep(d) here",
        "}",
    ];
    assert!(scan_lines(&code).is_empty());
}

#[test]
fn test_sleep_in_test_module_allowed() {
    let code = [
        "fn real() {}",
        "#[cfg(test)]",
        "mod tests {",
        "    fn helper() { std::thread::sleep(d); }",
        "}",
    ];
    assert!(scan_lines(&code).is_empty());
}
