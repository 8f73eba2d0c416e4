/// Ordered substring table. More specific patterns come first so that
/// "python not found" is not swallowed by "not found".
const REMEDIES: &[(&str, &str)] = &[
    (
        "already exists",
        "Try a different project name or delete the existing directory",
    ),
    (
        "requires confirmation",
        "Add --yes to auto-confirm the deployment",
    ),
    ("python not found", "Install Python 3.8+ from python.org"),
    ("command not found", "Install the required CLI tool first"),
    (
        "permission denied",
        "Check directory permissions or run from a writable location",
    ),
    (
        "no such file",
        "Create the project first before running this command",
    ),
    (
        "virtual environment",
        "Use 'python3 -m venv <name>' to create a virtual environment",
    ),
    (
        "conflict",
        "Directory already exists; choose a different name",
    ),
    ("not found", "Check that the CLI tool is installed"),
];

pub const DEFAULT_REMEDY: &str = "Check the command syntax and dependencies";

/// Remediation hint for an error message; case-insensitive.
pub fn suggest(error: &str) -> &'static str {
    let lower = error.to_lowercase();
    REMEDIES
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, remedy)| *remedy)
        .unwrap_or(DEFAULT_REMEDY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_patterns_win() {
        assert_eq!(suggest("sh: python not found"), "Install Python 3.8+ from python.org");
        assert_eq!(
            suggest("zsh: command not found: npx"),
            "Install the required CLI tool first"
        );
        assert_eq!(suggest("module not found"), "Check that the CLI tool is installed");
    }

    #[test]
    fn case_insensitive() {
        assert!(suggest("Error: Directory ALREADY EXISTS").contains("different project name"));
    }

    #[test]
    fn unknown_error_gets_default() {
        assert_eq!(suggest("exited with status 2"), DEFAULT_REMEDY);
    }
}
