use std::path::Path;

const README_FILES: &[&str] = &["README.md", "README.txt", "README", "README.rst"];
const SCAN_LINES: usize = 10;
const MIN_DESCRIPTION_LEN: usize = 20;

/// First prose line near the top of the README: longer than 20 characters
/// and not a heading or image/badge line.
pub fn extract_description(root: &Path) -> String {
    README_FILES
        .iter()
        .filter_map(|name| std::fs::read_to_string(root.join(name)).ok())
        .find_map(|content| first_prose_line(&content))
        .unwrap_or_default()
}

fn first_prose_line(content: &str) -> Option<String> {
    content
        .lines()
        .take(SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            line.chars().count() > MIN_DESCRIPTION_LEN
                && !line.starts_with('#')
                && !line.starts_with('!')
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_skips_headings_and_badges() {
        let content = "# project\n![build](https://ci/badge.svg)\nshort\n\n  Fast incremental builds for monorepos.  \n";
        assert_eq!(
            first_prose_line(content).as_deref(),
            Some("Fast incremental builds for monorepos.")
        );
    }

    #[test]
    fn test_only_first_ten_lines() {
        let content = format!("{}A description that is long enough\n", "#\n".repeat(10));
        assert!(first_prose_line(&content).is_none());
    }

    #[test]
    fn test_readme_precedence() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README"), "Plain readme description here.\n").unwrap();
        fs::write(dir.path().join("README.md"), "# title only\n").unwrap();
        assert_eq!(extract_description(dir.path()), "Plain readme description here.");
    }
}
