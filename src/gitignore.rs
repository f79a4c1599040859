//! Gitignore synchronization
//!
//! Maintains a reference table of exclusion patterns grouped by section.
//! A missing target file is created with every section written as a
//! commented block; an existing file is checked against the reference
//! and the absent entries reported with their section. Entirely
//! independent of the encryption core.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{PadlockError, PadlockResult};

/// Reference sections and their exclusion patterns
pub const SECTIONS: &[(&str, &[&str])] = &[
    (
        "Common",
        &[
            "*.log", "*.tmp", "*.bak", "*~", ".DS_Store", "Thumbs.db", ".idea/", ".vscode/",
            ".env", ".env.*",
        ],
    ),
    (
        "Shell",
        &["*.sh~", "*.swp", "*.swo", "bash_history", ".bash_profile", ".bashrc"],
    ),
    (
        "Python",
        &[
            "__pycache__/", "*.py[cod]", "*.pyo", "*.pyd", "*.egg", "*.egg-info/", "dist/",
            "build/", "*.spec", "*.sqlite3", "*.db", "*.ipynb_checkpoints/", ".mypy_cache/",
            ".pytest_cache/", ".tox/", ".venv/", "venv/", "Pipfile.lock", "poetry.lock",
        ],
    ),
    (
        "JavaScript / Node.js",
        &[
            "node_modules/", "npm-debug.log*", "yarn-debug.log*", "yarn-error.log*",
            "pnpm-lock.yaml", "package-lock.json", "dist/", "coverage/", ".next/", "out/",
            ".cache/", ".eslintcache",
        ],
    ),
    (
        "Java",
        &[
            "*.class", "*.jar", "*.war", "*.ear", "*.iml", "target/", "bin/", "build/",
            ".gradle/", ".settings/", ".project", ".classpath",
        ],
    ),
    (
        "Tests & CI",
        &["coverage/", "test-results/", "junit.xml", "*.lcov", "*.coverage"],
    ),
    (
        "Tools & IDE",
        &[
            "*.sublime-workspace", "*.sublime-project", "*.code-workspace", "*.tmproj",
            "*.komodoproject", "*.kate-swp", "*.goutputstream*", "*.directory",
        ],
    ),
    (
        "Dependencies & artifacts",
        &[
            "*.lock", "*.tar.gz", "*.zip", "*.exe", "*.dll", "*.so", "*.dylib", "*.out",
            "*.o", "*.obj", "*.a", "*.lib",
        ],
    ),
];

/// A reference pattern absent from the target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    pub pattern: &'static str,
    pub section: &'static str,
}

/// Result of one synchronization pass
#[derive(Debug)]
pub enum SyncReport {
    /// The target did not exist and was created with every section
    Created { entries: usize },
    /// The target contains every reference entry
    Complete,
    /// The target is missing these entries
    Missing(Vec<MissingEntry>),
}

/// Create the target file from the reference table, or report which
/// reference entries an existing file lacks
pub fn sync(path: &Path) -> PadlockResult<SyncReport> {
    if !path.exists() {
        return create(path);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| PadlockError::Input(format!("Failed to read {}: {}", path.display(), e)))?;

    let existing: HashSet<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let missing: Vec<MissingEntry> = SECTIONS
        .iter()
        .flat_map(|&(section, patterns)| {
            patterns
                .iter()
                .map(move |&pattern| MissingEntry { pattern, section })
        })
        .filter(|entry| !existing.contains(entry.pattern))
        .collect();

    if missing.is_empty() {
        Ok(SyncReport::Complete)
    } else {
        Ok(SyncReport::Missing(missing))
    }
}

fn create(path: &Path) -> PadlockResult<SyncReport> {
    let mut content = String::new();
    let mut entries = 0;

    for (section, patterns) in SECTIONS {
        content.push_str(&format!("\n# {}\n", section));
        for pattern in *patterns {
            content.push_str(pattern);
            content.push('\n');
            entries += 1;
        }
    }

    fs::write(path, content)
        .map_err(|e| PadlockError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(SyncReport::Created { entries })
}
