//! Filesystem schema representation.
//!
//! Schemas are declared as a hierarchy of directories. An internal directory
//! only groups its children; a leaf directory (one with no subdirectories)
//! maps to one or more schemas whose tables are defined by the `*.sql` files
//! it contains.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A node in the schema definition hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDir {
    path: PathBuf,
}

impl SchemaDir {
    /// Creates a node for the given directory path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory's own name, used as the default schema name for
    /// leaf nodes.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Returns the symlink-resolved path identifying this physical node.
    pub fn canonical_path(&self) -> Result<PathBuf> {
        Ok(fs::canonicalize(&self.path)?)
    }

    /// Lists child directories, sorted by name for deterministic traversal.
    pub fn subdirs(&self) -> Result<Vec<SchemaDir>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.path().is_dir() {
                dirs.push(SchemaDir::new(entry.path()));
            }
        }
        dirs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(dirs)
    }

    /// Returns true when this directory has no subdirectories.
    pub fn is_leaf(&self) -> Result<bool> {
        Ok(self.subdirs()?.is_empty())
    }

    /// Reads the directory's `*.sql` files (sorted by file name) and splits
    /// their contents into individual statements.
    pub fn sql_statements(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "sql") {
                files.push(path);
            }
        }
        files.sort();

        let mut statements = Vec::new();
        for file in files {
            let contents = fs::read_to_string(&file)?;
            statements.extend(split_sql_statements(&contents));
        }
        Ok(statements)
    }
}

impl fmt::Display for SchemaDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Splits raw SQL text into individual statements on `;`, honoring single,
/// double and backtick quoting, backslash escapes, `--` and `#` line
/// comments, and `/* */` block comments. Comment text is stripped.
#[must_use]
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum State {
        Normal,
        Single,
        Double,
        Backtick,
        LineComment,
        BlockComment,
    }

    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                ';' => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                '\'' => {
                    state = State::Single;
                    current.push(c);
                }
                '"' => {
                    state = State::Double;
                    current.push(c);
                }
                '`' => {
                    state = State::Backtick;
                    current.push(c);
                }
                '#' => state = State::LineComment,
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => current.push(c),
            },
            State::Single | State::Double => {
                current.push(c);
                let quote = if state == State::Single { '\'' } else { '"' };
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == quote {
                    state = State::Normal;
                }
            }
            State::Backtick => {
                current.push(c);
                if c == '`' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    current.push(c);
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    // A comment may sit between two tokens; keep them apart
                    current.push(' ');
                    state = State::Normal;
                }
            }
        }
    }

    let stmt = current.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_split_simple_statements() {
        let sql = "CREATE TABLE a (id int);\nCREATE TABLE b (id int);\n";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "CREATE TABLE a (id int)");
        assert_eq!(stmts[1], "CREATE TABLE b (id int)");
    }

    #[test]
    fn test_split_ignores_semicolons_in_quotes() {
        let sql = "INSERT INTO t VALUES ('a;b', \"c;d\");";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("'a;b'"));
    }

    #[test]
    fn test_split_ignores_semicolons_in_backticks() {
        let sql = "CREATE TABLE `weird;name` (id int);";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("`weird;name`"));
    }

    #[test]
    fn test_split_strips_comments() {
        let sql = "-- leading comment; with semicolon\n\
                   CREATE TABLE a (id int); # trailing; comment\n\
                   /* block; comment */ CREATE TABLE b (id int);";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "CREATE TABLE a (id int)");
        assert_eq!(stmts[1], "CREATE TABLE b (id int)");
    }

    #[test]
    fn test_split_block_comment_between_tokens() {
        let stmts = split_sql_statements("CREATE/*hint*/TABLE a (id int);");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0], "CREATE TABLE a (id int)");
    }

    #[test]
    fn test_split_escaped_quote() {
        let sql = r"INSERT INTO t VALUES ('it\'s; fine');";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_split_unterminated_statement() {
        let stmts = split_sql_statements("CREATE TABLE a (id int)");
        assert_eq!(stmts, vec!["CREATE TABLE a (id int)"]);
    }

    #[test]
    fn test_leaf_detection_and_subdir_order() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("zeta")).unwrap();
        fs::create_dir(root.path().join("alpha")).unwrap();

        let dir = SchemaDir::new(root.path());
        assert!(!dir.is_leaf().unwrap());

        let subdirs = dir.subdirs().unwrap();
        assert_eq!(subdirs.len(), 2);
        assert_eq!(subdirs[0].name(), "alpha");
        assert_eq!(subdirs[1].name(), "zeta");
        assert!(subdirs[0].is_leaf().unwrap());
    }

    #[test]
    fn test_sql_statements_sorted_by_file() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("b.sql"), "CREATE TABLE b (id int);").unwrap();
        fs::write(root.path().join("a.sql"), "CREATE TABLE a (id int);").unwrap();
        fs::write(root.path().join("notes.txt"), "not sql").unwrap();

        let dir = SchemaDir::new(root.path());
        let stmts = dir.sql_statements().unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("TABLE a"));
        assert!(stmts[1].contains("TABLE b"));
    }

    #[test]
    fn test_subdirs_missing_directory_errors() {
        let dir = SchemaDir::new("/nonexistent/schemadrift-test");
        assert!(dir.subdirs().is_err());
    }
}
