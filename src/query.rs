//! Policy-dump matching.
//!
//! Registration checks never parse the policy store; they grep the textual
//! dump from `semanage fcontext -l`. A query compiles to a line-anchored
//! regex in which every caller-supplied piece is escaped, so regex
//! metacharacters in path specs and context types match only themselves.

use anyhow::{Context, Result};
use regex::Regex;

use crate::constants::{SERANGE, SEROLE, SEUSER};
use crate::mapping::FileTypeCode;

/// Compiled predicate for one (path_spec, file_type, [security_type]) query.
///
/// With no security type the query asks "is *any* mapping registered for
/// this path and file type"; with one it asks "is *this exact* mapping
/// registered".
#[derive(Debug, Clone)]
pub struct PolicyQuery {
    line: Regex,
}

impl PolicyQuery {
    /// Compile the dump-line predicate.
    pub fn new(
        path_spec: &str,
        file_type: FileTypeCode,
        security_type: Option<&str>,
    ) -> Result<Self> {
        let mut pattern = format!(
            "^{}\\s+{}\\s+",
            regex::escape(path_spec),
            file_type.label()
        );
        if let Some(sectype) = security_type {
            pattern.push_str(&format!(
                "{SEUSER}:{SEROLE}:{}:{SERANGE}\\s*$",
                regex::escape(sectype)
            ));
        }
        let line = Regex::new(&pattern)
            .with_context(|| format!("invalid fcontext query pattern: {pattern}"))?;
        Ok(Self { line })
    }

    /// Whether any line of the policy dump satisfies the query.
    pub fn matches(&self, dump: &str) -> bool {
        dump.lines().any(|line| self.line.is_match(line))
    }

    /// The compiled pattern text, for diagnostics.
    pub fn pattern(&self) -> &str {
        self.line.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
/srv/app(/.*)?                                     directory          system_u:object_r:httpd_sys_content_t:s0 \n\
/srv/app/logs(/.*)?                                all files          system_u:object_r:var_log_t:s0 \n\
/var/lib/pgsql(/.*)?                               all files          system_u:object_r:postgresql_db_t:s0 \n";

    #[test]
    fn test_any_mapping_for_path_and_type() {
        let query = PolicyQuery::new("/srv/app(/.*)?", FileTypeCode::Directory, None).unwrap();
        assert!(query.matches(DUMP));

        // Registered, but as a different file type
        let query = PolicyQuery::new("/srv/app(/.*)?", FileTypeCode::Regular, None).unwrap();
        assert!(!query.matches(DUMP));
    }

    #[test]
    fn test_exact_triple() {
        let exact = PolicyQuery::new(
            "/srv/app(/.*)?",
            FileTypeCode::Directory,
            Some("httpd_sys_content_t"),
        )
        .unwrap();
        assert!(exact.matches(DUMP));

        let wrong_type = PolicyQuery::new(
            "/srv/app(/.*)?",
            FileTypeCode::Directory,
            Some("var_t"),
        )
        .unwrap();
        assert!(!wrong_type.matches(DUMP));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        // `.*` in the spec must not act as a wildcard against other entries.
        let query = PolicyQuery::new("/srv/.*", FileTypeCode::All, None).unwrap();
        assert!(!query.matches(DUMP));

        // The full-line anchor prevents prefix matches.
        let query = PolicyQuery::new("/srv/app", FileTypeCode::Directory, None).unwrap();
        assert!(!query.matches(DUMP));
    }

    #[test]
    fn test_trailing_whitespace_tolerated() {
        let query = PolicyQuery::new(
            "/srv/app/logs(/.*)?",
            FileTypeCode::All,
            Some("var_log_t"),
        )
        .unwrap();
        assert!(query.matches(DUMP));
    }
}
