//! Input record source.
//!
//! One provisioning record per CSV data line. Comma-separated with no
//! quoting, so embedded commas cannot be escaped. The first line is a
//! header and is always discarded.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ParseError;

/// Number of fields per data line.
const FIELD_COUNT: usize = 5;

/// A 1-based file line number paired with the parse result for that line.
pub type InputLine = (usize, Result<UserRecord, ParseError>);

/// One row of input: an account to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub display_name: String,
    pub mail_nickname: String,
    pub user_principal_name: String,
    pub password: String,
    pub role_name: String,
}

impl UserRecord {
    /// Parse a single data line.
    ///
    /// Password complexity is not checked here; the directory service
    /// enforces its own policy and rejects the creation call instead.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount { found: parts.len() });
        }

        let record = Self {
            display_name: parts[0].to_string(),
            mail_nickname: parts[1].to_string(),
            user_principal_name: parts[2].to_string(),
            password: parts[3].to_string(),
            role_name: parts[4].to_string(),
        };
        record.validate()?;

        Ok(record)
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.display_name.is_empty() {
            return Err(ParseError::EmptyField {
                field: "display name",
            });
        }

        if !is_valid_mail_nickname(&self.mail_nickname) {
            return Err(ParseError::InvalidMailNickname(self.mail_nickname.clone()));
        }

        if !is_valid_principal_name(&self.user_principal_name) {
            return Err(ParseError::InvalidPrincipalName(
                self.user_principal_name.clone(),
            ));
        }

        if self.password.is_empty() {
            return Err(ParseError::EmptyField { field: "password" });
        }

        if self.role_name.is_empty() {
            return Err(ParseError::EmptyField { field: "role name" });
        }

        Ok(())
    }
}

/// A mail alias local-part: ASCII letters, digits, dots, underscores, dashes.
fn is_valid_mail_nickname(nickname: &str) -> bool {
    !nickname.is_empty()
        && nickname
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// A syntactically plausible principal name: `local@domain`, both parts
/// non-empty, no whitespace, exactly one separator.
fn is_valid_principal_name(upn: &str) -> bool {
    if upn.chars().any(char::is_whitespace) {
        return false;
    }
    match upn.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// The input file, loaded once per run.
pub struct RecordFile {
    lines: Vec<String>,
}

impl RecordFile {
    /// Load the input file. A file with zero data lines yields an empty sequence.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// Build a record file from in-memory text.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(String::from).collect(),
        }
    }

    /// Records in file order, one per non-header line.
    ///
    /// The header line is skipped unconditionally. Line numbers are 1-based
    /// file positions, so the first data line is line 2.
    pub fn records(&self) -> impl Iterator<Item = InputLine> + '_ {
        self.lines
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, line)| (idx + 1, UserRecord::parse(line)))
    }

    /// Number of data lines (excluding the header).
    pub fn data_line_count(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }
}
