//! The bulk provisioning orchestrator.
//!
//! Drives each input record through the per-record workflow: existence
//! check, account creation, role lookup, role assignment. Every record is
//! processed independently; a failure is caught at the record boundary and
//! processing continues with the next record. Only an authentication
//! failure aborts the run, since no record can proceed without a credential.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::csv::{InputLine, UserRecord};
use crate::error::{AuthError, GraphError, RecordError};
use crate::graph::{GraphClient, NewUser, PasswordProfile};

/// Cooperative cancellation flag, observed before the sequence starts and
/// between records. Directory calls in flight are not interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal outcome of one record's provisioning attempt.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Account created and added to the requested role.
    CreatedWithRole { upn: String, role: String },

    /// Account created; the role name had no catalog match. Reported
    /// distinctly from a failure so operators can spot role-name typos
    /// without losing the created account.
    CreatedNoRole { upn: String, role_name: String },

    /// An account with this principal name already exists. Nothing was done.
    SkippedExists { upn: String },

    /// The record failed; the error says at which stage.
    Failed {
        upn: Option<String>,
        error: RecordError,
    },
}

/// One processed record, with the input file line it came from.
#[derive(Debug)]
pub struct RecordReport {
    pub line: usize,
    pub outcome: RecordOutcome,
}

impl fmt::Display for RecordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RecordOutcome::CreatedWithRole { upn, role } => {
                write!(f, "User {} created and added to role {}.", upn, role)
            }
            RecordOutcome::CreatedNoRole { upn, role_name } => {
                write!(
                    f,
                    "User {} created; role {:?} not found, no role assigned.",
                    upn, role_name
                )
            }
            RecordOutcome::SkippedExists { upn } => {
                write!(f, "User {} already exists, skipping.", upn)
            }
            RecordOutcome::Failed {
                upn: Some(upn),
                error,
            } => {
                write!(f, "Line {}: user {} failed: {}", self.line, upn, error)
            }
            RecordOutcome::Failed { upn: None, error } => {
                write!(f, "Line {}: {}", self.line, error)
            }
        }
    }
}

/// Run totals, reported once after the sequence completes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created_with_role: usize,
    pub created_no_role: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    /// Tally the outcomes of a finished run.
    pub fn summarize(reports: &[RecordReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.outcome {
                RecordOutcome::CreatedWithRole { .. } => summary.created_with_role += 1,
                RecordOutcome::CreatedNoRole { .. } => summary.created_no_role += 1,
                RecordOutcome::SkippedExists { .. } => summary.skipped += 1,
                RecordOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.created_with_role + self.created_no_role + self.skipped + self.failed
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records processed: {} created with role, {} created without role, {} skipped, {} failed",
            self.total(),
            self.created_with_role,
            self.created_no_role,
            self.skipped,
            self.failed
        )
    }
}

/// Bulk provisioning orchestrator.
pub struct BulkImporter {
    graph: Arc<GraphClient>,
}

impl BulkImporter {
    pub fn new(graph: Arc<GraphClient>) -> Self {
        Self { graph }
    }

    /// Process every input line, strictly sequentially, printing one status
    /// line per record.
    ///
    /// Returns the per-record reports. The only error is an authentication
    /// failure, which aborts the remainder of the run.
    pub async fn run<I>(
        &self,
        records: I,
        cancel: &CancelFlag,
    ) -> Result<Vec<RecordReport>, AuthError>
    where
        I: IntoIterator<Item = InputLine>,
    {
        let mut reports = Vec::new();

        for (line, parsed) in records {
            if cancel.is_cancelled() {
                warn!("Cancellation requested, stopping before line {}", line);
                break;
            }

            let outcome = match parsed {
                Err(parse_error) => {
                    error!("Line {}: {}", line, parse_error);
                    RecordOutcome::Failed {
                        upn: None,
                        error: parse_error.into(),
                    }
                }
                Ok(record) => self.provision(&record).await?,
            };

            let report = RecordReport { line, outcome };
            println!("{}", report);
            reports.push(report);
        }

        Ok(reports)
    }

    /// Run one record through the provisioning workflow.
    ///
    /// Per-record failures come back as a `Failed` outcome; the `Err` path
    /// is reserved for authentication failures, which are fatal to the run.
    async fn provision(&self, record: &UserRecord) -> Result<RecordOutcome, AuthError> {
        let upn = record.user_principal_name.clone();

        // Existence check: exact, case-sensitive match on the principal name.
        // Best-effort only; the directory remains the authority on uniqueness.
        let users = match self.graph.list_users().await {
            Ok(users) => users,
            Err(GraphError::Auth(e)) => return Err(e),
            Err(GraphError::Api(e)) => {
                return Ok(RecordOutcome::Failed {
                    upn: Some(upn),
                    error: RecordError::ExistenceCheck(e),
                });
            }
        };

        let exists = users
            .iter()
            .any(|u| u.user_principal_name.as_deref() == Some(upn.as_str()));
        if exists {
            info!("User {} already exists, skipping", upn);
            return Ok(RecordOutcome::SkippedExists { upn });
        }

        let new_user = NewUser {
            account_enabled: true,
            display_name: record.display_name.clone(),
            mail_nickname: record.mail_nickname.clone(),
            user_principal_name: record.user_principal_name.clone(),
            password_profile: PasswordProfile {
                password: record.password.clone(),
                force_change_password_next_sign_in: true,
            },
        };

        let created = match self.graph.create_user(&new_user).await {
            Ok(created) => created,
            Err(GraphError::Auth(e)) => return Err(e),
            Err(GraphError::Api(e)) => {
                return Ok(RecordOutcome::Failed {
                    upn: Some(upn),
                    error: RecordError::Create(e),
                });
            }
        };

        info!(
            "User {} ({}) registered",
            created.display_name_or_upn(),
            created.email_or_upn()
        );

        // Role assignment references the directory-assigned object id, not
        // the input principal name.
        let role = match self.graph.find_role_by_name(&record.role_name).await {
            Ok(role) => role,
            Err(GraphError::Auth(e)) => return Err(e),
            Err(GraphError::Api(e)) => {
                return Ok(RecordOutcome::Failed {
                    upn: Some(upn),
                    error: RecordError::AssignRole {
                        user_id: created.id,
                        source: e,
                    },
                });
            }
        };

        let Some(role) = role else {
            warn!(
                "Role {:?} not found; user {} stands created without a role",
                record.role_name, upn
            );
            return Ok(RecordOutcome::CreatedNoRole {
                upn,
                role_name: record.role_name.clone(),
            });
        };

        match self.graph.add_role_member(&role.id, &created.id).await {
            Ok(()) => Ok(RecordOutcome::CreatedWithRole {
                upn,
                role: role.display_name,
            }),
            Err(GraphError::Auth(e)) => Err(e),
            Err(GraphError::Api(e)) => Ok(RecordOutcome::Failed {
                upn: Some(upn),
                error: RecordError::AssignRole {
                    user_id: created.id,
                    source: e,
                },
            }),
        }
    }
}
