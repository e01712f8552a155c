use chrono::Utc;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use argus_core::ids::ReportId;
use argus_core::report::ComplianceReport;

use crate::database::Database;
use crate::error::StoreError;

/// Metadata columns of a stored report, without the JSON payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: ReportId,
    pub run_id: String,
    pub framework: String,
    pub target: String,
    pub finding_count: u32,
    pub suppressed_count: u32,
    pub created_at: String,
}

pub struct ReportRepo {
    db: Database,
}

impl ReportRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a finished report. The full record lands in a JSON column;
    /// scope and tallies are broken out for listing and baseline lookup.
    #[instrument(skip(self, report), fields(report_id = %report.id))]
    pub fn save(&self, report: &ComplianceReport) -> Result<ReportId, StoreError> {
        let payload = serde_json::to_string(report)?;
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (id, run_id, framework, target, finding_count, suppressed_count, created_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    report.id.as_str(),
                    report.metadata.run_id.as_str(),
                    report.scope.framework,
                    report.scope.target,
                    report.summary.total,
                    report.summary.suppressed_count,
                    now,
                    payload,
                ],
            )?;
            Ok(report.id.clone())
        })
    }

    #[instrument(skip(self), fields(report_id = %id))]
    pub fn load(&self, id: &ReportId) -> Result<ComplianceReport, StoreError> {
        let payload: String = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT payload FROM reports WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(id.clone()),
                other => other.into(),
            })
        })?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// The most recent report for a (framework, target) pair, the natural
    /// baseline for a drift comparison.
    #[instrument(skip(self))]
    pub fn latest_for_scope(
        &self,
        framework: &str,
        target: &str,
    ) -> Result<Option<ComplianceReport>, StoreError> {
        let payload: Option<String> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT payload FROM reports WHERE framework = ?1 AND target = ?2
                 ORDER BY created_at DESC LIMIT 1",
                [framework, target],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// All stored reports, newest first, metadata only.
    pub fn list(&self) -> Result<Vec<ReportRow>, StoreError> {
        self.db.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT id, run_id, framework, target, finding_count, suppressed_count, created_at
                     FROM reports ORDER BY created_at DESC",
                )?
                .query_map([], |row| {
                    Ok(ReportRow {
                        id: ReportId::from_raw(row.get::<_, String>(0)?),
                        run_id: row.get(1)?,
                        framework: row.get(2)?,
                        target: row.get(3)?,
                        finding_count: row.get(4)?,
                        suppressed_count: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::ids::RunId;
    use argus_core::report::{ReportMetadata, ReportScope, SeveritySummary};
    use argus_core::tokens::AccumulatedTokens;

    fn report(framework: &str, target: &str) -> ComplianceReport {
        ComplianceReport {
            id: ReportId::new(),
            scope: ReportScope {
                framework: framework.into(),
                target: target.into(),
                file_count: 3,
                component_count: 1,
            },
            findings: vec![],
            summary: SeveritySummary::default(),
            coverage: vec![],
            metadata: ReportMetadata {
                run_id: RunId::new(),
                generated_at: Utc::now().to_rfc3339(),
                tasks_planned: 2,
                tasks_completed: 2,
                tasks_failed: 0,
                tasks_skipped: 0,
                tokens: AccumulatedTokens::default(),
            },
        }
    }

    fn repo() -> ReportRepo {
        ReportRepo::new(Database::in_memory().unwrap())
    }

    #[test]
    fn save_and_load_roundtrip() {
        let repo = repo();
        let r = report("owasp-asvs", "/srv/app");
        let id = repo.save(&r).unwrap();
        assert_eq!(id, r.id);

        let loaded = repo.load(&id).unwrap();
        assert_eq!(loaded.scope.framework, "owasp-asvs");
        assert_eq!(loaded.metadata.tasks_planned, 2);
    }

    #[test]
    fn load_missing_is_not_found() {
        let repo = repo();
        let err = repo.load(&ReportId::from_raw("rpt_missing")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn latest_for_scope_picks_newest() {
        let repo = repo();
        let older = report("owasp-asvs", "/srv/app");
        repo.save(&older).unwrap();
        // created_at has second precision; force distinct ordering through
        // a direct update instead of sleeping.
        repo.db
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE reports SET created_at = '2020-01-01T00:00:00Z' WHERE id = ?1",
                    [older.id.as_str()],
                )?;
                Ok(())
            })
            .unwrap();
        let newer = report("owasp-asvs", "/srv/app");
        repo.save(&newer).unwrap();

        let latest = repo.latest_for_scope("owasp-asvs", "/srv/app").unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[test]
    fn latest_for_scope_misses_other_targets() {
        let repo = repo();
        repo.save(&report("owasp-asvs", "/srv/app")).unwrap();
        let none = repo.latest_for_scope("owasp-asvs", "/srv/other").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn list_newest_first() {
        let repo = repo();
        let a = report("owasp-asvs", "/a");
        repo.save(&a).unwrap();
        repo.db
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE reports SET created_at = '2020-01-01T00:00:00Z' WHERE id = ?1",
                    [a.id.as_str()],
                )?;
                Ok(())
            })
            .unwrap();
        let b = report("owasp-asvs", "/b");
        repo.save(&b).unwrap();

        let rows = repo.list().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, b.id);
        assert_eq!(rows[1].id, a.id);
    }
}
