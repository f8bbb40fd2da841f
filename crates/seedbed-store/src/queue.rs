//! SQLite-backed job queue
//!
//! Jobs are claimed in FIFO order (by insertion sequence). A claimed job is
//! `running` until the worker marks it `completed` or `failed`. Failed jobs
//! are not retried.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, job_not_found, serialization_error, Result};
use crate::events::{emit_event, ImportEventKind};
use rusqlite::{Connection, OptionalExtension};
use seedbed_core::model::{Job, Payload, SeedContext};
use seedbed_core::ExError;
use seedbed_core::JobQueue;
use seedbed_core_types::{JobId, RequestId};
use std::str::FromStr;

/// Lifecycle state of a queued job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// A job together with its queue bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedJob {
    pub job: Job,
    pub status: JobStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Outcome of claiming a pending job
#[derive(Debug, Clone)]
pub enum Claim {
    /// The job is running and ready to dispatch
    Ready(Job),
    /// The stored job could not be decoded; it is already marked failed
    Rejected { job_id: JobId, error: ExError },
}

impl Claim {
    pub fn job_id(&self) -> &JobId {
        match self {
            Claim::Ready(job) => &job.id,
            Claim::Rejected { job_id, .. } => job_id,
        }
    }

    /// The decoded job, if the claim succeeded
    pub fn into_job(self) -> Option<Job> {
        match self {
            Claim::Ready(job) => Some(job),
            Claim::Rejected { .. } => None,
        }
    }
}

/// Number of jobs in each state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
}

impl QueueCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.running + self.completed + self.failed
    }
}

/// Job queue over the import_jobs table
pub struct SqliteJobQueue<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteJobQueue<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Claim the oldest pending job
    ///
    /// A job that decodes is marked running and returned as [`Claim::Ready`].
    /// A job whose stored payload or seed cannot be decoded is marked failed
    /// in the same transaction and returned as [`Claim::Rejected`].
    pub fn claim_next(&self) -> Result<Option<Claim>> {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;

        let raw = tx
            .query_row(
                "SELECT job_id, request_id, payload, seed FROM import_jobs
                 WHERE status = 'pending'
                 ORDER BY seq
                 LIMIT 1",
                [],
                read_raw_job,
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let job_id = raw.job_id.clone();
        let request_id = raw.request_id.clone();
        let now = chrono::Utc::now().timestamp();

        let claim = match raw.decode() {
            Ok(job) => {
                tx.execute(
                    "UPDATE import_jobs SET status = 'running', attempts = attempts + 1, updated_at = ?1
                     WHERE job_id = ?2",
                    rusqlite::params![now, job_id],
                )
                .map_err(from_rusqlite)?;
                emit_event(
                    &tx,
                    ImportEventKind::JobStarted,
                    Some(job_id.as_str()),
                    request_id.as_deref(),
                    None,
                )?;
                Claim::Ready(job)
            }
            Err(err) => {
                let err = err
                    .with_op("claim_next")
                    .with_job_id(JobId::from_string(job_id.clone()));
                tx.execute(
                    "UPDATE import_jobs SET status = 'failed', attempts = attempts + 1,
                     last_error = ?1, updated_at = ?2
                     WHERE job_id = ?3",
                    rusqlite::params![err.to_string(), now, job_id],
                )
                .map_err(from_rusqlite)?;
                emit_event(
                    &tx,
                    ImportEventKind::JobFailed,
                    Some(job_id.as_str()),
                    request_id.as_deref(),
                    Some(serde_json::json!({ "error": err.code() })),
                )?;
                tracing::warn!(job_id = %job_id, error = %err, "Undecodable job marked failed");
                Claim::Rejected {
                    job_id: JobId::from_string(job_id),
                    error: err,
                }
            }
        };

        tx.commit().map_err(from_rusqlite)?;
        Ok(Some(claim))
    }

    /// Mark a running job completed
    pub fn complete(&self, job_id: &JobId, metadata: serde_json::Value) -> Result<()> {
        self.finish(job_id, JobStatus::Completed, None, metadata)
    }

    /// Mark a running job failed with the reason
    pub fn fail(&self, job_id: &JobId, error: &str, metadata: serde_json::Value) -> Result<()> {
        self.finish(job_id, JobStatus::Failed, Some(error), metadata)
    }

    fn finish(
        &self,
        job_id: &JobId,
        status: JobStatus,
        error: Option<&str>,
        metadata: serde_json::Value,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;

        let changed = tx
            .execute(
                "UPDATE import_jobs SET status = ?1, last_error = ?2, updated_at = ?3
                 WHERE job_id = ?4",
                rusqlite::params![
                    status.as_str(),
                    error,
                    chrono::Utc::now().timestamp(),
                    job_id.as_str()
                ],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(job_not_found(job_id.as_str()));
        }

        let kind = match status {
            JobStatus::Failed => ImportEventKind::JobFailed,
            _ => ImportEventKind::JobCompleted,
        };
        emit_event(&tx, kind, Some(job_id.as_str()), None, Some(metadata))?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(())
    }

    /// Look up one job with its bookkeeping
    pub fn get(&self, job_id: &JobId) -> Result<Option<QueuedJob>> {
        let row = self
            .conn
            .query_row(
                "SELECT job_id, request_id, payload, seed, status, attempts, last_error
                 FROM import_jobs WHERE job_id = ?1",
                [job_id.as_str()],
                |row| {
                    Ok((
                        read_raw_job(row)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, u32>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some((raw, status, attempts, last_error)) = row else {
            return Ok(None);
        };

        Ok(Some(QueuedJob {
            job: raw.decode()?,
            status: status
                .parse()
                .map_err(|e: String| serialization_error("job status", e))?,
            attempts,
            last_error,
        }))
    }

    /// Job counts by status
    pub fn counts(&self) -> Result<QueueCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM import_jobs GROUP BY status")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut counts = QueueCounts::default();
        for (status, n) in rows {
            let n = n as u64;
            match status
                .parse::<JobStatus>()
                .map_err(|e| serialization_error("job status", e))?
            {
                JobStatus::Pending => counts.pending = n,
                JobStatus::Running => counts.running = n,
                JobStatus::Completed => counts.completed = n,
                JobStatus::Failed => counts.failed = n,
            }
        }
        Ok(counts)
    }
}

impl JobQueue for SqliteJobQueue<'_> {
    fn push(&self, job: &Job) -> Result<JobId> {
        let payload = serde_json::to_string(&job.payload)
            .map_err(|e| serialization_error("job payload", e))?;
        let seed =
            serde_json::to_string(&job.seed).map_err(|e| serialization_error("seed context", e))?;
        let now = chrono::Utc::now().timestamp();
        let request_id = job.request_id.as_ref().map(|r| r.as_str());

        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        tx.execute(
            "INSERT INTO import_jobs (job_id, request_id, payload, seed, status, enqueued_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)",
            rusqlite::params![job.id.as_str(), request_id, payload, seed, now],
        )
        .map_err(|e| from_rusqlite(e).with_op("queue_push").with_job_id(job.id.clone()))?;

        emit_event(
            &tx,
            ImportEventKind::JobQueued,
            Some(job.id.as_str()),
            request_id,
            Some(serde_json::json!({ "origin": job.seed.origin().as_str() })),
        )?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(job_id = %job.id, "Job queued");
        Ok(job.id.clone())
    }
}

struct RawJob {
    job_id: String,
    request_id: Option<String>,
    payload: String,
    seed: String,
}

impl RawJob {
    fn decode(self) -> Result<Job> {
        let payload: Payload = serde_json::from_str(&self.payload)
            .map_err(|e| serialization_error("job payload", e))?;
        let seed: SeedContext = serde_json::from_str(&self.seed)
            .map_err(|e| serialization_error("seed context", e))?;
        Ok(Job {
            id: JobId::from_string(self.job_id),
            request_id: self.request_id.map(RequestId::from_string),
            payload,
            seed,
        })
    }
}

fn read_raw_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJob> {
    Ok(RawJob {
        job_id: row.get(0)?,
        request_id: row.get(1)?,
        payload: row.get(2)?,
        seed: row.get(3)?,
    })
}
