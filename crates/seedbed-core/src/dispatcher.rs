//! Executing one import job
//!
//! The dispatcher turns a payload into rows, resolves an importer per row
//! through the registry and routes it to the element or setting saver. A row
//! that fails is recorded and skipped; its siblings still run. Rows are
//! processed strictly in order since later rows may refer to items created
//! by earlier ones.

use seedbed_core_types::JobId;

use crate::collaborators::{DiagnosticsSink, ElementSaver, SeedTracker, SettingSaver, TracingSink};
use crate::errors::{ErrorBag, ExError, ImportError, Result};
use crate::importers::{Importer, ImporterKind, ImporterRegistry};
use crate::model::{Job, Payload, Row, SaveStatus, SavedItem, SeedContext, Weed};

static TRACING_SINK: TracingSink = TracingSink;

/// What happened to one row
#[derive(Debug, Clone)]
pub enum RowOutcome {
    /// The row was persisted; `tracked` is true if a weed was written for it
    Saved { item: SavedItem, tracked: bool },
    /// The row was skipped
    Failed(ExError),
}

impl RowOutcome {
    pub fn saved(&self) -> Option<&SavedItem> {
        match self {
            RowOutcome::Saved { item, .. } => Some(item),
            RowOutcome::Failed(_) => None,
        }
    }
}

/// Per-row result of one dispatch call
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// One entry per row, in payload order
    pub outcomes: Vec<RowOutcome>,
    /// Every error of the call, including payload-level ones
    pub errors: ErrorBag,
}

impl DispatchReport {
    /// The most recently persisted item
    pub fn last_saved(&self) -> Option<&SavedItem> {
        self.outcomes.iter().rev().find_map(RowOutcome::saved)
    }

    pub fn into_last_saved(self) -> Option<SavedItem> {
        self.outcomes.into_iter().rev().find_map(|outcome| match outcome {
            RowOutcome::Saved { item, .. } => Some(item),
            RowOutcome::Failed(_) => None,
        })
    }

    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.saved().is_some()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.saved_count()
    }

    /// Number of rows for which a weed record was written
    pub fn tracked_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Saved { tracked: true, .. }))
            .count()
    }
}

/// Routes resolved rows to the persistence collaborators
pub struct ImportDispatcher<'a> {
    registry: &'a ImporterRegistry,
    elements: &'a dyn ElementSaver,
    settings: &'a dyn SettingSaver,
    seeds: &'a dyn SeedTracker,
    sink: &'a dyn DiagnosticsSink,
}

impl<'a> ImportDispatcher<'a> {
    pub fn new(
        registry: &'a ImporterRegistry,
        elements: &'a dyn ElementSaver,
        settings: &'a dyn SettingSaver,
        seeds: &'a dyn SeedTracker,
    ) -> Self {
        Self {
            registry,
            elements,
            settings,
            seeds,
            sink: &TRACING_SINK,
        }
    }

    /// Dispatcher over a store that saves both kinds and tracks seeds
    pub fn with_store<S>(registry: &'a ImporterRegistry, store: &'a S) -> Self
    where
        S: ElementSaver + SettingSaver + SeedTracker,
    {
        Self::new(registry, store, store, store)
    }

    /// Replace the default tracing sink
    pub fn with_sink(mut self, sink: &'a dyn DiagnosticsSink) -> Self {
        self.sink = sink;
        self
    }

    /// Save every row of `payload`, returning the last persisted item
    ///
    /// An absent or empty payload does nothing and returns `None`.
    pub fn save(&self, payload: Option<Payload>, seed: Option<&SeedContext>) -> Option<SavedItem> {
        self.dispatch(payload, seed).into_last_saved()
    }

    /// Save every row of `payload`, reporting each row's outcome
    pub fn dispatch(&self, payload: Option<Payload>, seed: Option<&SeedContext>) -> DispatchReport {
        self.dispatch_inner(payload, seed, None)
    }

    /// Execute a queued job; errors carry the job's identifier
    pub fn run_job(&self, job: Job) -> DispatchReport {
        self.dispatch_inner(Some(job.payload), Some(&job.seed), Some(&job.id))
    }

    fn dispatch_inner(
        &self,
        payload: Option<Payload>,
        seed: Option<&SeedContext>,
        job_id: Option<&JobId>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        let payload = match payload {
            Some(payload) if !payload.is_empty() => payload,
            _ => return report,
        };

        let values = match payload.into_values() {
            Ok(values) => values,
            Err(err) => {
                let err = tag(ExError::from(err).with_op("dispatch"), job_id);
                report.errors.push(err);
                self.sink.record(&report.errors);
                return report;
            }
        };

        tracing::debug!(rows_len = values.len(), "Dispatching import rows");

        for (index, value) in values.into_iter().enumerate() {
            let outcome = match self.save_row(value, seed) {
                Ok((item, tracking)) => {
                    let tracked = match tracking {
                        Ok(tracked) => tracked,
                        Err(err) => {
                            let err = tag(err.with_row_index(index), job_id);
                            report.errors.add("seed", err);
                            false
                        }
                    };
                    RowOutcome::Saved { item, tracked }
                }
                Err((key, err)) => {
                    let err = tag(err.with_row_index(index), job_id);
                    match key {
                        Some(key) => report.errors.add(key, err.clone()),
                        None => report.errors.push(err.clone()),
                    }
                    RowOutcome::Failed(err)
                }
            };
            report.outcomes.push(outcome);
        }

        if !report.errors.is_empty() {
            self.sink.record(&report.errors);
        }
        report
    }

    /// Resolve, route and save one row, then track it if seeding applies
    ///
    /// The outer error is a row failure (with an explicit error-bag key for
    /// save failures). The inner result reports whether a weed was written.
    #[allow(clippy::type_complexity)]
    fn save_row(
        &self,
        value: serde_json::Value,
        seed: Option<&SeedContext>,
    ) -> std::result::Result<(SavedItem, Result<bool>), (Option<&'static str>, ExError)> {
        let row = Row::try_from(value).map_err(|e| (None, ExError::from(e)))?;
        let importer = self
            .registry
            .resolve(row)
            .map_err(|e| (None, ExError::from(e)))?;

        let item = self.route(&importer).map_err(|e| {
            let err = if e.model().is_none() {
                e.with_model(importer.model())
            } else {
                e
            };
            match err.kind() {
                crate::errors::ExErrorKind::NotSavable => (None, err),
                _ => (Some("save"), err),
            }
        })?;

        tracing::debug!(
            model = importer.model(),
            item_id = item.item_id(),
            status = ?item.status,
            "Row saved"
        );

        let tracking = match seed {
            Some(seed) => self.track(&importer, &item, seed),
            None => Ok(false),
        };
        Ok((item, tracking))
    }

    fn route(&self, importer: &Importer) -> Result<SavedItem> {
        match importer.kind() {
            ImporterKind::Element => self.elements.save_element(importer),
            ImporterKind::Setting => self.settings.save_setting(importer),
            ImporterKind::Field => Err(ImportError::NotSavable {
                model: importer.model().to_string(),
            }
            .into()),
        }
    }

    fn track(&self, importer: &Importer, item: &SavedItem, seed: &SeedContext) -> Result<bool> {
        if !seed.enabled() || item.status != SaveStatus::Created {
            return Ok(false);
        }
        let Some(item_id) = item.item_id() else {
            return Ok(false);
        };

        let weed = Weed::record(item_id, importer.model(), seed);
        self.seeds.track_seed(&weed)?;
        Ok(true)
    }
}

fn tag(err: ExError, job_id: Option<&JobId>) -> ExError {
    match job_id {
        Some(id) => err.with_job_id(id.clone()),
        None => err,
    }
}
