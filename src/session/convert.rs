use std::path::PathBuf;

use rayon::prelude::*;

use crate::{
    document::model::{SourceDeck, TemplateCatalog},
    document::output::{DocumentWriter, OutputDocument, SharedDocument},
    foundation::core::MAX_ATTEMPTS,
    foundation::error::{DeckError, DeckResult},
    place::strategy::PlacementRegistry,
    render::backend::RenderBackend,
    verify::judge::{AcceptAll, Judge},
    workflow::machine::{RunContext, RunLimits, run_item},
    workflow::state::ItemResult,
};

/// Options controlling a conversion job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Failed quality checks allowed per item.
    pub max_attempts: u32,
    /// Per-run step budget. `None` derives it from `max_attempts`.
    pub max_steps: Option<u32>,
    /// Write baseline and candidate rasters (`orig_{i}.png`, `new_{i}.png`) here.
    pub artifact_dir: Option<PathBuf>,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            threads: None,
            max_attempts: MAX_ATTEMPTS,
            max_steps: None,
            artifact_dir: None,
        }
    }
}

impl ConvertOpts {
    /// Reject option combinations no job can run with.
    pub fn validate(&self) -> DeckResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(DeckError::validation("'threads' must be >= 1 when set"));
        }
        if self.max_attempts == 0 {
            return Err(DeckError::validation("'max_attempts' must be >= 1"));
        }
        if let Some(n) = self.max_steps
            && n == 0
        {
            return Err(DeckError::validation("'max_steps' must be >= 1 when set"));
        }
        Ok(())
    }

    /// Per-run bounds implied by these options.
    pub fn limits(&self) -> RunLimits {
        let mut limits = RunLimits::new(self.max_attempts);
        if let Some(n) = self.max_steps {
            limits.max_steps = n;
        }
        limits
    }
}

/// Outcome of a conversion job: one result per source item plus the finished document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionReport {
    /// Item results in source order.
    pub results: Vec<ItemResult>,
    /// Output document in source order.
    pub document: OutputDocument,
}

impl ConversionReport {
    /// Items that passed verification.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Items that did not pass verification, fatal ones included.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Results whose run hit a precondition violation or panicked.
    pub fn fatal(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.iter().filter(|r| r.is_fatal())
    }

    /// Surface the first fatal run as a job-level error.
    ///
    /// Quality rejections and render failures are per-item outcomes and pass this check.
    pub fn check(&self) -> DeckResult<()> {
        match self.fatal().next() {
            Some(r) => Err(DeckError::precondition(format!(
                "item {}: {}",
                r.index,
                r.feedback.as_deref().unwrap_or("run aborted")
            ))),
            None => Ok(()),
        }
    }
}

/// Converts whole decks against one template catalog.
///
/// A session owns the catalog, render backend and placement strategies; each
/// [`ConvertSession::convert`] call runs one job with a fresh shared output document.
pub struct ConvertSession {
    catalog: TemplateCatalog,
    backend: Box<dyn RenderBackend>,
    placements: PlacementRegistry,
    judge: Box<dyn Judge>,
    opts: ConvertOpts,
}

impl ConvertSession {
    /// Construct a session, validating the catalog and options up front.
    pub fn new(
        catalog: TemplateCatalog,
        backend: Box<dyn RenderBackend>,
        opts: ConvertOpts,
    ) -> DeckResult<Self> {
        catalog.validate()?;
        opts.validate()?;
        Ok(Self {
            catalog,
            backend,
            placements: PlacementRegistry::default(),
            judge: Box::new(AcceptAll),
            opts,
        })
    }

    /// Replace the placement strategies.
    pub fn with_placements(mut self, placements: PlacementRegistry) -> Self {
        self.placements = placements;
        self
    }

    /// Replace the acceptance hook.
    pub fn with_judge(mut self, judge: Box<dyn Judge>) -> Self {
        self.judge = judge;
        self
    }

    /// Template catalog of this session.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Options of this session.
    pub fn opts(&self) -> &ConvertOpts {
        &self.opts
    }

    /// Convert every item of `deck` into a fresh [`OutputDocument`].
    pub fn convert(&self, deck: &SourceDeck) -> DeckResult<ConversionReport> {
        self.convert_into(deck, Box::new(OutputDocument::new()))
    }

    /// Convert every item of `deck`, writing through `writer`.
    ///
    /// Runs execute concurrently on a dedicated pool; every structural write goes through one
    /// document-wide lock. Returns once all runs have finished, with exactly one result per
    /// item. Per-item failures never abort the job.
    #[tracing::instrument(level = "info", skip_all, fields(items = deck.items.len()))]
    pub fn convert_into(
        &self,
        deck: &SourceDeck,
        writer: Box<dyn DocumentWriter>,
    ) -> DeckResult<ConversionReport> {
        deck.validate()?;
        let pool = build_thread_pool(self.opts.threads)?;
        let document = SharedDocument::with_writer(writer);
        let ctx = RunContext {
            catalog: &self.catalog,
            document: &document,
            backend: self.backend.as_ref(),
            placements: &self.placements,
            judge: self.judge.as_ref(),
            limits: self.opts.limits(),
            artifact_dir: self.opts.artifact_dir.as_deref(),
        };

        let results: Vec<ItemResult> = pool.install(|| {
            deck.items
                .par_iter()
                .enumerate()
                .map(|(pos, item)| run_item(&ctx, pos + 1, item))
                .collect()
        });

        let document = document.finalize();
        let report = ConversionReport { results, document };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            produced = report.document.len(),
            "conversion finished"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for ConvertSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertSession")
            .field("layouts", &self.catalog.len())
            .field("placements", &self.placements)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

fn build_thread_pool(threads: Option<usize>) -> DeckResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DeckError::validation("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DeckError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/convert.rs"]
mod tests;
