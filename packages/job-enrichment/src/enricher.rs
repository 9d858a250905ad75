//! Enrichment orchestrator.
//!
//! Fans detail fetches and skill matching for a batch of summary records out
//! over a [`WorkerPool`]. Each job carries the index of its record; results
//! are written back here, once per record, after the pool has been joined.
//! Nothing in a batch can fail the batch: fetch errors and panics both end as
//! an empty skill list for the affected record.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DEFAULT_WORKERS;
use crate::error::{FetchError, FetchResult};
use crate::fetcher::DetailFetcher;
use crate::pool::{Completed, JobPanicked, WorkerPool};
use crate::record::SummaryRecord;
use crate::session::Session;
use crate::skills::{match_targeted, SkillMatcher};

/// Per-call knobs shared by [`Enricher::enrich`] and [`Enricher::filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Only the first `limit` records are processed
    pub limit: Option<usize>,

    /// Worker pool width
    pub workers: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            limit: None,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl EnrichOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    fn selected(&self, available: usize) -> usize {
        self.limit.map_or(available, |limit| limit.min(available))
    }
}

/// Outcome counts for one [`Enricher::enrich`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichReport {
    /// Records in the processed prefix
    pub selected: usize,

    /// Records that ended with at least one skill
    pub enriched: usize,

    /// Records whose fetch failed or whose job panicked
    pub failed: usize,
}

/// Runs enrichment passes against a shared [`DetailFetcher`].
pub struct Enricher<S: Session + 'static> {
    fetcher: Arc<DetailFetcher<S>>,
}

impl<S: Session + 'static> Clone for Enricher<S> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<S: Session + 'static> Enricher<S> {
    pub fn new(fetcher: DetailFetcher<S>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn fetcher(&self) -> &DetailFetcher<S> {
        &self.fetcher
    }

    /// Set `skills` on every record in the selected prefix.
    ///
    /// With no (non-blank) `skills` the curated vocabulary is matched and
    /// canonical names are written; otherwise only the caller's skills are
    /// looked for and written in the caller's spelling. Records past the
    /// prefix are left untouched.
    pub async fn enrich(
        &self,
        records: &mut [SummaryRecord],
        skills: &[String],
        options: &EnrichOptions,
    ) -> EnrichReport {
        let selected = options.selected(records.len());
        let matcher = Arc::new(SkillMatcher::for_skills(skills));

        info!(
            selected = selected,
            total = records.len(),
            workers = options.workers,
            targeted = matches!(*matcher, SkillMatcher::Targeted(_)),
            "Enriching records"
        );

        let urls: Vec<String> = records[..selected]
            .iter()
            .map(|record| record.detail_url.clone())
            .collect();

        let fetcher = self.fetcher.clone();
        let completed = WorkerPool::new(options.workers)
            .run(urls, move |url| {
                let fetcher = fetcher.clone();
                let matcher = matcher.clone();
                async move {
                    let text = fetcher.try_fetch(&url).await?;
                    Ok::<_, FetchError>(matcher.match_text(&text))
                }
            })
            .await;

        let mut report = EnrichReport {
            selected,
            ..EnrichReport::default()
        };
        let mut written = vec![false; selected];

        for Completed { index, result } in completed {
            let skills = job_outcome(&records[index], result).unwrap_or_else(|| {
                report.failed += 1;
                Vec::new()
            });
            if !skills.is_empty() {
                report.enriched += 1;
            }
            records[index].skills = Some(skills);
            written[index] = true;
        }

        // A job that never reported (its worker died) still leaves its
        // record with an answer.
        for (record, _) in records[..selected]
            .iter_mut()
            .zip(&written)
            .filter(|(_, written)| !**written)
        {
            warn!(url = %record.detail_url, "No result for record; recording no skills");
            record.skills = Some(Vec::new());
            report.failed += 1;
        }

        info!(
            selected = report.selected,
            enriched = report.enriched,
            failed = report.failed,
            "Enrichment complete"
        );

        report
    }

    /// Keep only records whose detail page mentions at least one of `skills`.
    ///
    /// Kept records have `skills` set to the caller's skills that matched.
    /// Without any non-blank skill nothing is fetched and nothing is kept.
    /// The result is in completion order, not input order.
    pub async fn filter(
        &self,
        records: Vec<SummaryRecord>,
        skills: &[String],
        options: &EnrichOptions,
    ) -> Vec<SummaryRecord> {
        let skills: Vec<String> = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if skills.is_empty() {
            info!("No skills given, filter keeps nothing");
            return Vec::new();
        }

        let mut records = records;
        records.truncate(options.selected(records.len()));

        info!(
            selected = records.len(),
            workers = options.workers,
            skills = ?skills,
            "Filtering records by skill"
        );

        let urls: Vec<String> = records
            .iter()
            .map(|record| record.detail_url.clone())
            .collect();

        let fetcher = self.fetcher.clone();
        let skills = Arc::new(skills);
        let completed = WorkerPool::new(options.workers)
            .run(urls, move |url| {
                let fetcher = fetcher.clone();
                let skills = skills.clone();
                async move {
                    let text = fetcher.try_fetch(&url).await?;
                    Ok::<_, FetchError>(match_targeted(&text, skills.as_slice()))
                }
            })
            .await;

        let mut slots: Vec<Option<SummaryRecord>> = records.into_iter().map(Some).collect();
        let mut kept = Vec::new();

        for Completed { index, result } in completed {
            let Some(record) = slots[index].as_ref() else {
                continue;
            };
            let matched = match job_outcome(record, result) {
                Some(matched) if !matched.is_empty() => matched,
                _ => continue,
            };
            if let Some(mut record) = slots[index].take() {
                record.skills = Some(matched);
                kept.push(record);
            }
        }

        info!(kept = kept.len(), "Filtering complete");
        kept
    }
}

/// Skills produced by one job, or `None` when the job failed.
fn job_outcome(
    record: &SummaryRecord,
    result: Result<FetchResult<Vec<String>>, JobPanicked>,
) -> Option<Vec<String>> {
    match result {
        Ok(Ok(skills)) => Some(skills),
        Ok(Err(e)) => {
            warn!(url = %record.detail_url, title = %record.title, error = %e, "Detail fetch failed; recording no skills");
            None
        }
        Err(e) => {
            warn!(url = %record.detail_url, title = %record.title, error = %e, "Enrichment job panicked; recording no skills");
            None
        }
    }
}
