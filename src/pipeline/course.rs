use tracing::{info, warn};

use crate::auth::Operator;
use crate::content::{CollectorError, ContentItem, ContentKind, ContentSink, ContentSource};
use crate::registry::{Institution, InstitutionId};
use crate::rewrite::{ChangeLog, Mode, RewriteError, Rewriter};

use super::polish::TextRewriter;

/// Settings for one course run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub target: InstitutionId,
    pub mode: Mode,
    /// Compute and report changes without writing them back.
    pub dry_run: bool,
    /// Passed through to the text rewriter.
    pub model: String,
}

/// What happened to a single item whose body changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub id: String,
    pub title: String,
    pub changes: ChangeLog,
    /// The text rewriter altered the body beyond the color pass.
    pub polished: bool,
    pub written: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindStats {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
    pub items: Vec<ItemOutcome>,
}

/// Per-kind results in processing order. A kind that could not be listed
/// holds its error; the kinds after it still ran.
#[derive(Debug)]
pub struct CourseReport {
    pub dry_run: bool,
    pub kinds: Vec<(ContentKind, Result<KindStats, CollectorError>)>,
}

impl CourseReport {
    pub fn total_updated(&self) -> usize {
        self.kinds
            .iter()
            .filter_map(|(_, result)| result.as_ref().ok())
            .map(|stats| stats.updated)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (ContentKind, &CollectorError)> + '_ {
        self.kinds
            .iter()
            .filter_map(|(kind, result)| result.as_ref().err().map(|err| (*kind, err)))
    }

    /// One line per kind, e.g. `Pages: 2/5 updated`.
    pub fn summary_lines(&self) -> Vec<String> {
        self.kinds
            .iter()
            .map(|(kind, result)| match result {
                Ok(stats) if stats.failed > 0 => format!(
                    "{kind}: {}/{} updated, {} failed",
                    stats.updated, stats.total, stats.failed
                ),
                Ok(stats) => format!("{kind}: {}/{} updated", stats.updated, stats.total),
                Err(err) => format!("{kind}: skipped ({err})"),
            })
            .collect()
    }
}

/// Rebrand every content kind of a course.
///
/// Fails only when the target is not registered; collaborator failures are
/// recorded in the report.
pub fn process_course<C>(
    operator: &Operator,
    store: &mut C,
    rewriter: &Rewriter<'_>,
    polisher: Option<&dyn TextRewriter>,
    options: &RunOptions,
) -> Result<CourseReport, RewriteError>
where
    C: ContentSource + ContentSink + ?Sized,
{
    let target = rewriter.target(&options.target)?;
    info!(
        operator = operator.name(),
        target = %target.id,
        mode = ?options.mode,
        dry_run = options.dry_run,
        "processing course"
    );

    let mut kinds = Vec::with_capacity(ContentKind::ALL.len());
    for kind in ContentKind::ALL {
        let result = process_kind(kind, &mut *store, rewriter, polisher, target, options);
        match &result {
            Ok(stats) => info!(%kind, total = stats.total, updated = stats.updated, "scanned"),
            Err(err) => warn!(%kind, error = %err, "skipping content kind"),
        }
        kinds.push((kind, result));
    }

    Ok(CourseReport {
        dry_run: options.dry_run,
        kinds,
    })
}

fn process_kind<C>(
    kind: ContentKind,
    store: &mut C,
    rewriter: &Rewriter<'_>,
    polisher: Option<&dyn TextRewriter>,
    target: &Institution,
    options: &RunOptions,
) -> Result<KindStats, CollectorError>
where
    C: ContentSource + ContentSink + ?Sized,
{
    let items = store.items(kind)?;
    let mut stats = KindStats {
        total: items.len(),
        ..KindStats::default()
    };

    for item in items {
        let Some((body, mut outcome)) = rebrand_item(&item, rewriter, polisher, target, options)
        else {
            continue;
        };

        if !options.dry_run {
            if let Err(err) = store.update(&item, &body) {
                warn!(%kind, id = %item.id, error = %err, "failed to write item");
                stats.failed += 1;
                continue;
            }
            outcome.written = true;
        }
        stats.updated += 1;
        stats.items.push(outcome);
    }

    Ok(stats)
}

/// The new body and its outcome, or `None` when the item is unchanged.
fn rebrand_item(
    item: &ContentItem,
    rewriter: &Rewriter<'_>,
    polisher: Option<&dyn TextRewriter>,
    target: &Institution,
    options: &RunOptions,
) -> Option<(String, ItemOutcome)> {
    if item.body.is_empty() {
        return None;
    }

    let rewrite = rewriter.rewrite_to(&item.body, target, options.mode);
    let mut body = rewrite.text;
    let mut polished = false;

    if let Some(polisher) = polisher {
        match polisher.polish(&body, target, &options.model) {
            Ok(text) => {
                polished = text != body;
                body = text;
            }
            Err(err) => {
                warn!(
                    kind = %item.kind,
                    id = %item.id,
                    error = %err,
                    "text rewriter failed, keeping color pass"
                );
            }
        }
    }

    if body == item.body {
        return None;
    }

    Some((
        body,
        ItemOutcome {
            id: item.id.clone(),
            title: item.title.clone(),
            changes: rewrite.changes,
            polished,
            written: false,
        },
    ))
}
