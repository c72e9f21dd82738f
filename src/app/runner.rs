use std::fs;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use super::domain::{RenderOptions, StatsRecord};
use super::error::Result;
use super::infrastructure::files::log_targets;
use super::services::stats::StatsProvider;
use super::services::svg_updater::DocumentUpdater;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub documents: Vec<PathBuf>,
    pub render: RenderOptions,
    /// Print a diff per document instead of writing it.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub updates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub record: StatsRecord,
    pub documents: Vec<DocumentOutcome>,
}

fn preview(updater: &DocumentUpdater, record: &StatsRecord, path: &Path) -> Result<usize> {
    let original = fs::read_to_string(path)?;
    let rendered = updater.render(record, &original)?;
    let label = path.display().to_string();
    let diff = TextDiff::from_lines(&original, &rendered.output);
    print!(
        "{}",
        diff.unified_diff().context_radius(1).header(&label, &label)
    );
    log::info!("{} slot(s) would change in {}", rendered.updates, label);
    Ok(rendered.updates)
}

/// Fetch the record once, then update every document in order. The first
/// failure stops the run.
pub fn run(provider: &dyn StatsProvider, options: &RunOptions) -> Result<RunSummary> {
    options.render.validate()?;
    let record = provider.fetch()?;
    log::info!("Retrieved stats: {:?}", record);

    log_targets(options.documents.iter().map(PathBuf::as_path));

    let updater = DocumentUpdater::new(options.render);
    let mut documents = Vec::with_capacity(options.documents.len());
    for path in &options.documents {
        let updates = if options.dry_run {
            preview(&updater, &record, path)?
        } else {
            updater.update(&record, path, path)?
        };
        documents.push(DocumentOutcome {
            path: path.clone(),
            updates,
        });
    }

    Ok(RunSummary { record, documents })
}
