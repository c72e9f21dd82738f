//! Label-anchored substitution of badge values.
//!
//! Each `<text>` node is scanned left to right. A run whose text equals a
//! label token marks the start of a value region; the runs at the label's
//! offsets receive the rendered values. Each label fires at most once per
//! document.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::app::domain::{Label, LabelRule, RenderOptions, StatsRecord, TextDocument, TextNode};
use crate::app::domain::labels::label_rules;
use crate::app::error::{AppError, Result};
use crate::app::services::text_ops::extract_filename;

/// Output of one substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    pub updates: usize,
    pub matched: Vec<Label>,
}

pub struct DocumentUpdater {
    options: RenderOptions,
    rules: Vec<LabelRule>,
}

/// Write `values` into consecutive slots starting at `start`. Every index is
/// checked before anything is written, so a mismatch leaves the node intact.
fn write_values(
    node: &mut TextNode,
    label: Label,
    start: usize,
    values: &[String],
) -> Result<usize> {
    let available = node.slots.len();
    if let Some(last) = values.len().checked_sub(1) {
        if start + last >= available {
            return Err(AppError::StructuralMismatch {
                label: label.token(),
                index: start + last,
                available,
            });
        }
    }

    for (k, value) in values.iter().enumerate() {
        node.slots[start + k].set_text(value.as_str());
        log::info!("Updated {} slot {} to: {}", label.token(), start + k, value);
    }
    Ok(values.len())
}

impl DocumentUpdater {
    pub fn new(options: RenderOptions) -> Self {
        let rules = label_rules(&options);
        Self { options, rules }
    }

    fn apply_rule(
        &self,
        rule: &LabelRule,
        node: &mut TextNode,
        index: usize,
        record: &StatsRecord,
        satisfied: &mut HashSet<Label>,
    ) -> Result<usize> {
        log::info!("Found '{}' at slot {}", rule.label.token(), index);
        let values = rule.values(record, &self.options);
        let mut updates = write_values(node, rule.label, index + rule.offset, &values)?;
        satisfied.insert(rule.label);

        if let Some(nested) = rule.nested.as_deref() {
            if !satisfied.contains(&nested.label) {
                let found = (index + 1..node.slots.len())
                    .find(|&j| node.slots[j].text() == Some(nested.label.token()));
                if let Some(j) = found {
                    log::info!("Found '{}' at slot {}", nested.label.token(), j);
                    let values = nested.values(record, &self.options);
                    updates += write_values(node, nested.label, j + nested.offset, &values)?;
                    satisfied.insert(nested.label);
                }
            }
        }

        Ok(updates)
    }

    /// Apply every label rule to `document`. Returns the labels that fired,
    /// in the order they were found, and the number of slots written.
    pub fn apply(
        &self,
        record: &StatsRecord,
        document: &mut TextDocument,
    ) -> Result<(Vec<Label>, usize)> {
        let mut satisfied = HashSet::new();
        let mut matched = Vec::new();
        let mut updates = 0;

        for node in document.nodes.iter_mut() {
            for i in 0..node.slots.len() {
                let Some(text) = node.slots[i].text() else {
                    continue;
                };
                log::debug!("Processing slot: '{}'", text);

                let rule = self
                    .rules
                    .iter()
                    .find(|r| r.label.token() == text && !satisfied.contains(&r.label));
                if rule.is_none()
                    && text == Label::Uptime.token()
                    && self.options.uptime_since.is_none()
                {
                    log::warn!("Found an Uptime label but no reference date is set; skipping it");
                }
                if let Some(rule) = rule {
                    updates += self.apply_rule(rule, node, i, record, &mut satisfied)?;
                    matched.push(rule.label);
                    if let Some(nested) = rule.nested.as_deref() {
                        if satisfied.contains(&nested.label) && !matched.contains(&nested.label) {
                            matched.push(nested.label);
                        }
                    }
                }
            }
        }

        Ok((matched, updates))
    }

    /// Substitute values into `source` without touching the filesystem.
    pub fn render(&self, record: &StatsRecord, source: &str) -> Result<Rendered> {
        let mut document = TextDocument::parse(source)?;
        let (matched, updates) = self.apply(record, &mut document)?;
        Ok(Rendered {
            output: document.serialize(),
            updates,
            matched,
        })
    }

    /// Read `source`, substitute values and write the result to
    /// `destination`, which may be the same path. Nothing is written when
    /// parsing or substitution fails.
    pub fn update(&self, record: &StatsRecord, source: &Path, destination: &Path) -> Result<usize> {
        let name = extract_filename(source);
        log::info!("Starting SVG update for {}", source.display());

        let rendered = fs::read_to_string(source)
            .map_err(AppError::from)
            .and_then(|contents| self.render(record, &contents))
            .inspect_err(|e| log::error!("Failed to update {}: {}", name, e))?;

        log::info!("Total updates made to {}: {}", name, rendered.updates);
        if rendered.updates == 0 {
            log::warn!("No slots were updated in {}; labels may not match the template", name);
        }

        log::info!("Saving updates to {}", destination.display());
        fs::write(destination, &rendered.output)
            .inspect_err(|e| log::error!("Failed to write {}: {}", destination.display(), e))?;

        Ok(rendered.updates)
    }
}
