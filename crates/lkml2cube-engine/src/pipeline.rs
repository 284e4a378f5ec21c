//! Translation pipeline
//!
//! Runs view translation, explore resolution and assembly in the
//! combination selected by [`TranslateOptions`].

use lkml2cube_core::{
    AllowlistRules, Cube, Diagnostic, ErrorCode, IntermediateModel, ReportSummary,
    Severity, TranslateError,
};
use crate::assembler::assemble;
use crate::explores::{resolve_joins, ResolvedExplore};
use crate::views::translate_view;

/// Switches selecting which translation stages run
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    /// Translate views only and ignore explores
    pub views_only: bool,

    /// Translate every view standalone and merge explore joins into them.
    /// When false, only views reached by an explore are emitted.
    pub merge_explore_joins: bool,

    /// Drop explores that fail to resolve instead of aborting
    pub skip_invalid_explores: bool,

    /// Views excluded from translation
    pub allowlist: AllowlistRules,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            views_only: false,
            merge_explore_joins: true,
            skip_invalid_explores: false,
            allowlist: AllowlistRules::default(),
        }
    }
}

impl TranslateOptions {
    /// Views translated standalone, no joins
    pub fn views_only() -> Self {
        Self { views_only: true, ..Self::default() }
    }

    /// Cubes emitted only for views reached through explores
    pub fn explores_only() -> Self {
        Self { merge_explore_joins: false, ..Self::default() }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutput {
    /// Cubes in output order
    pub cubes: Vec<Cube>,

    /// Warnings about skipped views and explores
    pub diagnostics: Vec<Diagnostic>,

    /// Explores dropped from the run
    pub skipped_explores: Vec<String>,
}

impl TranslationOutput {
    /// Run counts for the report
    pub fn summary(&self, model: &IntermediateModel) -> ReportSummary {
        ReportSummary {
            views: model.view_count(),
            explores: model.explore_count(),
            cubes: self.cubes.len(),
            joins: self.cubes.iter().map(|c| c.joins.len()).sum(),
            skipped_explores: self.skipped_explores.len(),
            ..Default::default()
        }
    }
}

/// Translate an intermediate model into cubes
///
/// Fails with the first error unless `skip_invalid_explores` is set, in
/// which case a failing explore contributes nothing and is reported as a
/// warning. View translation errors always abort the run.
pub fn translate(
    model: &IntermediateModel,
    options: &TranslateOptions,
) -> Result<TranslationOutput, TranslateError> {
    let mut diagnostics = Vec::new();
    let mut skipped_explores = Vec::new();

    let mut cubes = Vec::new();
    if options.views_only || options.merge_explore_joins {
        for view in model.views() {
            if options.allowlist.is_view_skipped(&view.name) {
                tracing::info!("Skipping view '{}' (allowlist)", view.name);
                continue;
            }
            cubes.push(translate_view(view)?);
        }
    }

    let mut resolved: Vec<ResolvedExplore> = Vec::new();
    if !options.views_only {
        for explore in model.explores() {
            if let Some(view) = model
                .views()
                .map(|v| v.name.as_str())
                .find(|name| options.allowlist.is_view_skipped(name) && explore.references_view(name))
            {
                tracing::warn!("Skipping explore '{}': view '{}' is skipped", explore.name, view);
                diagnostics.push(
                    Diagnostic::new(
                        ErrorCode::ViewSkipped,
                        Severity::Warn,
                        format!("Explore '{}' references skipped view '{}'", explore.name, view),
                    )
                    .with_entity(&explore.name),
                );
                skipped_explores.push(explore.name.clone());
                continue;
            }

            match resolve_joins(explore, model) {
                Ok(explore) => resolved.push(explore),
                Err(e) if options.skip_invalid_explores => {
                    tracing::warn!("Skipping explore '{}': {}", explore.name, e);
                    diagnostics.push(e.to_diagnostic(Severity::Warn));
                    skipped_explores.push(explore.name.clone());
                }
                Err(e) => return Err(e),
            }
        }
    }

    let cubes = assemble(model, cubes, &resolved)?;

    tracing::info!(
        cubes = cubes.len(),
        explores = resolved.len(),
        skipped = skipped_explores.len(),
        "Translation finished"
    );

    Ok(TranslationOutput {
        cubes,
        diagnostics,
        skipped_explores,
    })
}
