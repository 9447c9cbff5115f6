use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::analysis::{ClauseProfile, RoundingMap};
use crate::comparator::{ClauseChecks, Comparison};
use crate::engine::{EngineConnection, ExecutionOptions, RetryPolicy, TimedExecution, TimedExecutor};
use crate::normalizer::Normalizer;
use crate::rewriter::{HintStripper, TableQualifier};
use crate::validator::{
    CheckKind, EngineRole, QueryVariant, RowOrderPolicy, ValidationPhase, ValidationReport, ValidatorConfig,
};

/// The two texts of one logical query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPair {
    pub original: String,
    pub optimized: String,
}

impl QueryPair {
    pub fn new(original: impl Into<String>, optimized: impl Into<String>) -> Self {
        Self { original: original.into(), optimized: optimized.into() }
    }
}

/// Query texts each engine actually receives, plus what was learned from
/// the optimized text.
#[derive(Debug, Clone)]
struct Prepared {
    profile: ClauseProfile,
    rounding: RoundingMap,
    reference: QueryPair,
    candidate: QueryPair,
}

impl Prepared {
    fn new(pair: &QueryPair, database: &str, config: &ValidatorConfig) -> Self {
        let original = HintStripper::strip(&pair.original);
        let optimized = HintStripper::strip(&pair.optimized);
        Self {
            profile: ClauseProfile::detect(&pair.optimized),
            rounding: RoundingMap::infer(&pair.optimized, config.default_aggregate_precision),
            candidate: QueryPair::new(
                TableQualifier::qualify(&original, database),
                TableQualifier::qualify(&optimized, database),
            ),
            reference: QueryPair::new(original, optimized),
        }
    }
}

/// One execution slot of the 2x2 grid.
struct Slot {
    engine: EngineRole,
    engine_name: String,
    variant: QueryVariant,
    execution: TimedExecution,
}

impl Slot {
    fn label(&self) -> String {
        format!("{}/{}", self.engine_name, self.variant)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Runs both variants of `pair` on both engines and compares the
    /// optimized results. Never fails: every fault ends up in the report.
    pub async fn validate<R, C>(&self, pair: &QueryPair, reference: &R, candidate: &C, database: &str) -> ValidationReport
    where
        R: EngineConnection,
        C: EngineConnection,
    {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("validate", run_id = %run_id, reference = reference.name(), candidate = candidate.name());
        self.run(run_id, pair, reference, candidate, database).instrument(span).await
    }

    async fn run<R, C>(
        &self,
        run_id: String,
        pair: &QueryPair,
        reference: &R,
        candidate: &C,
        database: &str,
    ) -> ValidationReport
    where
        R: EngineConnection,
        C: EngineConnection,
    {
        let mut report = ValidationReport::new(run_id, Utc::now());

        debug!(phase = %ValidationPhase::Prepare);
        let prepared = Prepared::new(pair, database, &self.config);
        report.clauses = prepared.profile;
        debug!(
            reference_query = %prepared.reference.optimized,
            candidate_query = %prepared.candidate.optimized,
            rounded_columns = prepared.rounding.len(),
            "queries prepared"
        );

        let slots = self.execute_all(&prepared, reference, candidate, database).await;

        for slot in &slots {
            report.performance_metrics.push(slot.engine, &slot.engine_name, slot.variant, slot.execution.metrics.clone());
            report.retry_notes.extend(slot.execution.retry_notes.iter().cloned());
        }
        for slot in &slots {
            if let Some(fault) = &slot.execution.fault {
                report.fail(CheckKind::Execution, format!("{}: {}", slot.label(), fault));
            }
        }
        if report.has_check(CheckKind::Execution) {
            return Self::finish(report);
        }

        debug!(phase = %ValidationPhase::Normalize);
        let optimized = |engine: EngineRole| {
            slots
                .iter()
                .find(|s| s.engine == engine && s.variant == QueryVariant::Optimized)
                .map(|s| Normalizer::normalize(&s.execution.result_set))
                .unwrap_or_default()
        };
        let left = optimized(EngineRole::Reference);
        let right = optimized(EngineRole::Candidate);

        debug!(phase = %ValidationPhase::Compare, ordered = prepared.profile.requires_ordering());
        let comparison = self
            .config
            .comparator(prepared.rounding.clone())
            .compare(&left, &right, prepared.profile.requires_ordering());

        match &comparison {
            Comparison::Match => {}
            Comparison::RowOrderMismatch => {
                let reason = "row values match but their order differs between engines";
                match self.config.row_order_policy {
                    RowOrderPolicy::Informational => report.note(CheckKind::RowOrderMismatch, reason),
                    RowOrderPolicy::Strict => report.fail(CheckKind::RowOrderMismatch, reason),
                }
            }
            Comparison::ShapeMismatch { left: l, right: r } => {
                if comparison.columns_differ() {
                    report.fail(
                        CheckKind::ColumnNames,
                        format!("reference={:?}, candidate={:?}", l.columns, r.columns),
                    );
                }
                if comparison.rows_differ() {
                    report.fail(
                        CheckKind::RowCount,
                        format!(
                            "reference shape: {} rows x {} columns, candidate shape: {} rows x {} columns",
                            l.rows,
                            l.columns.len(),
                            r.rows,
                            r.columns.len()
                        ),
                    );
                }
            }
            Comparison::DataMismatch { diffs, mismatched_cells, sorted } => {
                let how = if *sorted { " after sorting rows" } else { "" };
                report.fail(
                    CheckKind::DataMatch,
                    format!(
                        "{mismatched_cells} cell(s) differ{how}: {}",
                        Comparison::describe_diffs(diffs)
                    ),
                );
            }
        }

        for violation in ClauseChecks::run(&prepared.profile, &left, &right) {
            report.fail(violation.into(), violation.reason(&left, &right));
        }
        report.comparison = Some(comparison);

        Self::finish(report)
    }

    async fn execute_all<R, C>(&self, prepared: &Prepared, reference: &R, candidate: &C, database: &str) -> Vec<Slot>
    where
        R: EngineConnection,
        C: EngineConnection,
    {
        let policy = self.config.retry_policy();
        let options = self.config.execution_options();
        let run = Runner { database, policy: &policy, options: &options };

        if self.config.parallel {
            debug!(phase = %ValidationPhase::ExecuteOriginal, parallel = true);
            debug!(phase = %ValidationPhase::ExecuteOptimized, parallel = true);
            let (ref_original, cand_original, ref_optimized, cand_optimized) = tokio::join!(
                run.slot(reference, EngineRole::Reference, QueryVariant::Original, &prepared.reference.original),
                run.slot(candidate, EngineRole::Candidate, QueryVariant::Original, &prepared.candidate.original),
                run.slot(reference, EngineRole::Reference, QueryVariant::Optimized, &prepared.reference.optimized),
                run.slot(candidate, EngineRole::Candidate, QueryVariant::Optimized, &prepared.candidate.optimized),
            );
            vec![ref_original, cand_original, ref_optimized, cand_optimized]
        } else {
            debug!(phase = %ValidationPhase::ExecuteOriginal, parallel = false);
            let ref_original =
                run.slot(reference, EngineRole::Reference, QueryVariant::Original, &prepared.reference.original).await;
            let cand_original =
                run.slot(candidate, EngineRole::Candidate, QueryVariant::Original, &prepared.candidate.original).await;
            debug!(phase = %ValidationPhase::ExecuteOptimized, parallel = false);
            let ref_optimized =
                run.slot(reference, EngineRole::Reference, QueryVariant::Optimized, &prepared.reference.optimized).await;
            let cand_optimized =
                run.slot(candidate, EngineRole::Candidate, QueryVariant::Optimized, &prepared.candidate.optimized).await;
            vec![ref_original, cand_original, ref_optimized, cand_optimized]
        }
    }

    fn finish(mut report: ValidationReport) -> ValidationReport {
        debug!(phase = %ValidationPhase::Report);
        report.finalize();
        info!(
            status = ?report.status,
            failed_checks = report.failed_checks.len(),
            retries = report.retry_notes.len(),
            "validation finished"
        );
        report
    }
}

struct Runner<'a> {
    database: &'a str,
    policy: &'a RetryPolicy,
    options: &'a ExecutionOptions,
}

impl Runner<'_> {
    async fn slot<E: EngineConnection>(&self, engine: &E, role: EngineRole, variant: QueryVariant, query: &str) -> Slot {
        let label = format!("{}/{}", engine.name(), variant);
        let execution =
            TimedExecutor::execute_with_retry(engine, query, self.database, self.policy, self.options, &label).await;
        Slot { engine: role, engine_name: engine.name().to_string(), variant, execution }
    }
}

/// Validates with the default configuration.
pub async fn validate<R, C>(
    original: &str,
    optimized: &str,
    reference: &R,
    candidate: &C,
    database: &str,
) -> ValidationReport
where
    R: EngineConnection,
    C: EngineConnection,
{
    Validator::default()
        .validate(&QueryPair::new(original, optimized), reference, candidate, database)
        .await
}
