use std::fmt;

use serde::Serialize;

use crate::engine::{ExecutionMetrics, TimeSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRole {
    Reference,
    Candidate,
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryVariant {
    Original,
    Optimized,
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Original => "original",
            Self::Optimized => "optimized",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub engine: EngineRole,
    pub engine_name: String,
    pub variant: QueryVariant,
    pub metrics: ExecutionMetrics,
}

/// Timing of every (engine, variant) execution in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceTable {
    pub rows: Vec<PerformanceRow>,
}

impl PerformanceTable {
    pub fn push(&mut self, engine: EngineRole, engine_name: &str, variant: QueryVariant, metrics: ExecutionMetrics) {
        self.rows.push(PerformanceRow { engine, engine_name: engine_name.to_string(), variant, metrics });
    }

    pub fn get(&self, engine: EngineRole, variant: QueryVariant) -> Option<&PerformanceRow> {
        self.rows.iter().find(|r| r.engine == engine && r.variant == variant)
    }

    /// Original time divided by optimized time on `engine`; `None` when
    /// either run failed or the optimized time is zero.
    pub fn speedup(&self, engine: EngineRole) -> Option<f64> {
        let original = self.get(engine, QueryVariant::Original)?;
        let optimized = self.get(engine, QueryVariant::Optimized)?;
        if original.metrics.is_error() || optimized.metrics.is_error() || optimized.metrics.execution_time_ms <= 0.0 {
            return None;
        }
        Some(original.metrics.execution_time_ms / optimized.metrics.execution_time_ms)
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "{:<24} {:<10} {:>12} {:>10} {:<6} {}\n",
            "engine", "variant", "time_ms", "rows", "source", "status"
        );
        for row in &self.rows {
            let source = match row.metrics.time_source {
                TimeSource::Engine => "engine",
                TimeSource::WallClock => "wall",
            };
            let status = row.metrics.error.as_deref().unwrap_or("ok");
            out.push_str(&format!(
                "{:<24} {:<10} {:>12.2} {:>10} {:<6} {}\n",
                format!("{} ({})", row.engine_name, row.engine),
                row.variant,
                row.metrics.execution_time_ms,
                row.metrics.rows_processed,
                source,
                status
            ));
        }
        for engine in [EngineRole::Reference, EngineRole::Candidate] {
            if let Some(speedup) = self.speedup(engine) {
                out.push_str(&format!("speedup ({engine}): {speedup:.2}x\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PerformanceTable {
        let mut table = PerformanceTable::default();
        table.push(EngineRole::Reference, "warehouse", QueryVariant::Original, ExecutionMetrics::wall_clock(200.0, 10));
        table.push(EngineRole::Reference, "warehouse", QueryVariant::Optimized, ExecutionMetrics::wall_clock(50.0, 10));
        table.push(EngineRole::Candidate, "lakehouse", QueryVariant::Original, ExecutionMetrics::engine(90.0, 120.0, 10));
        table.push(EngineRole::Candidate, "lakehouse", QueryVariant::Optimized, ExecutionMetrics::failed(3.0, "boom"));
        table
    }

    #[test]
    fn speedup_is_original_over_optimized() {
        let table = table();
        assert_eq!(table.speedup(EngineRole::Reference), Some(4.0));
        assert_eq!(table.speedup(EngineRole::Candidate), None);
    }

    #[test]
    fn render_lists_every_execution() {
        let rendered = table().render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("engine"));
        assert!(lines[1].contains("warehouse (reference)") && lines[1].contains("200.00"));
        assert!(lines[3].contains("engine"));
        assert!(lines[4].ends_with("boom"));
        assert_eq!(lines[5], "speedup (reference): 4.00x");
    }
}
