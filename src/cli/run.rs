//! The load → aggregate → write pipeline behind the `neighbourer` command

use crate::aggregate::NeighborAggregator;
use crate::config::NeighbourerConfig;
use crate::error::Result;
use crate::grid::{Adjacency, H3Grid};
use crate::io::{csv_rows, InputSource, OutputSink, TableWriter};
use crate::report::RunReport;
use crate::table::{LoadOutcome, TableLoader};
use tracing::{debug, info};

/// Everything one run needs, already resolved
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: InputSource,
    pub output: OutputSink,
    pub config: NeighbourerConfig,
}

impl RunRequest {
    pub fn new(input: InputSource, output: OutputSink, config: NeighbourerConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }
}

/// Run the pipeline over the H3 grid
pub fn run(request: &RunRequest) -> Result<RunReport> {
    run_with(request, H3Grid::new())
}

/// Run the pipeline with a caller-supplied adjacency source
///
/// Nothing is written unless loading and aggregation both succeed. The
/// report file, when configured, is written before the table so a failure
/// to write it also leaves the output untouched.
pub fn run_with<A: Adjacency>(request: &RunRequest, adjacency: A) -> Result<RunReport> {
    let config = &request.config;
    config.validate()?;
    let delimiter = config.delimiter_byte()?;

    debug!(
        "Running in {} mode from {} to {}",
        config.mode,
        request.input.describe(),
        request.output.describe()
    );

    let reader = request.input.open()?;
    let LoadOutcome {
        mut table,
        warnings,
        rows_read,
        rows_skipped,
    } = TableLoader::new(config.mode).load(csv_rows(reader, delimiter))?;

    info!(
        "Loaded {} cells with {} attributes from {}",
        table.len(),
        table.schema().width(),
        request.input.describe()
    );

    let outcome = NeighborAggregator::new(adjacency)
        .with_options(config.aggregation_options())
        .aggregate(&mut table)?;

    let mut report = RunReport {
        cells: table.len(),
        rows_read,
        rows_skipped,
        isolated_cells: outcome.isolated,
        ..Default::default()
    };
    report.extend_warnings(warnings);
    report.extend_warnings(outcome.warnings);

    if let Some(path) = &config.report {
        report.write_json(path)?;
    }

    let rows = TableWriter::new()
        .with_delimiter(delimiter)
        .with_precision(config.precision)
        .write_to(&table, &request.output)?;

    info!(
        "Wrote {} rows to {} ({} skipped, {} isolated, {} warnings)",
        rows,
        request.output.describe(),
        report.rows_skipped,
        report.isolated_cells,
        report.warning_count()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::grid::FixedAdjacency;
    use crate::report::WarningKind;
    use crate::table::ErrorMode;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn request(dir: &Path, input: &str, config: NeighbourerConfig) -> RunRequest {
        let input_path = dir.join("in.csv");
        std::fs::write(&input_path, input).unwrap();
        RunRequest::new(
            InputSource::File(input_path),
            OutputSink::File(dir.join("out.csv")),
            config,
        )
    }

    fn grid() -> FixedAdjacency {
        FixedAdjacency::new().with_link(0xa_u64, 0xb_u64)
    }

    #[test]
    fn test_pipeline_writes_sums() {
        let dir = TempDir::new().unwrap();
        let req = request(
            dir.path(),
            "hex,bar\na,1\nb,2\nc,4\n",
            NeighbourerConfig::default(),
        );

        let report = run_with(&req, grid()).unwrap();

        let out = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert_eq!(out, "hex,bar,bar_neighbor_sum\na,1,2\nb,2,1\nc,4,0\n");
        assert_eq!(report.cells, 3);
        assert_eq!(report.isolated_cells, 1);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_lenient_run_reports_skipped_rows() {
        let dir = TempDir::new().unwrap();
        let report_path = dir.path().join("report.json");
        let config = NeighbourerConfig {
            report: Some(report_path.clone()),
            ..Default::default()
        };
        let req = request(dir.path(), "hex,bar\na,1\nzz,2\nb,x\nb,3\n", config);

        let report = run_with(&req, grid()).unwrap();

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_skipped, 2);
        assert_eq!(report.count(WarningKind::InvalidCellId), 1);
        assert_eq!(report.count(WarningKind::InvalidValue), 1);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
        assert_eq!(json["rows_skipped"], 2);
        assert_eq!(json["warnings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_strict_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = NeighbourerConfig {
            mode: ErrorMode::Strict,
            ..Default::default()
        };
        let req = request(dir.path(), "hex,bar\na,1\nb,oops\n", config);

        let err = run_with(&req, grid()).unwrap_err();

        assert_eq!(err.code(), ErrorCode::PARSE_INVALID_VALUE);
        assert_eq!(err.line(), Some(3));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_adjacency_failure_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let req = request(
            dir.path(),
            "hex,bar\na,1\nb,2\n",
            NeighbourerConfig::default(),
        );

        let report = run_with(&req, grid().failing_on(0xa_u64)).unwrap();

        assert_eq!(report.count(WarningKind::AdjacencyFailure), 1);
        let out = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert_eq!(out, "hex,bar,bar_neighbor_sum\na,1,0\nb,2,1\n");
    }

    #[test]
    fn test_overflowing_sum_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let req = request(
            dir.path(),
            "hex,bar\na,1.7e308\nb,1.7e308\nc,1.7e308\n",
            NeighbourerConfig::default(),
        );
        let grid = FixedAdjacency::new()
            .with_link(0xa_u64, 0xb_u64)
            .with_link(0xa_u64, 0xc_u64);

        let err = run_with(&req, grid).unwrap_err();

        assert_eq!(err.code(), ErrorCode::OTHER_NON_FINITE_SUM);
        assert_eq!(err.exit_code(), 1);
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_each_warning_is_logged_once() {
        let dir = TempDir::new().unwrap();
        let config = NeighbourerConfig {
            threads: Some(1),
            ..Default::default()
        };
        let req = request(dir.path(), "hex,bar\na,1\nzz,2\nb,2\nb,3\n", config);

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let report = tracing::subscriber::with_default(subscriber, || {
            run_with(&req, grid().failing_on(0xb_u64))
        })
        .unwrap();

        assert_eq!(report.warning_count(), 3);
        let text = logs.text();
        assert_eq!(text.matches("not a hexadecimal cell identifier").count(), 1);
        assert_eq!(text.matches("already defined on line 4").count(), 1);
        assert_eq!(text.matches("is not a valid grid cell").count(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_reading() {
        let dir = TempDir::new().unwrap();
        let config = NeighbourerConfig {
            precision: Some(99),
            ..Default::default()
        };
        let req = RunRequest::new(
            InputSource::File(dir.path().join("missing.csv")),
            OutputSink::Stdout,
            config,
        );

        let err = run_with(&req, grid()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
