//! Snapshot metrics computed from `GameState`.
//!
//! `compute_metrics(&GameState) -> MetricsSnapshot` samples the current state
//! for time-series analysis. No state mutation, no IO. The CSV writers below
//! are the only IO in the crate.

use crate::{CookState, CustomerPhase, GameState};
use serde::Serialize;
use std::io::Write;

/// Current schema version. Bump when fields are added, removed, or reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub metrics_version: u32,
    pub elapsed_s: f64,
    pub clock_minutes: f32,

    // Customers
    pub customers_active: u32,
    pub customers_leaving: u32,
    pub queue_length: u32,
    /// Satisfaction of the customer at the front, 0 when the line is empty.
    pub front_patience_pct: f32,

    // Outcomes
    pub served: u32,
    pub walked_out: u32,
    pub dismissed: u32,
    pub wrong_deliveries: u32,
    pub food_burnt: u32,
    pub points: u32,
    pub avg_served_quality: f32,

    // Stations
    pub stations_idle: u32,
    pub stations_cooking: u32,
    pub stations_ready: u32,
    pub stations_burnt: u32,
    pub stations_disabled: u32,

    pub dropped_items: u32,
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_metrics(state: &GameState) -> MetricsSnapshot {
    let mut stations_idle = 0u32;
    let mut stations_cooking = 0u32;
    let mut stations_ready = 0u32;
    let mut stations_burnt = 0u32;
    let mut stations_disabled = 0u32;
    for station in state.stations.values() {
        if !station.enabled {
            stations_disabled += 1;
            continue;
        }
        match station.cook_state {
            CookState::Idle => stations_idle += 1,
            CookState::Cooking => stations_cooking += 1,
            CookState::Ready => stations_ready += 1,
            CookState::Burnt => stations_burnt += 1,
        }
    }

    let customers_leaving = state
        .customers
        .values()
        .filter(|c| c.phase == CustomerPhase::Leaving)
        .count() as u32;

    let front_patience_pct = state
        .queue
        .front()
        .and_then(|id| state.customers.get(id))
        .map_or(0.0, crate::CustomerState::satisfaction);

    MetricsSnapshot {
        tick: state.meta.tick,
        metrics_version: METRICS_VERSION,
        elapsed_s: state.meta.elapsed_s,
        clock_minutes: state.clock.minutes,
        customers_active: state.spawner.roster.len() as u32,
        customers_leaving,
        queue_length: state.queue.len() as u32,
        front_patience_pct,
        served: state.score.served,
        walked_out: state.score.walked_out,
        dismissed: state.score.dismissed,
        wrong_deliveries: state.score.wrong_deliveries,
        food_burnt: state.score.food_burnt,
        points: state.score.points,
        avg_served_quality: state.score.average_quality(),
        stations_idle,
        stations_cooking,
        stations_ready,
        stations_burnt,
        stations_disabled,
        dropped_items: state.dropped_items.len() as u32,
    }
}

/// Write the CSV header row for metrics.
pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "tick,metrics_version,elapsed_s,clock_minutes,\
         customers_active,customers_leaving,queue_length,front_patience_pct,\
         served,walked_out,dismissed,wrong_deliveries,food_burnt,points,avg_served_quality,\
         stations_idle,stations_cooking,stations_ready,stations_burnt,stations_disabled,\
         dropped_items"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        snapshot.tick,
        snapshot.metrics_version,
        snapshot.elapsed_s,
        snapshot.clock_minutes,
        snapshot.customers_active,
        snapshot.customers_leaving,
        snapshot.queue_length,
        snapshot.front_patience_pct,
        snapshot.served,
        snapshot.walked_out,
        snapshot.dismissed,
        snapshot.wrong_deliveries,
        snapshot.food_burnt,
        snapshot.points,
        snapshot.avg_served_quality,
        snapshot.stations_idle,
        snapshot.stations_cooking,
        snapshot.stations_ready,
        snapshot.stations_burnt,
        snapshot.stations_disabled,
        snapshot.dropped_items,
    )
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    max_rows_per_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        Self::with_max_rows(run_dir, MAX_ROWS_PER_FILE)
    }

    /// Like [`MetricsFileWriter::new`] with a custom rotation threshold.
    pub fn with_max_rows(
        run_dir: std::path::PathBuf,
        max_rows_per_file: usize,
    ) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            max_rows_per_file: max_rows_per_file.max(1),
            writer,
        })
    }

    /// Append one snapshot row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= self.max_rows_per_file {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, snapshot)?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let path = run_dir.join(format!("metrics_{index:03}.csv"));
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_metrics_header(&mut writer)?;
    Ok(writer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state, queued_customer};
    use crate::{CookState, StationId};

    #[test]
    fn test_fresh_state_counts_idle_stations() {
        let content = base_content();
        let state = base_state(&content);
        let snapshot = compute_metrics(&state);

        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.metrics_version, METRICS_VERSION);
        assert_eq!(snapshot.stations_idle, 3);
        assert_eq!(snapshot.customers_active, 0);
        assert_eq!(snapshot.queue_length, 0);
        assert!(snapshot.front_patience_pct.abs() < 1e-6);
        assert!(snapshot.avg_served_quality.abs() < 1e-6);
    }

    #[test]
    fn test_station_states_classified() {
        let content = base_content();
        let mut state = base_state(&content);
        let grill = StationId("station_grill".to_string());
        state.stations.get_mut(&grill).unwrap().cook_state = CookState::Burnt;
        let snapshot = compute_metrics(&state);
        assert_eq!(snapshot.stations_burnt, 1);
        assert_eq!(snapshot.stations_idle, 2);
    }

    #[test]
    fn test_front_patience_reported() {
        let content = base_content();
        let mut state = base_state(&content);
        let id = queued_customer(&mut state, &content, crate::FoodType::Wrap);
        state.customers.get_mut(&id).unwrap().patience_s =
            f64::from(content.constants.customer_patience_s) / 2.0;
        let snapshot = compute_metrics(&state);
        assert_eq!(snapshot.queue_length, 1);
        assert_eq!(snapshot.customers_active, 1);
        assert!((snapshot.front_patience_pct - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_csv_row_matches_header_width() {
        let content = base_content();
        let state = base_state(&content);
        let mut buffer = Vec::new();
        write_metrics_header(&mut buffer).unwrap();
        append_metrics_row(&mut buffer, &compute_metrics(&state)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].split(',').count(),
            lines[1].split(',').count()
        );
    }

    #[test]
    fn test_file_writer_rotates() {
        let dir = tempfile::tempdir().unwrap();
        let content = base_content();
        let state = base_state(&content);
        let snapshot = compute_metrics(&state);

        let mut writer = MetricsFileWriter::with_max_rows(dir.path().to_path_buf(), 2).unwrap();
        for _ in 0..5 {
            writer.write_row(&snapshot).unwrap();
        }
        writer.flush().unwrap();

        for index in 0..3 {
            let path = dir.path().join(format!("metrics_{index:03}.csv"));
            assert!(path.exists(), "missing {}", path.display());
        }
        let last = std::fs::read_to_string(dir.path().join("metrics_002.csv")).unwrap();
        assert_eq!(last.lines().count(), 2, "header plus one row");
    }
}
