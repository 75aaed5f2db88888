//! CSV export of the lookup history.

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{
    error::HistoryError,
    history::{HistoryRecord, HistoryStore},
    model::{TemperatureUnit, WeatherObservation},
};

pub const CSV_HEADER: [&str; 6] = ["name", "date", "temp", "humidity", "precip", "condition"];

/// Record selection for [`HistoryExporter::export_filtered`].
#[derive(Debug, Clone, Default)]
pub struct ExportFilter {
    /// Case-insensitive substring of the queried city.
    pub city: Option<String>,
    /// Exact date.
    pub date: Option<String>,
}

impl ExportFilter {
    pub fn matches(&self, record: &HistoryRecord) -> bool {
        let city_ok = self
            .city
            .as_ref()
            .is_none_or(|c| record.city.to_lowercase().contains(&c.to_lowercase()));
        let date_ok = self.date.as_ref().is_none_or(|d| &record.date == d);
        city_ok && date_ok
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// Malformed lines plus records whose observation lacked a required field.
    pub skipped: usize,
}

/// Writes history records out as CSV. Never modifies the history itself.
#[derive(Debug, Clone)]
pub struct HistoryExporter<'a> {
    store: &'a HistoryStore,
}

impl<'a> HistoryExporter<'a> {
    pub fn new(store: &'a HistoryStore) -> Self {
        Self { store }
    }

    /// Export every readable record. `destination` defaults to a timestamped
    /// file name in the current directory.
    pub fn export_all(
        &self,
        destination: Option<&Path>,
        unit: TemperatureUnit,
    ) -> Result<PathBuf, HistoryError> {
        self.export_filtered(destination, unit, &ExportFilter::default()).map(|s| s.path)
    }

    pub fn export_filtered(
        &self,
        destination: Option<&Path>,
        unit: TemperatureUnit,
        filter: &ExportFilter,
    ) -> Result<ExportSummary, HistoryError> {
        let path = destination.map(Path::to_path_buf).unwrap_or_else(default_export_path);
        let scan = self.store.scan()?;
        let mut skipped = scan.malformed_lines.len();

        if same_file(&path, self.store.path()) {
            return Err(HistoryError::ExportOverHistory { path });
        }

        // Rows go to a sibling temp file that replaces `path` only once complete.
        let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let tmp = NamedTempFile::new_in(dir).map_err(|e| HistoryError::io(&path, e))?;
        let mut out = BufWriter::new(tmp);
        let mut rows = 0;

        write_row(&mut out, &CSV_HEADER).map_err(|e| HistoryError::io(&path, e))?;

        for record in scan.records.iter().filter(|r| filter.matches(r)) {
            let obs = match record.observation() {
                Ok(obs) => obs,
                Err(err) => {
                    warn!(
                        city = %record.city,
                        date = %record.date,
                        error = %err,
                        "skipping history record with incomplete observation"
                    );
                    skipped += 1;
                    continue;
                }
            };

            write_row(&mut out, &csv_fields(&record.date, &obs, unit))
                .map_err(|e| HistoryError::io(&path, e))?;
            rows += 1;
        }

        let tmp = out.into_inner().map_err(|e| HistoryError::io(&path, e.into_error()))?;
        tmp.persist(&path).map_err(|e| HistoryError::io(&path, e.error))?;

        info!(path = %path.display(), rows, skipped, unit = %unit, "exported history");
        Ok(ExportSummary { path, rows, skipped })
    }
}

/// `weather_history_<YYYYMMDD_HHMMSS>.csv` in the current directory.
pub fn default_export_path() -> PathBuf {
    PathBuf::from(format!("weather_history_{}.csv", Local::now().format("%Y%m%d_%H%M%S")))
}

/// Whether two paths name the same file, including one that doesn't exist yet.
fn same_file(a: &Path, b: &Path) -> bool {
    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(full) = path.canonicalize() {
        return Some(full);
    }
    let parent = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    Some(parent.canonicalize().ok()?.join(path.file_name()?))
}

/// Temperature and precipitation share one fixed two-decimal format.
fn csv_fields(date: &str, obs: &WeatherObservation, unit: TemperatureUnit) -> [String; 6] {
    [
        obs.city.clone(),
        date.to_string(),
        format!("{:.2}", unit.from_fahrenheit(obs.temperature_f)),
        obs.humidity_pct.to_string(),
        format!("{:.2}", obs.precipitation_in),
        obs.description.clone(),
    ]
}

fn write_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line = fields.iter().map(|f| escape_field(f.as_ref())).collect::<Vec<_>>().join(",");
    writeln!(out, "{line}")
}

/// Quote a field when it holds a separator, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn obs(city: &str, temp: f64, description: &str) -> WeatherObservation {
        WeatherObservation::new(city, temp, 40, 0.0, description, "01d")
    }

    fn rows(path: &Path) -> Vec<Vec<String>> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| l.split(',').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn export_all_writes_header_and_rows_in_file_order() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.txt"));
        store.append("London", "2024-06-01", &obs("London", 61.0, "mist")).unwrap();
        store.append("Paris", "2024-06-02", &obs("Paris", 75.5, "clear sky")).unwrap();

        let dest = dir.path().join("out.csv");
        let path =
            HistoryExporter::new(&store).export_all(Some(&dest), TemperatureUnit::Fahrenheit).unwrap();

        assert_eq!(path, dest);
        let rows = rows(&path);
        assert_eq!(rows[0], CSV_HEADER);
        assert_eq!(rows[1], ["London", "2024-06-01", "61.00", "40", "0.00", "mist"]);
        assert_eq!(rows[2][0], "Paris");
        assert_eq!(rows[2][2], "75.50");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn celsius_export_converts_temperature() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.txt"));
        store.append("Fever", "2024-06-01", &obs("Fever", 98.6, "hot")).unwrap();

        let dest = dir.path().join("out.csv");
        HistoryExporter::new(&store).export_all(Some(&dest), TemperatureUnit::Celsius).unwrap();

        let temp: f64 = rows(&dest)[1][2].parse().unwrap();
        assert!((temp - 37.0).abs() < 0.05);
    }

    #[test]
    fn filter_matches_city_substring_case_insensitively() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.txt"));
        store.append("London", "2024-06-01", &obs("London", 61.0, "mist")).unwrap();
        store.append("Paris", "2024-06-01", &obs("Paris", 75.0, "clear sky")).unwrap();

        let dest = dir.path().join("out.csv");
        let filter = ExportFilter { city: Some("lon".into()), date: None };
        let summary = HistoryExporter::new(&store)
            .export_filtered(Some(&dest), TemperatureUnit::Fahrenheit, &filter)
            .unwrap();

        assert_eq!(summary.rows, 1);
        let rows = rows(&dest);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "London");
    }

    #[test]
    fn filter_date_must_match_exactly() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.txt"));
        store.append("Oslo", "2024-06-01", &obs("Oslo", 50.0, "rain")).unwrap();
        store.append("Oslo", "2024-06-02", &obs("Oslo", 52.0, "rain")).unwrap();
        store.append("Bergen", "2024-06-02", &obs("Bergen", 49.0, "rain")).unwrap();

        let dest = dir.path().join("out.csv");
        let filter = ExportFilter { city: Some("OSLO".into()), date: Some("2024-06-02".into()) };
        let summary = HistoryExporter::new(&store)
            .export_filtered(Some(&dest), TemperatureUnit::Fahrenheit, &filter)
            .unwrap();

        assert_eq!(summary.rows, 1);
        assert_eq!(rows(&dest)[1][2], "52.00");
    }

    #[test]
    fn bad_lines_and_incomplete_observations_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.txt");
        fs::write(
            &path,
            concat!(
                "not json\n",
                "{\"city\":\"Ghost\",\"date\":\"2024-06-01\",\"data\":{\"name\":\"Ghost\"}}\n",
            ),
        )
        .unwrap();
        let store = HistoryStore::new(&path);
        store.append("Rome", "2024-06-01", &obs("Rome", 88.0, "sunny")).unwrap();

        let dest = dir.path().join("out.csv");
        let summary = HistoryExporter::new(&store)
            .export_filtered(Some(&dest), TemperatureUnit::Fahrenheit, &ExportFilter::default())
            .unwrap();

        assert_eq!(summary.rows, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(rows(&dest)[1][0], "Rome");
    }

    #[test]
    fn export_leaves_history_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.txt");
        let store = HistoryStore::new(&path);
        store.append("Rome", "2024-06-01", &obs("Rome", 88.0, "sunny")).unwrap();
        let before = fs::read(&path).unwrap();

        HistoryExporter::new(&store)
            .export_all(Some(&dir.path().join("out.csv")), TemperatureUnit::Celsius)
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn export_refuses_to_overwrite_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.txt");
        let store = HistoryStore::new(&path);
        store.append("Rome", "2024-06-01", &obs("Rome", 88.0, "sunny")).unwrap();
        let before = fs::read(&path).unwrap();

        let err = HistoryExporter::new(&store)
            .export_all(Some(&path), TemperatureUnit::Fahrenheit)
            .unwrap_err();
        assert!(matches!(err, HistoryError::ExportOverHistory { .. }));

        let same_file_other_spelling = dir.path().join(".").join("h.txt");
        let err = HistoryExporter::new(&store)
            .export_all(Some(&same_file_other_spelling), TemperatureUnit::Fahrenheit)
            .unwrap_err();
        assert!(matches!(err, HistoryError::ExportOverHistory { .. }));

        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(store.scan().unwrap().records.len(), 1);
    }

    #[test]
    fn export_replaces_existing_destination() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.txt"));
        store.append("Rome", "2024-06-01", &obs("Rome", 88.0, "sunny")).unwrap();
        let dest = dir.path().join("out.csv");
        fs::write(&dest, "stale contents\nfrom an older export\n").unwrap();

        HistoryExporter::new(&store).export_all(Some(&dest), TemperatureUnit::Fahrenheit).unwrap();

        let rows = rows(&dest);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Rome");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn precipitation_uses_the_temperature_format() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.txt"));
        let wet = WeatherObservation::new("Bergen", 51.25, 93, 0.1, "rain", "10d");
        store.append("Bergen", "2024-06-01", &wet).unwrap();

        let dest = dir.path().join("out.csv");
        HistoryExporter::new(&store).export_all(Some(&dest), TemperatureUnit::Fahrenheit).unwrap();

        assert_eq!(rows(&dest)[1], ["Bergen", "2024-06-01", "51.25", "93", "0.10", "rain"]);
    }

    #[test]
    fn empty_history_exports_header_only() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("missing.txt"));

        let dest = dir.path().join("out.csv");
        let summary = HistoryExporter::new(&store)
            .export_filtered(Some(&dest), TemperatureUnit::Fahrenheit, &ExportFilter::default())
            .unwrap();

        assert_eq!(summary.rows, 0);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "name,date,temp,humidity,precip,condition\n");
    }

    #[test]
    fn fields_with_commas_or_quotes_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("Washington, D.C."), "\"Washington, D.C.\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn default_path_is_timestamped_csv() {
        let name = default_export_path().to_string_lossy().into_owned();
        assert!(name.starts_with("weather_history_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "weather_history_20240601_120000.csv".len());
    }
}
