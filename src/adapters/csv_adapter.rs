//! CSV file price store.

use crate::domain::error::TickercastError;
use crate::domain::ohlcv::RawRow;
use crate::ports::price_store_port::PriceStorePort;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

pub struct CsvAdapter {
    path: PathBuf,
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, TickercastError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| TickercastError::store(format!("missing {name} column")))
        };

        Ok(Self {
            date: require("Date")?,
            open: find("Open"),
            high: find("High"),
            low: find("Low"),
            close: require("Close")?,
            volume: find("Volume"),
        })
    }
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .unwrap_or_default()
        .to_string()
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_to(&self, target: &Path, rows: &[RawRow]) -> Result<(), TickercastError> {
        let mut writer = csv::Writer::from_path(target).map_err(|e| {
            TickercastError::store(format!("failed to open {}: {}", target.display(), e))
        })?;
        let write_err = |e: csv::Error| TickercastError::store(format!("CSV write error: {}", e));

        writer.write_record(HEADER).map_err(write_err)?;
        for row in rows {
            writer
                .write_record([
                    &row.date,
                    &row.open,
                    &row.high,
                    &row.low,
                    &row.close,
                    &row.volume,
                ])
                .map_err(write_err)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl PriceStorePort for CsvAdapter {
    fn ensure_exists(&self) -> Result<(), TickercastError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write_to(&self.path, &[])?;
        tracing::info!(path = %self.path.display(), "created empty price store");
        Ok(())
    }

    fn load_rows(&self) -> Result<Vec<RawRow>, TickercastError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            TickercastError::store(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| TickercastError::store(format!("CSV header error: {}", e)))?
            .clone();
        let columns = Columns::from_headers(&headers)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| TickercastError::store(format!("CSV parse error: {}", e)))?;

            rows.push(RawRow {
                date: cell(&record, Some(columns.date)),
                open: cell(&record, columns.open),
                high: cell(&record, columns.high),
                low: cell(&record, columns.low),
                close: cell(&record, Some(columns.close)),
                volume: cell(&record, columns.volume),
            });
        }

        Ok(rows)
    }

    fn replace(&self, rows: &[RawRow]) -> Result<(), TickercastError> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));

        let temp = self.temp_path();
        if let Err(e) = self.write_to(&temp, &sorted) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        fs::rename(&temp, &self.path).map_err(|e| {
            TickercastError::store(format!("failed to replace {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}
