//! Market data file loader
//!
//! Downloaded daily-bar files carry extra header rows above the real header
//! and leave the close column unnamed. The loader skips those rows, takes
//! the close column by position and drops rows whose close is not a number.

use std::io;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::PriceSeries;
use crate::error::Result;

/// Where the close prices live in a market data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvLayout {
    /// Rows to skip before the header row
    pub skip_rows: usize,
    /// Zero-based column holding the closing price
    pub close_column: usize,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            skip_rows: 2,
            close_column: 1,
        }
    }
}

/// Load closing prices from a market data CSV file
pub fn load_close_prices<P: AsRef<Path>>(path: P, layout: CsvLayout) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let series = read_close_prices(file, layout)?;
    info!(path = %path.display(), prices = series.len(), "Loaded price series");
    Ok(series)
}

/// Read closing prices from any CSV source
pub fn read_close_prices<R: io::Read>(reader: R, layout: CsvLayout) -> Result<PriceSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut prices = Vec::new();
    let mut dropped = 0usize;

    // skip_rows junk rows, then the header row itself
    for record in reader.records().skip(layout.skip_rows + 1) {
        let record = record?;
        let close = record
            .get(layout.close_column)
            .and_then(|field| field.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite());

        match close {
            Some(value) => prices.push(value),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "Dropped rows without a numeric close");
    }

    PriceSeries::new(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOWNLOADED: &str = "\
Price,Close,High,Low,Open,Volume
Ticker,^GSPC,^GSPC,^GSPC,^GSPC,^GSPC
Date,,,,,
2010-01-04,1132.98,1133.87,1116.56,1116.56,3991400000
2010-01-05,1136.52,1136.63,1129.66,1132.66,2491020000
2010-01-06,,1139.19,1133.95,1135.71,4972660000
2010-01-07,nan,1142.46,1131.32,1136.27,5270680000
2010-01-08,1144.98,1144.98,1136.22,1140.52,4389590000
";

    #[test]
    fn test_reads_downloaded_layout() {
        let series = read_close_prices(DOWNLOADED.as_bytes(), CsvLayout::default()).unwrap();
        assert_eq!(series.as_slice(), &[1132.98, 1136.52, 1144.98]);
    }

    #[test]
    fn test_custom_layout() {
        let data = "date,open,close\nd1,1.0,2.0\nd2,1.5,2.5\n";
        let layout = CsvLayout {
            skip_rows: 0,
            close_column: 2,
        };
        let series = read_close_prices(data.as_bytes(), layout).unwrap();
        assert_eq!(series.as_slice(), &[2.0, 2.5]);
    }

    #[test]
    fn test_no_numeric_rows_is_an_error() {
        let data = "a,b\nc,d\nDate,\nx,not-a-number\n";
        assert!(read_close_prices(data.as_bytes(), CsvLayout::default()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOWNLOADED.as_bytes()).unwrap();

        let series = load_close_prices(file.path(), CsvLayout::default()).unwrap();
        assert_eq!(series.len(), 3);
    }
}
