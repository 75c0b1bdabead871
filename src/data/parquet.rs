//! Parquet loading of daily bars and macro series, and export of daily records

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use super::error::DataError;
use super::provider::{indicators, DataProvider, MemoryProvider};
use crate::backtest::DailySignal;
use crate::portfolio::UNIVERSE;
use crate::series::{BarSeries, PricedBar, ScalarSeries};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Export file name for the daily records
pub const DAILY_SIGNALS_FILE: &str = "daily_signals.parquet";

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, DataError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    reader.map(|batch| batch.map_err(DataError::from)).collect()
}

fn column_error(path: &Path, column: &str, expected: &'static str) -> DataError {
    DataError::Column {
        path: path.to_path_buf(),
        column: column.to_string(),
        expected,
    }
}

fn string_column<'a>(batch: &'a RecordBatch, path: &Path, name: &str) -> Result<&'a StringArray, DataError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| column_error(path, name, "Utf8"))
}

fn float_column<'a>(batch: &'a RecordBatch, path: &Path, name: &str) -> Result<&'a Float64Array, DataError> {
    optional_float_column(batch, path, name)?.ok_or_else(|| column_error(path, name, "Float64"))
}

/// A Float64 column that may be absent; present with another type is an error
fn optional_float_column<'a>(
    batch: &'a RecordBatch,
    path: &Path,
    name: &str,
) -> Result<Option<&'a Float64Array>, DataError> {
    match batch.column_by_name(name) {
        None => Ok(None),
        Some(c) => c
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(Some)
            .ok_or_else(|| column_error(path, name, "Float64")),
    }
}

fn cell(array: Option<&Float64Array>, row: usize) -> Option<f64> {
    let array = array?;
    array.is_valid(row).then(|| array.value(row))
}

fn parse_date(path: &Path, value: &str) -> Result<NaiveDate, DataError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DataError::BadDate {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}

/// Read `date, open, high, low, close, volume` bars.
///
/// Rows without a date or close are skipped; missing open/high/low fall back to the close.
pub fn read_bars(path: &Path) -> Result<BarSeries, DataError> {
    let mut bars = BarSeries::new();
    for batch in read_batches(path)? {
        let dates = string_column(&batch, path, "date")?;
        let close = float_column(&batch, path, "close")?;
        let open = optional_float_column(&batch, path, "open")?;
        let high = optional_float_column(&batch, path, "high")?;
        let low = optional_float_column(&batch, path, "low")?;
        let volume = optional_float_column(&batch, path, "volume")?;

        for row in 0..batch.num_rows() {
            if dates.is_null(row) {
                continue;
            }
            let Some(c) = cell(Some(close), row) else {
                continue;
            };
            let date = parse_date(path, dates.value(row))?;
            let bar = PricedBar::new(
                cell(open, row).unwrap_or(c),
                cell(high, row).unwrap_or(c),
                cell(low, row).unwrap_or(c),
                c,
                cell(volume, row).unwrap_or(0.0),
            );
            bars.insert(date, bar);
        }
    }
    Ok(bars)
}

/// Read a `date, value` series; null values are skipped
pub fn read_scalar_series(path: &Path) -> Result<ScalarSeries, DataError> {
    let mut series = ScalarSeries::new();
    for batch in read_batches(path)? {
        let dates = string_column(&batch, path, "date")?;
        let values = float_column(&batch, path, "value")?;
        for row in 0..batch.num_rows() {
            if dates.is_null(row) {
                continue;
            }
            if let Some(v) = cell(Some(values), row) {
                series.insert(parse_date(path, dates.value(row))?, v);
            }
        }
    }
    Ok(series)
}

/// Provider backed by a directory of Parquet files:
/// `futures/<SYMBOL>.parquet` and `macro/<indicator>.parquet`
#[derive(Debug, Clone)]
pub struct ParquetProvider {
    root: PathBuf,
    inner: MemoryProvider,
}

impl ParquetProvider {
    /// Load the whole universe and every known indicator from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::load_with(dir, UNIVERSE, indicators::ALL)
    }

    /// Load the given symbols and indicators; missing files give empty series
    pub fn load_with<'a>(
        dir: impl AsRef<Path>,
        symbols: impl IntoIterator<Item = &'a str>,
        indicator_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, DataError> {
        let root = dir.as_ref().to_path_buf();
        let mut inner = MemoryProvider::new();
        let mut missing = 0usize;

        for symbol in symbols {
            let path = root.join("futures").join(format!("{symbol}.parquet"));
            let bars = if path.exists() {
                read_bars(&path)?
            } else {
                tracing::warn!(symbol, path = ?path, "Futures file missing, using empty series");
                missing += 1;
                BarSeries::new()
            };
            tracing::debug!(symbol, rows = bars.len(), "Loaded bars");
            inner = inner.with_bars(symbol, bars);
        }

        for name in indicator_names {
            let path = root.join("macro").join(format!("{name}.parquet"));
            let series = if path.exists() {
                read_scalar_series(&path)?
            } else {
                tracing::warn!(indicator = name, path = ?path, "Macro file missing, using empty series");
                missing += 1;
                ScalarSeries::new()
            };
            tracing::debug!(indicator = name, rows = series.len(), "Loaded series");
            inner = inner.with_series(name, series);
        }

        tracing::info!(dir = ?root, missing, "Loaded market data");
        Ok(Self { root, inner })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DataProvider for ParquetProvider {
    fn bars(&self, symbol: &str) -> Option<&BarSeries> {
        self.inner.bars(symbol)
    }

    fn series(&self, indicator: &str) -> Option<&ScalarSeries> {
        self.inner.series(indicator)
    }
}

/// Column builder for one record batch
#[derive(Default)]
struct Columns {
    fields: Vec<Field>,
    arrays: Vec<ArrayRef>,
}

impl Columns {
    fn push(&mut self, name: &str, data_type: DataType, nullable: bool, array: ArrayRef) {
        self.fields.push(Field::new(name, data_type, nullable));
        self.arrays.push(array);
    }

    fn floats(&mut self, name: &str, values: impl IntoIterator<Item = f64>) {
        let array = Float64Array::from_iter_values(values);
        self.push(name, DataType::Float64, false, Arc::new(array));
    }

    fn optional_floats(&mut self, name: &str, values: impl IntoIterator<Item = Option<f64>>) {
        let array: Float64Array = values.into_iter().collect();
        self.push(name, DataType::Float64, true, Arc::new(array));
    }

    fn ints(&mut self, name: &str, values: impl IntoIterator<Item = i64>) {
        let array = Int64Array::from_iter_values(values);
        self.push(name, DataType::Int64, false, Arc::new(array));
    }

    fn strings(&mut self, name: &str, values: impl IntoIterator<Item = String>) {
        let array = StringArray::from_iter_values(values);
        self.push(name, DataType::Utf8, false, Arc::new(array));
    }

    fn bools(&mut self, name: &str, values: impl IntoIterator<Item = bool>) {
        let array = BooleanArray::from(values.into_iter().collect::<Vec<_>>());
        self.push(name, DataType::Boolean, false, Arc::new(array));
    }

    fn into_batch(self) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(Arc::new(Schema::new(self.fields)), self.arrays)
    }
}

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Write bars in the layout [`read_bars`] expects
pub fn write_bars(path: &Path, bars: &BarSeries) -> Result<(), DataError> {
    let mut columns = Columns::default();
    columns.strings("date", bars.keys().map(|d| d.format(DATE_FORMAT).to_string()));
    columns.floats("open", bars.values().map(|b| b.open));
    columns.floats("high", bars.values().map(|b| b.high));
    columns.floats("low", bars.values().map(|b| b.low));
    columns.floats("close", bars.values().map(|b| b.close));
    columns.floats("volume", bars.values().map(|b| b.volume));
    write_batch(path, &columns.into_batch()?)
}

/// Write a scalar series in the layout [`read_scalar_series`] expects
pub fn write_scalar_series(path: &Path, series: &ScalarSeries) -> Result<(), DataError> {
    let mut columns = Columns::default();
    columns.strings("date", series.keys().map(|d| d.format(DATE_FORMAT).to_string()));
    columns.floats("value", series.values().copied());
    write_batch(path, &columns.into_batch()?)
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Writes run artefacts under an output directory
#[derive(Debug, Clone)]
pub struct ParquetWriter {
    output_dir: PathBuf,
}

impl ParquetWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> Result<(), DataError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Write the daily records to `daily_signals.parquet`, one row per day.
    ///
    /// Money columns are stored as decimal strings; positions get one `pos_<SYMBOL>` column each.
    pub fn write_daily_signals(&self, signals: &[DailySignal]) -> Result<PathBuf, DataError> {
        self.ensure_dir()?;
        let path = self.output_dir.join(DAILY_SIGNALS_FILE);

        let s = signals;
        let mut c = Columns::default();
        c.strings("date", s.iter().map(|d| d.date.format(DATE_FORMAT).to_string()));
        c.floats("ratio", s.iter().map(|d| d.ratio.ratio));
        c.optional_floats("roc_short", s.iter().map(|d| d.ratio.roc_short));
        c.optional_floats("roc_medium", s.iter().map(|d| d.ratio.roc_medium));
        c.optional_floats("roc_long", s.iter().map(|d| d.ratio.roc_long));
        c.ints("ma_signal", s.iter().map(|d| i64::from(d.ratio.ma_signal)));
        c.optional_floats("ratio_zscore", s.iter().map(|d| d.ratio.zscore));
        c.ints("z_signal", s.iter().map(|d| i64::from(d.ratio.z_signal)));
        c.optional_floats("composite", s.iter().map(|d| d.ratio.composite));
        c.strings("raw_tilt", s.iter().map(|d| d.ratio.raw_tilt.to_string()));
        c.strings("tilt", s.iter().map(|d| d.tilt.to_string()));

        let m = |f: fn(&DailySignal) -> f64| s.iter().map(f);
        c.floats("growth", m(|d| d.macro_reading.growth));
        c.floats("inflation", m(|d| d.macro_reading.inflation));
        c.floats("liquidity", m(|d| d.macro_reading.liquidity.score));
        c.floats("liquidity_volatility", m(|d| d.macro_reading.liquidity.volatility));
        c.floats("liquidity_credit", m(|d| d.macro_reading.liquidity.credit));
        c.floats("liquidity_balance_sheet", m(|d| d.macro_reading.liquidity.balance_sheet));
        c.floats("real_rate", m(|d| d.macro_reading.real_rate));
        c.floats("real_rate_change", m(|d| d.macro_reading.real_rate_change));
        c.floats("real_rate_zscore", m(|d| d.macro_reading.real_rate_zscore));
        c.strings("regime", s.iter().map(|d| d.regime().to_string()));
        c.strings("applied_regime", s.iter().map(|d| d.applied_regime.to_string()));

        c.optional_floats("currency_momentum", s.iter().map(|d| d.filters.currency_momentum));
        c.strings("currency_trend", s.iter().map(|d| d.filters.currency_trend.to_string()));
        c.strings("currency_filter", s.iter().map(|d| d.filters.currency_filter.to_string()));
        c.bools("safe_haven", s.iter().map(|d| d.filters.safe_haven));
        c.floats("secondary_adjustment", m(|d| d.filters.secondary_adjustment));
        c.bools("intervention", s.iter().map(|d| d.filters.intervention));
        c.bools("correlation_spike", s.iter().map(|d| d.filters.correlation_spike));
        c.floats("average_correlation", m(|d| d.filters.average_correlation));

        c.floats("size_multiplier", m(|d| d.size_multiplier));
        c.strings("drawdown", s.iter().map(|d| d.drawdown.to_string()));
        c.bools("drawdown_warning", s.iter().map(|d| d.drawdown_warning));
        c.bools("drawdown_stop", s.iter().map(|d| d.drawdown_stop));
        c.bools("rebalanced", s.iter().map(|d| d.rebalanced));
        c.strings("triggers", s.iter().map(|d| join(&d.triggers)));
        c.strings("stopped_out", s.iter().map(|d| d.stopped_out.join(",")));

        let symbols: BTreeSet<&str> = s.iter().flat_map(|d| d.positions.keys().map(String::as_str)).collect();
        for symbol in symbols {
            c.ints(&format!("pos_{symbol}"), s.iter().map(|d| d.position(symbol)));
        }

        c.strings("equity", s.iter().map(|d| d.equity.to_string()));
        c.floats("margin_utilization", m(|d| d.margin_utilization));
        c.ints("trailing_flips", s.iter().map(|d| d.trailing_flips as i64));
        c.strings("transaction_cost", s.iter().map(|d| d.transaction_cost.to_string()));
        c.optional_floats("benchmark", s.iter().map(|d| d.benchmark));

        write_batch(&path, &c.into_batch()?)?;
        tracing::debug!(path = ?path, count = signals.len(), "Wrote daily signals to Parquet");
        Ok(path)
    }
}
