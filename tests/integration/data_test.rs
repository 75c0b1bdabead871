//! Parquet storage tests: provider loading and daily record export

use std::fs::File;

use arrow::array::{Int64Array, StringArray};
use cugold_regime::backtest::Backtester;
use cugold_regime::config::Config;
use cugold_regime::data::{write_bars, DataProvider, ParquetProvider, ParquetWriter, DAILY_SIGNALS_FILE};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::common::market;

#[test]
fn test_parquet_provider_matches_memory_provider() {
    let dir = tempfile::tempdir().unwrap();
    let memory = market(90, usize::MAX);
    for symbol in memory.symbols() {
        let path = dir.path().join("futures").join(format!("{symbol}.parquet"));
        write_bars(&path, memory.bars(symbol).unwrap()).unwrap();
    }

    let loaded = ParquetProvider::load(dir.path()).unwrap();
    assert_eq!(loaded.root(), dir.path());
    assert_eq!(loaded.bars("HG"), memory.bars("HG"));

    let from_disk = Backtester::new(Config::default(), &loaded).unwrap().run();
    let from_memory = Backtester::new(Config::default(), &memory).unwrap().run();
    assert_eq!(from_disk, from_memory);
}

#[test]
fn test_daily_signal_export() {
    let dir = tempfile::tempdir().unwrap();
    let signals = Backtester::new(Config::default(), &market(60, usize::MAX)).unwrap().run();

    let writer = ParquetWriter::new(dir.path().join("out"));
    let path = writer.write_daily_signals(&signals).unwrap();
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(DAILY_SIGNALS_FILE));

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), signals.len());

    let batch = &batches[0];
    let dates = batch
        .column_by_name("date")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .unwrap();
    assert_eq!(dates.value(0), signals[0].date.format("%Y-%m-%d").to_string());

    let equity = batch
        .column_by_name("equity")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .unwrap();
    assert_eq!(equity.value(0), signals[0].equity.to_string());

    let mes = batch
        .column_by_name("pos_MES")
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .unwrap();
    assert_eq!(mes.value(batch.num_rows() - 1), signals[batch.num_rows() - 1].position("MES"));
}

#[test]
fn test_empty_directory_has_no_primaries() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = ParquetProvider::load(dir.path()).unwrap();
    assert!(Backtester::new(Config::default(), &loaded).is_err());
}
