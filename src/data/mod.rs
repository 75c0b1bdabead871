//! Data access module
//!
//! Provider trait over daily bars and macro series, with in-memory and Parquet backends,
//! plus the Parquet export of daily records

mod error;
mod parquet;
mod provider;

pub use error::DataError;
pub use self::parquet::{
    read_bars, read_scalar_series, write_bars, write_scalar_series, ParquetProvider, ParquetWriter,
    DAILY_SIGNALS_FILE,
};
pub use provider::{indicators, DataProvider, MemoryProvider};
