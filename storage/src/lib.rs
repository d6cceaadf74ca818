//! Result persistence for serving-bench
//!
//! Implements the core `ResultSink` trait with a CSV file per run, named by
//! model identifier and timestamp.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod csv_sink;

pub use csv_sink::CsvResultSink;
