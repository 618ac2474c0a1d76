// Loader module: reads the cleaned dataset into memory.

pub mod csv_loader;

pub use csv_loader::{CsvLoader, Loader};
