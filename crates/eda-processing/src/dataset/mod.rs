//! Reading and writing the passenger table as CSV.

mod loader;
mod writer;

pub use loader::load_csv_with_fallbacks;
pub use writer::write_csv;
