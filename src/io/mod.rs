pub mod input;
pub mod output;

pub use input::{read_inputs, read_lines, STDIN_LABEL};
pub use output::{create_output, write_records, OutputFormat, OutputRecord};

use crate::errors::{Error, Result};
use std::fs;
use std::path::Path;

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::io_with_path("Failed to write file", path, e))
}
