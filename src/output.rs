use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use crate::aggregate::AggregatedPoint;
use crate::error::SweepResult;

pub const TABLE_HEADER: &str = "Frequency,Impedance";

/// Write the table as CSV: header line, then `frequency,impedance` per row.
pub fn write_table<W: Write>(mut writer: W, rows: &[AggregatedPoint]) -> SweepResult<()> {
    writeln!(writer, "{}", TABLE_HEADER)?;
    for row in rows {
        // `Display` for f64 never uses scientific notation.
        writeln!(writer, "{},{}", row.frequency, row.impedance)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_table_file(path: &Path, rows: &[AggregatedPoint]) -> SweepResult<()> {
    let file = File::create(path)?;
    write_table(BufWriter::new(file), rows)
}

/// A bare file name is placed next to the input file; anything with a directory
/// component is used as given.
pub fn resolve_output_path(input: &Path, output: &Path) -> PathBuf {
    let has_dir = output
        .parent()
        .map(|p| !p.as_os_str().is_empty())
        .unwrap_or(false);
    if has_dir {
        return output.to_path_buf();
    }
    match input.parent() {
        Some(dir) => dir.join(output),
        None => output.to_path_buf(),
    }
}
