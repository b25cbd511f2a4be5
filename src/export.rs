//! Record serialization: CSV with JSON-encoded list columns, or JSON lines.

use crate::config::{ExportFormat, SyntheticConfig};
use crate::error::{Result, SynthError};
use crate::models::{CsvRecordRow, SyntheticRecord};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write `records` to `cfg.output_path` in `cfg.export_format`.
///
/// The format is resolved before the file is touched, so an unknown format
/// leaves nothing behind.
pub fn export(records: &[SyntheticRecord], cfg: &SyntheticConfig) -> Result<()> {
    let format: ExportFormat = cfg.export_format.parse()?;
    export_to_path(records, format, &cfg.output_path)
}

pub fn export_to_path(
    records: &[SyntheticRecord],
    format: ExportFormat,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| SynthError::io(format!("creating {}", parent.display()), e))?;
    }
    let file = File::create(path)
        .map_err(|e| SynthError::io(format!("creating {}", path.display()), e))?;

    match format {
        ExportFormat::Csv => write_csv(records, file)?,
        ExportFormat::Jsonl => write_jsonl(records, BufWriter::new(file))?,
    }

    info!("Exported {} records as {} to {:?}", records.len(), format, path);
    Ok(())
}

/// Header plus one row per record, in input order.
pub fn write_csv<W: Write>(records: &[SyntheticRecord], writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        writer.serialize(CsvRecordRow::from_record(record)?)?;
    }
    writer
        .flush()
        .map_err(|e| SynthError::io("flushing CSV export", e))?;
    Ok(())
}

/// One JSON object per line, absent fields as `null`.
pub fn write_jsonl<W: Write>(records: &[SyntheticRecord], mut writer: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer
            .write_all(b"\n")
            .map_err(|e| SynthError::io("writing JSONL export", e))?;
    }
    writer
        .flush()
        .map_err(|e| SynthError::io("flushing JSONL export", e))?;
    Ok(())
}

/// Parse a JSONL export back into records. Blank lines are skipped.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<SyntheticRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| SynthError::io("reading JSONL", e))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
