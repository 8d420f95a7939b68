use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::World;
use crate::sim::WeekReport;

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Flush a finished run to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 4 files:
/// - `nations.jsonl` — final nation records, one per line
/// - `reports.jsonl` — one [`WeekReport`] per line
/// - `alerts.jsonl` — every alert decision across the run, one per line
/// - `signals.jsonl` — every signal raised across the run, one per line
pub fn flush_to_jsonl(world: &World, reports: &[WeekReport], output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("nations.jsonl"), world.nations.values())?;
    write_jsonl(&output_dir.join("reports.jsonl"), reports.iter())?;
    write_jsonl(
        &output_dir.join("alerts.jsonl"),
        reports.iter().flat_map(|r| r.alerts.iter()),
    )?;
    write_jsonl(
        &output_dir.join("signals.jsonl"),
        reports.iter().flat_map(|r| r.signals.iter()),
    )?;

    Ok(())
}
