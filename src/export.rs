//! JSON sinks: one file per chart in a directory, or a single array on a writer.

use crate::chart::{ChartEmitter, ChartSpec};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes each chart to `<dir>/<nn>-<slugged title>.json`.
pub struct JsonFileEmitter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonFileEmitter {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    /// Emitter rooted at a fresh timestamped directory under the user's data dir.
    pub fn auto_save() -> Result<Self> {
        Self::new(&auto_save_dir()?)
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartEmitter for JsonFileEmitter {
    fn emit(&mut self, chart: &ChartSpec) -> Result<()> {
        let name = format!("{:02}-{}.json", self.written.len() + 1, slug(&chart.title));
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(chart)?;
        std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "exported chart");
        self.written.push(path);
        Ok(())
    }
}

/// Collects charts and writes them as one pretty JSON array on `finish`.
pub struct JsonWriterEmitter<W: Write> {
    out: W,
    charts: Vec<ChartSpec>,
}

impl<W: Write> JsonWriterEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            charts: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartEmitter for JsonWriterEmitter<W> {
    fn emit(&mut self, chart: &ChartSpec) -> Result<()> {
        self.charts.push(chart.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, &self.charts)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// `<data_local_dir>/consensus-bench-plots/<UTC timestamp>`.
pub fn auto_save_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("no local data directory on this platform")?;
    let stamp = time::OffsetDateTime::now_utc()
        .format(time::macros::format_description!(
            "[year][month][day]T[hour][minute][second]Z"
        ))
        .context("format timestamp")?;
    Ok(base.join("consensus-bench-plots").join(stamp))
}

/// Lowercase alphanumerics joined by single dashes.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
