use nsgeo_application::ports::ResultSink;
use nsgeo_domain::{DomainError, ScanResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per line.
pub struct JsonLinesWriter<W: Write + Send> {
    out: BufWriter<W>,
}

impl JsonLinesWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            DomainError::Output(format!("failed to create {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W, DomainError> {
        self.out
            .into_inner()
            .map_err(|e| DomainError::Output(e.error().to_string()))
    }
}

impl<W: Write + Send> ResultSink for JsonLinesWriter<W> {
    fn write(&mut self, result: &ScanResult) -> Result<(), DomainError> {
        serde_json::to_writer(&mut self.out, result)
            .map_err(|e| DomainError::Output(format!("failed to encode result, {}", e)))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| DomainError::Output(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), DomainError> {
        self.out
            .flush()
            .map_err(|e| DomainError::Output(e.to_string()))
    }
}

/// Writes one name per line.
pub fn write_name_list(path: impl AsRef<Path>, names: &[String]) -> Result<(), DomainError> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| DomainError::Output(format!("failed to create {}: {}", path.display(), e)))?;
    let mut out = BufWriter::new(file);
    for name in names {
        writeln!(out, "{}", name).map_err(|e| DomainError::Output(e.to_string()))?;
    }
    out.flush().map_err(|e| DomainError::Output(e.to_string()))
}
