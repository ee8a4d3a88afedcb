use nsgeo_domain::{DomainError, ScanResult};

/// Destination of finished scan results. Only ever driven from one task.
pub trait ResultSink: Send {
    fn write(&mut self, result: &ScanResult) -> Result<(), DomainError>;

    fn flush(&mut self) -> Result<(), DomainError>;
}
