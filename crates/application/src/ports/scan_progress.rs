use nsgeo_domain::ScanResult;

pub trait ScanProgress: Send + Sync {
    fn on_result(&self, result: &ScanResult);

    fn finish(&self);
}

/// Progress reporter that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ScanProgress for NoopProgress {
    fn on_result(&self, _result: &ScanResult) {}

    fn finish(&self) {}
}
