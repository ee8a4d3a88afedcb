use crate::di::ScanServices;
use anyhow::Context;
use nsgeo_application::ports::ScanProgress;
use nsgeo_application::use_cases::{RunScanUseCase, RunSummary, ScanLimits};
use nsgeo_domain::Config;
use nsgeo_infrastructure::input::read_domain_list;
use nsgeo_infrastructure::output::{JsonLinesWriter, ScanProgressBar};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct ScanCommand<'a> {
    pub input: &'a Path,
    pub geoip: &'a Path,
    pub out: &'a Path,
    pub show_progress: bool,
}

pub async fn run(
    command: ScanCommand<'_>,
    config: &Config,
    shutdown: CancellationToken,
) -> anyhow::Result<RunSummary> {
    let services = ScanServices::new(config, command.geoip, shutdown.clone()).await?;

    let domains = read_domain_list(command.input).context("failed to read input file")?;
    info!(
        domains = domains.len(),
        invalid = domains.invalid,
        "Input loaded"
    );

    let mut writer = JsonLinesWriter::create(command.out).context("failed to create output file")?;

    let total = domains.len() as u64;
    let progress: Arc<dyn ScanProgress> = if command.show_progress {
        Arc::new(ScanProgressBar::new(total))
    } else {
        Arc::new(ScanProgressBar::hidden(total))
    };

    let run = RunScanUseCase::new(
        services.scanner.clone(),
        progress,
        ScanLimits::new(config.scan.max_concurrency, config.scan.max_scans_per_second),
    );

    let outcome = run.execute(domains.into_vec(), &mut writer, &shutdown).await;

    let stats = services.client.codec().pool().stats();
    info!(
        buffers_created = stats.total_created,
        buffers_reused = stats.total_reused,
        reuse_rate = stats.reuse_rate(),
        "Message pool stats"
    );
    services.client.close();

    let summary = outcome?;
    info!(
        admitted = summary.admitted,
        written = summary.written,
        out = %command.out.display(),
        "Scan finished"
    );
    Ok(summary)
}
