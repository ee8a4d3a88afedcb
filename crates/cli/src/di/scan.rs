use anyhow::Context;
use nsgeo_application::ports::{DnsLookup, GeoIpLookup};
use nsgeo_application::services::discovery_for;
use nsgeo_application::use_cases::ScanDomainUseCase;
use nsgeo_domain::Config;
use nsgeo_infrastructure::dns::{
    bind_for, ClientOptions, DnsClient, MessageCodec, UpstreamResolver, UpstreamSet,
};
use nsgeo_infrastructure::geoip::MaxMindCountryReader;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything a scan run needs, wired from configuration.
pub struct ScanServices {
    pub client: DnsClient,
    pub scanner: Arc<ScanDomainUseCase>,
}

impl ScanServices {
    pub async fn new(
        config: &Config,
        geoip_path: &Path,
        shutdown: CancellationToken,
    ) -> anyhow::Result<Self> {
        let upstreams = UpstreamSet::parse(&config.scan.upstreams)?;

        let geoip: Arc<dyn GeoIpLookup> = Arc::new(
            MaxMindCountryReader::open(geoip_path).context("failed to open geoip file")?,
        );

        let socket = bind_for(upstreams.servers())
            .await
            .context("failed to open socket")?;
        let client = DnsClient::new(
            socket,
            MessageCodec::default(),
            ClientOptions {
                timeout: config.scan.query_timeout(),
                retransmit_interval: config.scan.retransmit_interval(),
            },
        )?;
        info!(
            local = %client.local_addr(),
            upstreams = upstreams.len(),
            "DNS client ready"
        );

        let lookup: Arc<dyn DnsLookup> = Arc::new(
            UpstreamResolver::new(client.clone(), upstreams)
                .with_cancellation(shutdown)
                .with_edns_payload(config.scan.edns_payload_size),
        );

        let discovery = discovery_for(config.scan.discovery, Arc::clone(&lookup));
        info!(
            discovery = discovery.strategy().as_str(),
            max_nameservers = config.scan.max_nameservers,
            "Scanner ready"
        );

        let scanner = Arc::new(
            ScanDomainUseCase::new(discovery, lookup, geoip)
                .with_max_nameservers(config.scan.max_nameservers),
        );

        Ok(Self { client, scanner })
    }
}
