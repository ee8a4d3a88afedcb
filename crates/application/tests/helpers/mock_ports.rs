#![allow(dead_code)]

use async_trait::async_trait;
use nsgeo_application::ports::{
    DnsLookup, DomainScanner, GeoIpLookup, PublicSuffixMatcher, ResultSink, ScanProgress,
};
use nsgeo_domain::{DomainError, QueryError, RecordType, ScanResult};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

// ── DnsLookup ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDnsLookup {
    nameservers: Arc<RwLock<HashMap<String, Result<Vec<String>, QueryError>>>>,
    primaries: Arc<RwLock<HashMap<String, Result<Option<String>, QueryError>>>>,
    addresses: Arc<RwLock<HashMap<(String, RecordType), Result<Vec<IpAddr>, QueryError>>>>,
    address_queries: Arc<Mutex<Vec<(String, RecordType)>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockDnsLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_nameservers(&self, fqdn: &str, nameservers: &[&str]) {
        self.nameservers.write().unwrap().insert(
            fqdn.to_string(),
            Ok(nameservers.iter().map(|s| s.to_string()).collect()),
        );
    }

    pub fn set_nameservers_error(&self, fqdn: &str, error: QueryError) {
        self.nameservers
            .write()
            .unwrap()
            .insert(fqdn.to_string(), Err(error));
    }

    pub fn set_primary(&self, fqdn: &str, primary: Option<&str>) {
        self.primaries
            .write()
            .unwrap()
            .insert(fqdn.to_string(), Ok(primary.map(str::to_string)));
    }

    pub fn set_addresses(&self, host: &str, record_type: RecordType, addrs: &[&str]) {
        self.addresses.write().unwrap().insert(
            (host.to_string(), record_type),
            Ok(addrs.iter().map(|s| s.parse().unwrap()).collect()),
        );
    }

    pub fn set_addresses_error(&self, host: &str, record_type: RecordType, error: QueryError) {
        self.addresses
            .write()
            .unwrap()
            .insert((host.to_string(), record_type), Err(error));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap() = Some(delay);
    }

    pub fn address_queries(&self) -> Vec<(String, RecordType)> {
        self.address_queries.lock().unwrap().clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DnsLookup for MockDnsLookup {
    async fn nameservers(&self, fqdn: &str) -> Result<Vec<String>, QueryError> {
        self.pause().await;
        self.nameservers
            .read()
            .unwrap()
            .get(fqdn)
            .cloned()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn primary_nameserver(&self, fqdn: &str) -> Result<Option<String>, QueryError> {
        self.pause().await;
        self.primaries
            .read()
            .unwrap()
            .get(fqdn)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn addresses(
        &self,
        host: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, QueryError> {
        self.address_queries
            .lock()
            .unwrap()
            .push((host.to_string(), record_type));
        self.pause().await;
        self.addresses
            .read()
            .unwrap()
            .get(&(host.to_string(), record_type))
            .cloned()
            .unwrap_or(Ok(Vec::new()))
    }
}

// ── GeoIpLookup ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockGeoIp {
    countries: RwLock<HashMap<IpAddr, String>>,
    failing: RwLock<HashSet<IpAddr>>,
}

impl MockGeoIp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(self, ip: &str, code: &str) -> Self {
        self.countries
            .write()
            .unwrap()
            .insert(ip.parse().unwrap(), code.to_string());
        self
    }

    pub fn with_failure(self, ip: &str) -> Self {
        self.failing.write().unwrap().insert(ip.parse().unwrap());
        self
    }
}

impl GeoIpLookup for MockGeoIp {
    fn country(&self, ip: IpAddr) -> Result<Option<String>, DomainError> {
        if self.failing.read().unwrap().contains(&ip) {
            return Err(DomainError::GeoIp(format!("corrupt record for {}", ip)));
        }
        Ok(self.countries.read().unwrap().get(&ip).cloned())
    }
}

// ── DomainScanner ───────────────────────────────────────────────────────────

/// Scanner that sleeps for a fixed time and records how many scans were
/// running at once.
pub struct MockScanner {
    delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    starts: Mutex<Vec<Instant>>,
    scanned: Mutex<Vec<String>>,
}

impl MockScanner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            starts: Mutex::new(Vec::new()),
            scanned: Mutex::new(Vec::new()),
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> Vec<Instant> {
        let mut starts = self.starts.lock().unwrap().clone();
        starts.sort();
        starts
    }

    pub fn scanned(&self) -> Vec<String> {
        self.scanned.lock().unwrap().clone()
    }
}

#[async_trait]
impl DomainScanner for MockScanner {
    async fn scan(&self, fqdn: &str) -> ScanResult {
        self.starts.lock().unwrap().push(Instant::now());
        self.scanned.lock().unwrap().push(fqdn.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        let mut result = ScanResult::new(fqdn);
        result.add_nameserver(format!("ns1.{}", fqdn));
        result
    }
}

// ── ResultSink ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemorySink {
    results: Arc<Mutex<Vec<ScanResult>>>,
    flushes: Arc<AtomicUsize>,
    fail_writes: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn results(&self) -> Vec<ScanResult> {
        self.results.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, result: &ScanResult) -> Result<(), DomainError> {
        if self.fail_writes {
            return Err(DomainError::Output("disk full".to_string()));
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DomainError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── ScanProgress ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingProgress {
    results: AtomicUsize,
    finished: AtomicUsize,
}

impl CountingProgress {
    pub fn results(&self) -> usize {
        self.results.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst) > 0
    }
}

impl ScanProgress for CountingProgress {
    fn on_result(&self, _result: &ScanResult) {
        self.results.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

// ── PublicSuffixMatcher ─────────────────────────────────────────────────────

/// Matcher with plain suffix rules only; the longest matching rule wins.
pub struct MockSuffixMatcher {
    suffixes: Vec<String>,
}

impl MockSuffixMatcher {
    pub fn new(suffixes: &[&str]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PublicSuffixMatcher for MockSuffixMatcher {
    fn registrable_domain(&self, fqdn: &str) -> Option<String> {
        let name = fqdn.trim_end_matches('.');
        let labels: Vec<&str> = name.split('.').collect();
        let suffix_len = self
            .suffixes
            .iter()
            .filter(|s| name == s.as_str() || name.ends_with(&format!(".{}", s)))
            .map(|s| s.split('.').count())
            .max()?;
        if labels.len() <= suffix_len {
            return None;
        }
        Some(format!(
            "{}.",
            labels[labels.len() - suffix_len - 1..].join(".")
        ))
    }
}
