use crate::lookup::{GeoLookup, IpApiClient};
use crate::record::{GeoPoint, HopRecord, Location};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Callback invoked as each lookup is issued: (index, address).
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Resolve a record list against a lookup capability, strictly one address
/// at a time in input order. Lookup N+1 is issued only after lookup N's
/// future has settled. A failing lookup is logged and excluded; it never
/// aborts the remainder. The final filter retains only coordinate-complete
/// points.
pub async fn resolve_sequential<L: GeoLookup>(lookup: &L, records: &[HopRecord]) -> Vec<GeoPoint> {
    let mut resolved = Vec::new();

    for record in records {
        match lookup.lookup(&record.address).await {
            Ok(point) => resolved.push(point),
            Err(e) => {
                warn!("Excluding {}: {}", record.address, e);
            }
        }
    }

    resolved
        .into_iter()
        .filter(GeoPoint::has_coordinates)
        .collect()
}

/// Configured front end over the sequential fold.
pub struct Resolver {
    client: IpApiClient,
    skip_private: bool,
    dedup: bool,
    progress_callback: Option<ProgressCallback>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            client: IpApiClient::with_timeout(timeout_secs),
            skip_private: false,
            dedup: false,
            progress_callback: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.client = self.client.with_endpoint(endpoint);
        self
    }

    /// Skip addresses in private, loopback and link-local ranges before
    /// lookup; those have no public geolocation fix.
    pub fn with_skip_private(mut self, skip_private: bool) -> Self {
        self.skip_private = skip_private;
        self
    }

    /// Resolve each distinct address once, keeping first-occurrence order.
    /// Off by default: the hop table's duplicate-keeping semantics win.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Resolve against the configured HTTP client.
    pub async fn resolve(&self, records: &[HopRecord]) -> Vec<Location> {
        self.resolve_with(&self.client, records).await
    }

    /// Resolve against an injected lookup capability.
    pub async fn resolve_with<L>(&self, lookup: &L, records: &[HopRecord]) -> Vec<Location>
    where
        L: GeoLookup + Sync,
    {
        let queue = self.prepare(records);
        info!("Resolving {} address(es)", queue.len());

        let points = match &self.progress_callback {
            Some(callback) => {
                let instrumented = Instrumented {
                    inner: lookup,
                    callback,
                    issued: AtomicUsize::new(0),
                };
                resolve_sequential(&instrumented, &queue).await
            }
            None => resolve_sequential(lookup, &queue).await,
        };

        points.into_iter().filter_map(GeoPoint::into_location).collect()
    }

    fn prepare(&self, records: &[HopRecord]) -> Vec<HopRecord> {
        let mut seen = HashSet::new();
        records
            .iter()
            .filter(|record| {
                if self.skip_private && is_private_address(&record.address) {
                    debug!("Skipping private address {}", record.address);
                    return false;
                }
                if self.dedup && !seen.insert(record.address.clone()) {
                    debug!("Skipping duplicate address {}", record.address);
                    return false;
                }
                true
            })
            .cloned()
            .collect()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Fires the progress callback as each lookup is issued, then delegates.
struct Instrumented<'a, L> {
    inner: &'a L,
    callback: &'a ProgressCallback,
    issued: AtomicUsize,
}

impl<L> GeoLookup for Instrumented<'_, L>
where
    L: GeoLookup + Sync,
{
    async fn lookup(&self, address: &str) -> crate::error::Result<GeoPoint> {
        let index = self.issued.fetch_add(1, Ordering::Relaxed);
        (self.callback)(index, address.to_string());
        self.inner.lookup(address).await
    }
}

/// True for addresses with no public geolocation fix: RFC1918, loopback,
/// link-local, unique-local and unspecified ranges. Tokens that do not parse
/// as an address are not treated as private; their lookup simply fails and
/// gets excluded downstream.
pub fn is_private_address(address: &str) -> bool {
    let Ok(parsed) = address.parse::<IpAddr>() else {
        return false;
    };

    match parsed {
        IpAddr::V4(v4) => {
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique-local
                || (segments[0] & 0xfe00) == 0xfc00
                // fe80::/10 link-local
                || (segments[0] & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ResolveError, Result};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicBool;

    /// Scripted lookup that records call order and flags any overlap
    /// between in-flight lookups.
    struct MockLookup {
        responses: HashMap<String, (Option<f64>, Option<f64>)>,
        calls: StdMutex<Vec<String>>,
        in_flight: AtomicUsize,
        overlap_seen: AtomicBool,
    }

    impl MockLookup {
        fn new(responses: Vec<(&str, (Option<f64>, Option<f64>))>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(address, coords)| (address.to_string(), coords))
                    .collect(),
                calls: StdMutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                overlap_seen: AtomicBool::new(false),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GeoLookup for MockLookup {
        async fn lookup(&self, address: &str) -> Result<GeoPoint> {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlap_seen.store(true, Ordering::SeqCst);
            }
            self.calls.lock().unwrap().push(address.to_string());

            // Yield so an (incorrectly) concurrent caller would be observed.
            tokio::task::yield_now().await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.responses.get(address) {
                Some(&(latitude, longitude)) => Ok(GeoPoint {
                    latitude,
                    longitude,
                    address: address.to_string(),
                }),
                None => Err(ResolveError::LookupFailed {
                    address: address.to_string(),
                    reason: "unscripted".to_string(),
                }),
            }
        }
    }

    fn records(addresses: &[&str]) -> Vec<HopRecord> {
        addresses
            .iter()
            .map(|address| HopRecord::bare(address.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_resolve_sequential_preserves_input_order() {
        let lookup = MockLookup::new(vec![
            ("10.0.0.1", (Some(1.0), Some(2.0))),
            ("10.0.0.2", (Some(3.0), Some(4.0))),
            ("10.0.0.3", (Some(5.0), Some(6.0))),
        ]);

        let points =
            resolve_sequential(&lookup, &records(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])).await;

        assert_eq!(lookup.calls(), vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        let addresses: Vec<&str> = points.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[tokio::test]
    async fn test_resolve_sequential_never_overlaps_lookups() {
        let lookup = MockLookup::new(vec![
            ("10.0.0.1", (Some(1.0), Some(2.0))),
            ("10.0.0.2", (Some(3.0), Some(4.0))),
            ("10.0.0.3", (Some(5.0), Some(6.0))),
            ("10.0.0.4", (Some(7.0), Some(8.0))),
        ]);

        resolve_sequential(
            &lookup,
            &records(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]),
        )
        .await;

        assert!(
            !lookup.overlap_seen.load(Ordering::SeqCst),
            "lookup N+1 was issued before lookup N settled"
        );
    }

    #[tokio::test]
    async fn test_resolve_sequential_excludes_incomplete_points() {
        let lookup = MockLookup::new(vec![
            ("10.0.0.1", (Some(1.0), Some(2.0))),
            ("10.0.0.2", (None, Some(5.0))),
            ("10.0.0.3", (Some(3.0), None)),
        ]);

        let points =
            resolve_sequential(&lookup, &records(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])).await;

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].address, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_resolve_sequential_failure_does_not_abort_remainder() {
        let lookup = MockLookup::new(vec![
            ("10.0.0.1", (Some(1.0), Some(2.0))),
            // 10.0.0.2 is unscripted and fails.
            ("10.0.0.3", (Some(5.0), Some(6.0))),
        ]);

        let points =
            resolve_sequential(&lookup, &records(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])).await;

        assert_eq!(lookup.calls().len(), 3);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].address, "10.0.0.3");
    }

    #[tokio::test]
    async fn test_resolver_dedup_keeps_first_occurrence_order() {
        let lookup = MockLookup::new(vec![
            ("10.0.0.1", (Some(1.0), Some(2.0))),
            ("10.0.0.2", (Some(3.0), Some(4.0))),
        ]);

        let resolver = Resolver::new().with_dedup(true);
        let locations = resolver
            .resolve_with(&lookup, &records(&["10.0.0.1", "10.0.0.2", "10.0.0.1"]))
            .await;

        assert_eq!(lookup.calls(), vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(locations.len(), 2);
    }

    #[tokio::test]
    async fn test_resolver_keeps_duplicates_by_default() {
        let lookup = MockLookup::new(vec![("10.0.0.1", (Some(1.0), Some(2.0)))]);

        let resolver = Resolver::new();
        let locations = resolver
            .resolve_with(&lookup, &records(&["10.0.0.1", "10.0.0.1"]))
            .await;

        assert_eq!(lookup.calls().len(), 2);
        assert_eq!(locations.len(), 2);
    }

    #[tokio::test]
    async fn test_resolver_skip_private() {
        let lookup = MockLookup::new(vec![("93.184.216.34", (Some(1.0), Some(2.0)))]);

        let resolver = Resolver::new().with_skip_private(true);
        let locations = resolver
            .resolve_with(
                &lookup,
                &records(&["192.168.1.1", "127.0.0.1", "93.184.216.34"]),
            )
            .await;

        assert_eq!(lookup.calls(), vec!["93.184.216.34"]);
        assert_eq!(locations.len(), 1);
    }

    #[tokio::test]
    async fn test_resolver_progress_callback_order() {
        let lookup = MockLookup::new(vec![
            ("10.0.0.1", (Some(1.0), Some(2.0))),
            ("10.0.0.2", (Some(3.0), Some(4.0))),
        ]);

        let observed: Arc<StdMutex<Vec<(usize, String)>>> = Arc::new(StdMutex::new(Vec::new()));
        let observed_clone = observed.clone();

        let resolver =
            Resolver::new().with_progress_callback(Arc::new(move |index, address| {
                observed_clone.lock().unwrap().push((index, address));
            }));

        resolver
            .resolve_with(&lookup, &records(&["10.0.0.1", "10.0.0.2"]))
            .await;

        let observed = observed.lock().unwrap();
        assert_eq!(
            *observed,
            vec![
                (0, "10.0.0.1".to_string()),
                (1, "10.0.0.2".to_string()),
            ]
        );
    }

    #[test]
    fn test_is_private_address_v4() {
        assert!(is_private_address("10.1.2.3"));
        assert!(is_private_address("172.16.0.1"));
        assert!(is_private_address("192.168.1.254"));
        assert!(is_private_address("127.0.0.1"));
        assert!(is_private_address("169.254.0.1"));
        assert!(!is_private_address("93.184.216.34"));
    }

    #[test]
    fn test_is_private_address_v6() {
        assert!(is_private_address("::1"));
        assert!(is_private_address("fe80:0:0:0:0:0:0:1"));
        assert!(is_private_address("fd00:0:0:0:0:0:0:1"));
        assert!(!is_private_address("2606:2800:220:1:248:1893:25c8:1946"));
    }

    #[test]
    fn test_is_private_address_unparseable_token() {
        // Out-of-range octets match the extraction pattern but are not an
        // address; the lookup fails for them instead.
        assert!(!is_private_address("999.999.999.999"));
    }
}
