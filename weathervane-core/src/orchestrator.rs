//! The composition root: resolves the active city, consults the cache,
//! drives the transport/decoder on a miss, and publishes one observable
//! state value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::Config;
use crate::decode::decode;
use crate::error::{ErrorKind, FetchError};
use crate::model::{WeatherRecord, normalize_key};
use crate::rotation::KeyRotator;
use crate::state::{OrchestratorState, StateCell};
use crate::transport::Transport;
use crate::units::{self, TemperatureUnit};

pub struct WeatherOrchestrator {
    base_url: Url,
    api_key: String,
    request_timeout: Duration,
    refresh_on_rotation: bool,

    clock: Arc<dyn Clock>,
    transport: Arc<dyn Transport>,

    cache: Mutex<TtlCache>,
    rotator: Mutex<KeyRotator>,
    active_key: Mutex<String>,
    unit: Mutex<TemperatureUnit>,

    /// Monotonic sequence of issued requests; only the holder of the latest
    /// number may publish a terminal state (last request wins).
    seq: AtomicU64,
    state: StateCell,
}

impl WeatherOrchestrator {
    /// Build an orchestrator from validated configuration and injected
    /// collaborators. Fails on any configuration invariant violation,
    /// including a missing API key or an empty city list.
    pub fn new(
        config: &Config,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn Transport>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let api_key = config.require_api_key()?.to_string();
        let base_url = Url::parse(&config.base_url)?;
        let rotator = KeyRotator::new(&config.cities)?;

        Ok(Self {
            base_url,
            api_key,
            request_timeout: config.request_timeout(),
            refresh_on_rotation: config.refresh_on_rotation,
            clock,
            transport,
            cache: Mutex::new(TtlCache::new(config.ttl_seconds)),
            rotator: Mutex::new(rotator),
            active_key: Mutex::new(config.starting_city()),
            unit: Mutex::new(TemperatureUnit::default()),
            seq: AtomicU64::new(0),
            state: StateCell::new(),
        })
    }

    /// Fetch (or serve from cache) the weather for `key` and publish the
    /// outcome.
    ///
    /// Overlapping calls are allowed; a response belonging to a superseded
    /// call still lands in the cache but is never published.
    pub async fn request(&self, key: &str) {
        let key = normalize_key(key);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        *self.active_key.lock() = key.clone();
        self.state.publish(OrchestratorState::Loading { key: key.clone() });

        let now = self.clock.now();
        let cached = {
            let cache = self.cache.lock();
            cache.get(&key, now).map(|entry| entry.record.clone())
        };

        if let Some(record) = cached {
            debug!(%key, "serving cached record");
            self.publish_if_current(seq, OrchestratorState::Success { record });
            return;
        }

        info!(%key, "cache miss, fetching");
        let url = self.request_url(&key);

        match self.fetch_and_decode(&url, &key).await {
            Ok(record) => {
                self.cache.lock().put(&key, record.clone(), record.fetched_at);
                self.publish_if_current(seq, OrchestratorState::Success { record });
            }
            Err(err) => {
                let kind = ErrorKind::classify(&err);
                warn!(%key, %err, ?kind, "fetch failed");
                self.publish_if_current(
                    seq,
                    OrchestratorState::Error { kind, message: kind.message() },
                );
            }
        }
    }

    /// Re-issue the request for the currently active city. The cache is left
    /// alone; a still-live entry will satisfy the retry.
    pub async fn retry(&self) {
        let key = self.active_key.lock().clone();
        self.request(&key).await;
    }

    /// Advance the rotation and request the new city. With
    /// `refresh_on_rotation` set, the city being rotated away from loses its
    /// cache entry, so returning to it forces a fresh fetch; by default all
    /// entries are kept.
    pub async fn select_next_key(&self) {
        let (old_key, new_key) = {
            let mut rotator = self.rotator.lock();
            let old = rotator.current().to_string();
            let new = rotator.next().to_string();
            (old, new)
        };

        if self.refresh_on_rotation {
            debug!(%old_key, "rotation refresh: invalidating previous city");
            self.cache.lock().invalidate(&old_key);
        }

        self.request(&new_key).await;
    }

    /// Change the display unit. Purely presentational: records store Celsius
    /// canonically, so no network traffic results.
    pub fn set_unit(&self, unit: TemperatureUnit) {
        *self.unit.lock() = unit;
    }

    pub fn unit(&self) -> TemperatureUnit {
        *self.unit.lock()
    }

    pub fn active_key(&self) -> String {
        self.active_key.lock().clone()
    }

    /// Current state value. Prefer [`subscribe`](Self::subscribe) for
    /// observing transitions.
    pub fn state(&self) -> OrchestratorState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// The current temperature rendered in the selected unit, or `"N/A"`
    /// outside of `Success`.
    pub fn formatted_temperature(&self) -> String {
        let unit = self.unit();
        let state = self.state.current();
        let value = state.record().map(|r| units::convert(r.temperature_c, unit));
        units::format_opt(value, unit)
    }

    async fn fetch_and_decode(&self, url: &Url, key: &str) -> Result<WeatherRecord, FetchError> {
        let bytes = self.transport.fetch(url, self.request_timeout).await?;
        let fetched_at = self.clock.now();
        let record = decode(&bytes, key, fetched_at)?;
        Ok(record)
    }

    fn request_url(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", key)
            .append_pair("appid", &self.api_key)
            .append_pair("units", "metric");
        url
    }

    fn publish_if_current(&self, seq: u64, state: OrchestratorState) {
        if self.seq.load(Ordering::SeqCst) == seq {
            self.state.publish(state);
        } else {
            debug!(seq, "discarding stale response");
        }
    }
}

impl std::fmt::Debug for WeatherOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherOrchestrator")
            .field("base_url", &self.base_url.as_str())
            .field("active_key", &self.active_key.lock())
            .field("unit", &self.unit.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::transport::TransportError;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct RefusingTransport;

    #[async_trait]
    impl Transport for RefusingTransport {
        async fn fetch(&self, _url: &Url, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::Unreachable("test".into()))
        }
    }

    fn orchestrator(config: &Config) -> anyhow::Result<WeatherOrchestrator> {
        WeatherOrchestrator::new(
            config,
            Arc::new(ManualClock::at_epoch()),
            Arc::new(RefusingTransport),
        )
    }

    fn configured() -> Config {
        Config { api_key: Some("KEY".to_string()), ..Config::default() }
    }

    #[test]
    fn construction_requires_api_key() {
        let err = orchestrator(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn construction_rejects_empty_city_list() {
        let cfg = Config { cities: vec![], ..configured() };
        assert!(orchestrator(&cfg).is_err());
    }

    #[test]
    fn starts_idle_with_default_unit() {
        let orch = orchestrator(&configured()).unwrap();
        assert_eq!(orch.state(), OrchestratorState::Idle);
        assert_eq!(orch.unit(), TemperatureUnit::Celsius);
        assert_eq!(orch.active_key(), "london");
    }

    #[test]
    fn request_url_encodes_key_and_credentials() {
        let orch = orchestrator(&configured()).unwrap();
        let url = orch.request_url("new york");

        assert_eq!(url.host_str(), Some("api.openweathermap.org"));
        let query = url.query().unwrap();
        assert!(query.contains("q=new+york"));
        assert!(query.contains("appid=KEY"));
        assert!(query.contains("units=metric"));
    }

    #[test]
    fn set_unit_is_local_and_reversible() {
        let orch = orchestrator(&configured()).unwrap();
        orch.set_unit(TemperatureUnit::Fahrenheit);
        assert_eq!(orch.unit(), TemperatureUnit::Fahrenheit);
        orch.set_unit(TemperatureUnit::Celsius);
        assert_eq!(orch.unit(), TemperatureUnit::Celsius);
    }

    #[test]
    fn formatted_temperature_without_record_is_not_available() {
        let orch = orchestrator(&configured()).unwrap();
        assert_eq!(orch.formatted_temperature(), "N/A");
    }
}
