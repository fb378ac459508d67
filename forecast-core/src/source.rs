//! Production data source: runs a [`ForecastService`] on the tokio runtime and
//! hands results back to the UI thread.
//!
//! Service calls run as spawned tasks. Their results travel over a channel and
//! the completions the screen handed in are only ever invoked from
//! [`ServiceDataSource::pump`] or [`ServiceDataSource::next_completion`],
//! i.e. on whichever thread owns the data source.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::capability::{ForecastCallback, ForecastDataSource, LocationCallback};
use crate::error::ForecastError;
use crate::model::ForecastDay;
use crate::service::ForecastService;

/// Shown when the service cannot name the location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

#[derive(Debug)]
enum Outcome {
    Location(String),
    Forecast(Result<Vec<ForecastDay>, ForecastError>),
}

/// Sends exactly one outcome for a request. If the task is dropped or
/// unwinds before [`Delivery::send`], the fallback outcome goes out instead.
struct Delivery {
    id: u64,
    tx: mpsc::UnboundedSender<(u64, Outcome)>,
    fallback: Option<Outcome>,
}

impl Delivery {
    fn new(id: u64, tx: mpsc::UnboundedSender<(u64, Outcome)>, fallback: Outcome) -> Self {
        Self { id, tx, fallback: Some(fallback) }
    }

    fn send(mut self, outcome: Outcome) {
        self.fallback = None;
        let _ = self.tx.send((self.id, outcome));
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if let Some(fallback) = self.fallback.take() {
            warn!(id = self.id, "request task ended without a result");
            let _ = self.tx.send((self.id, fallback));
        }
    }
}

enum Pending {
    Location(LocationCallback),
    Forecast(ForecastCallback),
}

pub struct ServiceDataSource {
    service: Arc<dyn ForecastService>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<(u64, Outcome)>,
    rx: Mutex<mpsc::UnboundedReceiver<(u64, Outcome)>>,
    pending: RefCell<HashMap<u64, Pending>>,
    next_id: Cell<u64>,
}

impl ServiceDataSource {
    pub fn new(service: Arc<dyn ForecastService>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            runtime,
            tx,
            rx: Mutex::new(rx),
            pending: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Number of requests whose completion has not been invoked yet.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Invoke completions for every result that has already arrived.
    /// Never blocks. Returns how many completions ran.
    pub fn pump(&self) -> usize {
        let arrived: Vec<_> = match self.rx.try_lock() {
            Ok(mut rx) => std::iter::from_fn(|| rx.try_recv().ok()).collect(),
            Err(_) => return 0,
        };
        let count = arrived.len();
        for (id, outcome) in arrived {
            self.complete(id, outcome);
        }
        count
    }

    /// Wait for the next result and invoke its completion.
    /// Returns false without waiting when nothing is outstanding.
    pub async fn next_completion(&self) -> bool {
        if self.pending() == 0 {
            return false;
        }
        let received = self.rx.lock().await.recv().await;
        match received {
            Some((id, outcome)) => {
                self.complete(id, outcome);
                true
            }
            None => false,
        }
    }

    /// Wait until every outstanding completion has run.
    pub async fn settle(&self) {
        while self.next_completion().await {}
    }

    fn register(&self, pending: Pending) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.pending.borrow_mut().insert(id, pending);
        id
    }

    fn complete(&self, id: u64, outcome: Outcome) {
        // Removed before invoking so the completion may issue new requests.
        let Some(pending) = self.pending.borrow_mut().remove(&id) else {
            warn!(id, "result arrived for unknown request");
            return;
        };
        match (pending, outcome) {
            (Pending::Location(completion), Outcome::Location(name)) => completion(name),
            (Pending::Forecast(completion), Outcome::Forecast(result)) => completion(result),
            (_, outcome) => warn!(id, ?outcome, "result kind does not match request"),
        }
    }
}

impl ForecastDataSource for ServiceDataSource {
    fn get_location(&self, completion: LocationCallback) {
        let id = self.register(Pending::Location(completion));
        let service = Arc::clone(&self.service);
        let delivery = Delivery::new(id, self.tx.clone(), Outcome::Location(UNKNOWN_LOCATION.to_string()));

        self.runtime.spawn(async move {
            let name = match service.location_name().await {
                Ok(name) => name,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), fallback = UNKNOWN_LOCATION, "location lookup failed");
                    UNKNOWN_LOCATION.to_string()
                }
            };
            debug!(id, %name, "location resolved");
            delivery.send(Outcome::Location(name));
        });
    }

    fn get_forecast(&self, completion: ForecastCallback) {
        let id = self.register(Pending::Forecast(completion));
        let service = Arc::clone(&self.service);
        let fallback = Outcome::Forecast(Err(ForecastError::fetch_failed("forecast task ended without a result")));
        let delivery = Delivery::new(id, self.tx.clone(), fallback);

        self.runtime.spawn(async move {
            let result = service.daily_forecast().await.map_err(|err| {
                warn!(error = %format!("{err:#}"), "forecast fetch failed");
                ForecastError::fetch_failed(format!("{err:#}"))
            });
            if let Ok(days) = &result {
                debug!(id, days = days.len(), "forecast fetched");
            }
            delivery.send(Outcome::Forecast(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::demo::DemoService;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::rc::Rc;
    use std::time::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 11, 19).unwrap()
    }

    #[derive(Debug)]
    struct PanickingService;

    #[async_trait]
    impl ForecastService for PanickingService {
        async fn location_name(&self) -> anyhow::Result<String> {
            panic!("location lookup blew up");
        }

        async fn daily_forecast(&self) -> anyhow::Result<Vec<ForecastDay>> {
            panic!("forecast blew up");
        }
    }

    fn source(service: DemoService) -> ServiceDataSource {
        ServiceDataSource::new(Arc::new(service), Handle::current())
    }

    #[tokio::test]
    async fn completions_run_only_when_drained() {
        let source = source(DemoService::new(Some("Reno".into()), start(), 3));
        let seen = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&seen);
        source.get_location(Box::new(move |name| *sink.borrow_mut() = Some(name)));
        assert_eq!(source.pending(), 1);

        tokio::task::yield_now().await;
        assert!(seen.borrow().is_none());

        source.settle().await;
        assert_eq!(seen.borrow().as_deref(), Some("Reno"));
        assert_eq!(source.pending(), 0);
    }

    #[tokio::test]
    async fn missing_location_falls_back_to_unknown() {
        let source = source(DemoService::new(None, start(), 1));
        let seen = Rc::new(RefCell::new(String::new()));

        let sink = Rc::clone(&seen);
        source.get_location(Box::new(move |name| *sink.borrow_mut() = name));
        source.settle().await;

        assert_eq!(*seen.borrow(), UNKNOWN_LOCATION);
    }

    #[tokio::test]
    async fn service_failure_becomes_fetch_failed() {
        let source = source(DemoService::new(Some("Reno".into()), start(), 2).failing());
        let seen = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&seen);
        source.get_forecast(Box::new(move |result| *sink.borrow_mut() = Some(result)));
        source.settle().await;

        let result = seen.borrow_mut().take().expect("completion must run");
        assert!(matches!(result, Err(ForecastError::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn each_completion_runs_exactly_once() {
        let source = source(DemoService::new(Some("Reno".into()), start(), 2));
        let calls = Rc::new(Cell::new(0));

        for _ in 0..2 {
            let calls = Rc::clone(&calls);
            source.get_forecast(Box::new(move |_| calls.set(calls.get() + 1)));
        }
        source.settle().await;
        source.pump();

        assert_eq!(calls.get(), 2);
        assert!(!source.next_completion().await);
    }

    #[tokio::test]
    async fn pump_does_not_wait_for_slow_results() {
        let slow = DemoService::new(Some("Reno".into()), start(), 1).with_latency(Duration::from_millis(50));
        let source = source(slow);
        source.get_forecast(Box::new(|_| {}));

        assert_eq!(source.pump(), 0);
        assert_eq!(source.pending(), 1);
        source.settle().await;
        assert_eq!(source.pending(), 0);
    }

    #[tokio::test]
    async fn panicking_service_still_completes_each_request_once() {
        let source = ServiceDataSource::new(Arc::new(PanickingService), Handle::current());
        let title = Rc::new(RefCell::new(None));
        let forecast = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&title);
        source.get_location(Box::new(move |name| *sink.borrow_mut() = Some(name)));
        let sink = Rc::clone(&forecast);
        source.get_forecast(Box::new(move |result| *sink.borrow_mut() = Some(result)));

        source.settle().await;

        assert_eq!(title.borrow().as_deref(), Some(UNKNOWN_LOCATION));
        assert!(matches!(*forecast.borrow(), Some(Err(ForecastError::FetchFailed { .. }))));
        assert_eq!(source.pending(), 0);
        assert_eq!(source.pump(), 0);
    }
}
