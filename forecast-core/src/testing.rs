//! Test doubles for the screen's capabilities.

use std::cell::RefCell;

use crate::capability::{ForecastCallback, ForecastDataSource, ForecastDelegate, LocationCallback};
use crate::error::ForecastError;
use crate::model::ForecastDay;

/// Holds on to every completion it receives until a test fires it.
#[derive(Default)]
pub struct StubDataSource {
    location: RefCell<Vec<LocationCallback>>,
    forecast: RefCell<Vec<ForecastCallback>>,
}

impl StubDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_location(&self) -> usize {
        self.location.borrow().len()
    }

    pub fn pending_forecast(&self) -> usize {
        self.forecast.borrow().len()
    }

    /// Fire the oldest pending location completion. Returns false if none was pending.
    pub fn resolve_location(&self, name: &str) -> bool {
        let next = {
            let mut pending = self.location.borrow_mut();
            if pending.is_empty() { None } else { Some(pending.remove(0)) }
        };
        match next {
            Some(completion) => {
                completion(name.to_string());
                true
            }
            None => false,
        }
    }

    /// Fire the oldest pending forecast completion. Returns false if none was pending.
    pub fn resolve_forecast(&self, result: Result<Vec<ForecastDay>, ForecastError>) -> bool {
        let next = {
            let mut pending = self.forecast.borrow_mut();
            if pending.is_empty() { None } else { Some(pending.remove(0)) }
        };
        match next {
            Some(completion) => {
                completion(result);
                true
            }
            None => false,
        }
    }
}

impl ForecastDataSource for StubDataSource {
    fn get_location(&self, completion: LocationCallback) {
        self.location.borrow_mut().push(completion);
    }

    fn get_forecast(&self, completion: ForecastCallback) {
        self.forecast.borrow_mut().push(completion);
    }
}

/// Answers both requests synchronously, before `get_*` returns.
#[derive(Debug, Clone)]
pub struct ImmediateDataSource {
    pub location: String,
    pub forecast: Result<Vec<ForecastDay>, ForecastError>,
}

impl ForecastDataSource for ImmediateDataSource {
    fn get_location(&self, completion: LocationCallback) {
        completion(self.location.clone());
    }

    fn get_forecast(&self, completion: ForecastCallback) {
        completion(self.forecast.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateEvent {
    Details(ForecastDay),
    Help,
}

/// Records every intent it is told about.
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    events: RefCell<Vec<DelegateEvent>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DelegateEvent> {
        self.events.borrow().clone()
    }
}

impl ForecastDelegate for RecordingDelegate {
    fn details_requested(&self, day: &ForecastDay) {
        self.events.borrow_mut().push(DelegateEvent::Details(day.clone()));
    }

    fn help_requested(&self) {
        self.events.borrow_mut().push(DelegateEvent::Help);
    }
}
