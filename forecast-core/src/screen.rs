//! The forecast screen: a grid of days fed by a data source, reporting taps
//! to a delegate.
//!
//! The screen never owns its collaborators. Data source and delegate are held
//! as `Weak` handles, and the completions handed to the data source only hold
//! a `Weak` handle back to the screen's state, so a completion that arrives
//! after the screen is dropped does nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, trace};

use crate::capability::{ForecastDataSource, ForecastDelegate};
use crate::error::ScreenError;
use crate::format::{AssetResolver, DateFormatter, GlyphResolver, PatternDateFormatter};
use crate::layout::{GridMetrics, GridSpec};
use crate::model::ForecastDay;

/// Title shown until the data source reports a location.
pub const PLACEHOLDER_TITLE: &str = "Forecast";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// No forecast received yet. Also where a failed fetch leaves the screen.
    Empty,
    Loaded,
}

/// What the container draws for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastCell {
    /// Resolved asset, `None` when the resolver knows no asset for `icon_name`.
    pub icon: Option<String>,
    pub icon_name: String,
    pub label: String,
    pub date_label: String,
}

#[derive(Debug)]
struct ScreenInner {
    title: String,
    forecasts: Vec<ForecastDay>,
    state: ScreenState,
    metrics: Option<GridMetrics>,
}

impl ScreenInner {
    fn replace_forecasts(&mut self, forecasts: Vec<ForecastDay>) {
        if self.state == ScreenState::Empty {
            debug!(days = forecasts.len(), "forecast screen loaded");
        } else {
            debug!(days = forecasts.len(), "forecast screen list replaced");
        }
        self.forecasts = forecasts;
        self.state = ScreenState::Loaded;
    }
}

pub struct ForecastScreen {
    inner: Rc<RefCell<ScreenInner>>,
    activated: Cell<bool>,
    data_source: Option<Weak<dyn ForecastDataSource>>,
    delegate: Option<Weak<dyn ForecastDelegate>>,
    grid: GridSpec,
    date_formatter: Box<dyn DateFormatter>,
    asset_resolver: Box<dyn AssetResolver>,
}

impl Default for ForecastScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastScreen {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScreenInner {
                title: String::new(),
                forecasts: Vec::new(),
                state: ScreenState::Empty,
                metrics: None,
            })),
            activated: Cell::new(false),
            data_source: None,
            delegate: None,
            grid: GridSpec::default(),
            date_formatter: Box::new(PatternDateFormatter::default()),
            asset_resolver: Box::new(GlyphResolver::default()),
        }
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_date_formatter(mut self, formatter: impl DateFormatter + 'static) -> Self {
        self.date_formatter = Box::new(formatter);
        self
    }

    pub fn with_asset_resolver(mut self, resolver: impl AssetResolver + 'static) -> Self {
        self.asset_resolver = Box::new(resolver);
        self
    }

    /// Register the data source without taking ownership of it.
    pub fn set_data_source<D: ForecastDataSource + 'static>(&mut self, source: &Rc<D>) {
        self.data_source = Some(Rc::downgrade(source) as Weak<dyn ForecastDataSource>);
    }

    /// Register the delegate without taking ownership of it.
    pub fn set_delegate<L: ForecastDelegate + 'static>(&mut self, delegate: &Rc<L>) {
        self.delegate = Some(Rc::downgrade(delegate) as Weak<dyn ForecastDelegate>);
    }

    /// Request the location and forecast. Only the first call does anything.
    ///
    /// A failed forecast is dropped on the floor: the grid stays empty and
    /// nothing is reported. There is no retry.
    pub fn activate(&self) {
        if self.activated.replace(true) {
            trace!("forecast screen already active");
            return;
        }

        // Placeholder goes first so a data source answering synchronously is not overwritten.
        self.inner.borrow_mut().title = PLACEHOLDER_TITLE.to_string();

        let Some(source) = self.data_source.as_ref().and_then(Weak::upgrade) else {
            debug!("forecast screen activated without a data source");
            return;
        };
        debug!("forecast screen activated");

        let state = Rc::downgrade(&self.inner);
        source.get_forecast(Box::new(move |result| {
            let Some(state) = state.upgrade() else { return };
            let Ok(forecasts) = result else { return };
            state.borrow_mut().replace_forecasts(forecasts);
        }));

        let state = Rc::downgrade(&self.inner);
        source.get_location(Box::new(move |location| {
            let Some(state) = state.upgrade() else { return };
            state.borrow_mut().title = location;
        }));
    }

    /// Recompute grid geometry for a new viewport width.
    pub fn on_viewport_resized(&self, width: f64) -> GridMetrics {
        let metrics = self.grid.fit(width);
        trace!(width, columns = metrics.columns, "forecast grid refit");
        self.inner.borrow_mut().metrics = Some(metrics);
        metrics
    }

    /// Geometry from the most recent resize, if any.
    pub fn grid_metrics(&self) -> Option<GridMetrics> {
        self.inner.borrow().metrics
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    pub fn state(&self) -> ScreenState {
        self.inner.borrow().state
    }

    pub fn cell_count(&self) -> usize {
        self.inner.borrow().forecasts.len()
    }

    pub fn forecasts(&self) -> Vec<ForecastDay> {
        self.inner.borrow().forecasts.clone()
    }

    pub fn forecast_at(&self, index: usize) -> Result<ForecastDay, ScreenError> {
        let inner = self.inner.borrow();
        inner
            .forecasts
            .get(index)
            .cloned()
            .ok_or(ScreenError::CellOutOfRange { index, count: inner.forecasts.len() })
    }

    pub fn render_cell(&self, index: usize) -> Result<ForecastCell, ScreenError> {
        let day = self.forecast_at(index)?;
        Ok(ForecastCell {
            icon: self.asset_resolver.resolve(&day.icon_name),
            label: day.conditions.displayable().to_string(),
            date_label: self.date_formatter.format(day.date),
            icon_name: day.icon_name,
        })
    }

    /// The user tapped the cell at `index`.
    pub fn on_cell_activated(&self, index: usize) -> Result<(), ScreenError> {
        // Cloned out so the delegate may call back into the screen.
        let day = self.forecast_at(index)?;
        if let Some(delegate) = self.delegate() {
            delegate.details_requested(&day);
        }
        Ok(())
    }

    /// The user tapped the help control.
    pub fn on_help_activated(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.help_requested();
        }
    }

    fn delegate(&self) -> Option<Rc<dyn ForecastDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }
}

impl Drop for ForecastScreen {
    fn drop(&mut self) {
        trace!("forecast screen torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use crate::model::Conditions;
    use crate::testing::{DelegateEvent, ImmediateDataSource, RecordingDelegate, StubDataSource};
    use chrono::NaiveDate;

    fn days(n: usize) -> Vec<ForecastDay> {
        let start = NaiveDate::from_ymd_opt(2016, 11, 19).unwrap();
        (0..n)
            .map(|i| {
                let conditions = Conditions::all()[i % Conditions::all().len()];
                ForecastDay::with_default_icon(start + chrono::Days::new(i as u64), conditions)
            })
            .collect()
    }

    fn wired() -> (ForecastScreen, Rc<StubDataSource>, Rc<RecordingDelegate>) {
        let source = Rc::new(StubDataSource::new());
        let delegate = Rc::new(RecordingDelegate::new());
        let mut screen = ForecastScreen::new();
        screen.set_data_source(&source);
        screen.set_delegate(&delegate);
        (screen, source, delegate)
    }

    #[test]
    fn concrete_collaborators_are_held_weakly() {
        let (screen, source, delegate) = wired();

        assert_eq!(Rc::strong_count(&source), 1);
        assert_eq!(Rc::strong_count(&delegate), 1);
        assert_eq!(Rc::weak_count(&source), 1);
        assert_eq!(Rc::weak_count(&delegate), 1);
        drop(screen);
        assert_eq!(Rc::weak_count(&source), 0);
    }

    #[test]
    fn activation_requests_both_and_sets_placeholder() {
        let (screen, source, _) = wired();
        screen.activate();

        assert_eq!(screen.title(), PLACEHOLDER_TITLE);
        assert_eq!(source.pending_location(), 1);
        assert_eq!(source.pending_forecast(), 1);
        assert_eq!(screen.state(), ScreenState::Empty);
    }

    #[test]
    fn second_activation_is_ignored() {
        let (screen, source, _) = wired();
        screen.activate();
        screen.activate();

        assert_eq!(source.pending_location(), 1);
        assert_eq!(source.pending_forecast(), 1);
    }

    #[test]
    fn location_replaces_title() {
        let (screen, source, _) = wired();
        screen.activate();
        assert!(source.resolve_location("Cupertino"));
        assert_eq!(screen.title(), "Cupertino");
    }

    #[test]
    fn success_loads_cells() {
        let (screen, source, _) = wired();
        screen.activate();
        source.resolve_forecast(Ok(days(5)));

        assert_eq!(screen.cell_count(), 5);
        assert_eq!(screen.state(), ScreenState::Loaded);
    }

    #[test]
    fn a_repeated_success_replaces_the_list() {
        let (screen, source, _) = wired();
        screen.activate();
        // Re-arm so a second forecast completion is handed to the source.
        screen.activated.set(false);
        screen.activate();
        assert_eq!(source.pending_forecast(), 2);

        assert!(source.resolve_forecast(Ok(days(3))));
        assert_eq!(screen.cell_count(), 3);

        assert!(source.resolve_forecast(Ok(days(2))));
        assert_eq!(screen.cell_count(), 2);
        assert_eq!(screen.forecasts(), days(2));
        assert_eq!(screen.state(), ScreenState::Loaded);
    }

    #[test]
    fn failure_leaves_screen_empty_and_quiet() {
        let (screen, source, delegate) = wired();
        screen.activate();
        source.resolve_forecast(Err(ForecastError::fetch_failed("offline")));

        assert_eq!(screen.cell_count(), 0);
        assert_eq!(screen.state(), ScreenState::Empty);
        assert!(delegate.events().is_empty());
    }

    #[test]
    fn synchronous_source_keeps_its_title() {
        let source = Rc::new(ImmediateDataSource {
            location: "Reno".into(),
            forecast: Ok(days(2)),
        });
        let mut screen = ForecastScreen::new();
        screen.set_data_source(&source);
        screen.activate();

        assert_eq!(screen.title(), "Reno");
        assert_eq!(screen.cell_count(), 2);
    }

    #[test]
    fn render_cell_binds_label_icon_and_date() {
        let (screen, source, _) = wired();
        screen.activate();
        source.resolve_forecast(Ok(days(2)));

        let cell = screen.render_cell(1).unwrap();
        assert_eq!(cell.label, "Partly Cloudy");
        assert_eq!(cell.icon_name, "partly-cloudy");
        assert_eq!(cell.icon.as_deref(), Some("⛅"));
        assert_eq!(cell.date_label, "Sun Nov 20");
    }

    #[test]
    fn time_only_date_pattern_still_renders() {
        let source = Rc::new(StubDataSource::new());
        let mut screen = ForecastScreen::new().with_date_formatter(PatternDateFormatter::new("%H:%M"));
        screen.set_data_source(&source);
        screen.activate();
        source.resolve_forecast(Ok(days(1)));

        assert_eq!(screen.render_cell(0).unwrap().date_label, "Sat Nov 19");
    }

    #[test]
    fn unknown_icon_renders_without_asset() {
        let (screen, source, _) = wired();
        screen.activate();
        let date = NaiveDate::from_ymd_opt(2016, 11, 19).unwrap();
        source.resolve_forecast(Ok(vec![ForecastDay::new(date, Conditions::Fog, "mystery")]));

        assert_eq!(screen.render_cell(0).unwrap().icon, None);
    }

    #[test]
    fn out_of_range_cell_is_an_error() {
        let (screen, source, delegate) = wired();
        screen.activate();
        source.resolve_forecast(Ok(days(2)));

        assert_eq!(
            screen.render_cell(2).unwrap_err(),
            ScreenError::CellOutOfRange { index: 2, count: 2 }
        );
        assert!(screen.on_cell_activated(7).is_err());
        assert!(delegate.events().is_empty());
    }

    #[test]
    fn tapping_a_cell_reports_that_exact_day() {
        let (screen, source, delegate) = wired();
        screen.activate();
        let list = days(4);
        source.resolve_forecast(Ok(list.clone()));

        screen.on_cell_activated(2).unwrap();
        assert_eq!(delegate.events(), vec![DelegateEvent::Details(list[2].clone())]);
    }

    #[test]
    fn help_is_reported_in_any_state() {
        let (screen, source, delegate) = wired();
        screen.on_help_activated();
        screen.activate();
        screen.on_help_activated();
        source.resolve_forecast(Ok(days(1)));
        screen.on_help_activated();

        assert_eq!(delegate.events(), vec![DelegateEvent::Help; 3]);
    }

    #[test]
    fn completions_after_teardown_are_ignored() {
        let (screen, source, delegate) = wired();
        screen.activate();
        drop(screen);

        assert!(source.resolve_forecast(Ok(days(3))));
        assert!(source.resolve_location("Nowhere"));
        assert!(delegate.events().is_empty());
    }

    #[test]
    fn dropped_delegate_is_not_notified() {
        let (screen, source, delegate) = wired();
        screen.activate();
        source.resolve_forecast(Ok(days(1)));
        drop(delegate);

        screen.on_help_activated();
        assert!(screen.on_cell_activated(0).is_ok());
    }

    #[test]
    fn dropped_source_leaves_screen_empty() {
        let (screen, source, _) = wired();
        drop(source);
        screen.activate();

        assert_eq!(screen.title(), PLACEHOLDER_TITLE);
        assert_eq!(screen.state(), ScreenState::Empty);
    }

    #[test]
    fn resize_stores_fresh_metrics() {
        let screen = ForecastScreen::new();
        assert_eq!(screen.grid_metrics(), None);

        let portrait = screen.on_viewport_resized(320.0);
        assert_eq!(portrait.columns, 2);
        let landscape = screen.on_viewport_resized(568.0);
        assert_eq!(screen.grid_metrics(), Some(landscape));
        assert_eq!(landscape.columns, 5);
    }
}
