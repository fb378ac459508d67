use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use forecast_core::service::demo::DemoService;
use forecast_core::testing::{DelegateEvent, RecordingDelegate};
use forecast_core::{ForecastScreen, ScreenState, ServiceDataSource, UNKNOWN_LOCATION};
use tokio::runtime::Handle;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 11, 19).unwrap()
}

fn wire(service: DemoService) -> (ForecastScreen, Rc<ServiceDataSource>, Rc<RecordingDelegate>) {
    let source = Rc::new(ServiceDataSource::new(Arc::new(service), Handle::current()));
    let delegate = Rc::new(RecordingDelegate::new());
    let mut screen = ForecastScreen::new();
    screen.set_data_source(&source);
    screen.set_delegate(&delegate);
    (screen, source, delegate)
}

#[tokio::test]
async fn screen_loads_through_service_adapter() {
    let (screen, source, delegate) = wire(DemoService::new(Some("Cupertino".into()), start(), 5));

    screen.activate();
    assert_eq!(screen.title(), "Forecast");
    assert_eq!(source.pending(), 2);

    source.settle().await;

    assert_eq!(screen.title(), "Cupertino");
    assert_eq!(screen.state(), ScreenState::Loaded);
    assert_eq!(screen.cell_count(), 5);

    let day = screen.forecast_at(3).unwrap();
    screen.on_cell_activated(3).unwrap();
    screen.on_help_activated();
    assert_eq!(delegate.events(), vec![DelegateEvent::Details(day), DelegateEvent::Help]);
}

#[tokio::test]
async fn failed_fetch_keeps_grid_empty_but_title_resolves() {
    let (screen, source, delegate) = wire(DemoService::new(None, start(), 5).failing());

    screen.activate();
    source.settle().await;

    assert_eq!(screen.title(), UNKNOWN_LOCATION);
    assert_eq!(screen.state(), ScreenState::Empty);
    assert_eq!(screen.cell_count(), 0);
    assert!(delegate.events().is_empty());
}

#[tokio::test]
async fn teardown_before_results_arrive_is_harmless() {
    let slow = DemoService::new(Some("Reno".into()), start(), 3).with_latency(Duration::from_millis(20));
    let (screen, source, delegate) = wire(slow);

    screen.activate();
    drop(screen);
    source.settle().await;

    assert_eq!(source.pending(), 0);
    assert!(delegate.events().is_empty());
}

#[tokio::test]
async fn layout_follows_viewport_after_load() {
    let (screen, source, _) = wire(DemoService::new(Some("Reno".into()), start(), 7));
    screen.activate();
    source.settle().await;

    let metrics = screen.on_viewport_resized(320.0);
    assert_eq!((metrics.columns, metrics.padding, metrics.edge_inset), (2, 40.0, 20.0));
    assert_eq!(metrics.rows_for(screen.cell_count()), 4);
}
