//! 地图导出编排测试

mod common;

use std::sync::Arc;

use common::{test_config, MockBackend};
use serde_json::json;
use tripmap::error::{AppError, BrowserError};
use tripmap::orchestrator::{ANIMATION_HOOK, SCREENSHOT_HOOK};
use tripmap::{ItineraryRequest, MapExporter};

fn itinerary(count: usize) -> ItineraryRequest {
    let locations: Vec<_> = (1..=count)
        .map(|i| {
            json!({
                "id": format!("address-{}", i),
                "address": format!("Stop {}", i),
                "arrival": "2024-05-01",
                "departure": "2024-05-02",
                "coordinates": "[24.75,59.43]",
                "images": []
            })
        })
        .collect();
    serde_json::from_value(json!({ "locations": locations, "tileSrc": "osm_bright" })).unwrap()
}

#[tokio::test]
async fn test_phases_run_in_order_with_own_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let backend = Arc::new(MockBackend::default());
    let exporter = MapExporter::new(&config, backend.clone());

    let artifacts = exporter.export(&itinerary(3)).await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            "goto http://tripmap.test/map".to_string(),
            format!("hook {} locations=3 wait=true", SCREENSHOT_HOOK),
            "screenshot".to_string(),
            "close".to_string(),
            "goto http://tripmap.test/map".to_string(),
            format!("hook {} locations=3 wait=false", ANIMATION_HOOK),
            "download timeout=55".to_string(),
            "close".to_string(),
        ]
    );

    let launches = backend.launches.lock().unwrap();
    assert_eq!(launches.len(), 2);
    assert_eq!(launches[0].download_dir, None);
    assert_eq!(launches[1].download_dir, Some(dir.path().join("downloads")));
    assert_eq!((launches[0].viewport_width, launches[0].viewport_height), (1920, 1080));

    assert_eq!(artifacts.screenshot, dir.path().join("map.png"));
    assert_eq!(artifacts.animation, dir.path().join("downloads/trip-animation.webm"));
    assert!(!dir.path().join("downloads/7c1e5a0b-guid").exists());
}

#[tokio::test]
async fn test_empty_itinerary_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::default());
    let exporter = MapExporter::new(&test_config(dir.path()), backend.clone());

    let err = exporter.export(&itinerary(0)).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(backend.launch_count(), 0);
}

#[tokio::test]
async fn test_download_failure_still_releases_browser() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::failing_download());
    let exporter = MapExporter::new(&test_config(dir.path()), backend.clone());

    let err = exporter.export(&itinerary(1)).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Browser(BrowserError::DownloadTimeout { secs: 25 })
    ));
    assert_eq!(backend.launch_count(), 2);
    assert_eq!(backend.close_count(), 2);
    assert_eq!(backend.calls().last().map(String::as_str), Some("close"));
}
