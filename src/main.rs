use anyhow::Context;
use std::time::Duration;
use storydeck::core::{PageSpec, SegmentRef, StaticStories};
use storydeck::driver::{forward_readiness, ViewerDriver};
use storydeck::gesture::Region;
use storydeck::media::{load_segment, MediaReadiness, MediaReadinessSignal, MockContentLoader};
use storydeck::viewer::{EventLog, ViewerEvent};
use storydeck::{StoryViewer, ViewerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storydeck=info")),
        )
        .init();

    let config = ViewerConfig::load();
    let stories = StaticStories::new(vec![
        PageSpec::new(3),
        PageSpec::new(2).starting_at(1),
        PageSpec::new(1),
    ]);

    let viewer = StoryViewer::new(stories, EventLog::<SegmentRef>::new(), config, 0);
    let bridge = viewer.bridge().clone();
    let (driver, handle) = ViewerDriver::new(viewer);
    let task = tokio::spawn(driver.run());

    // First page waits for its content before the clock moves
    let signal = MediaReadinessSignal::new(MediaReadiness::Loading);
    let forwarder = forward_readiness(0, &signal, handle.clone());
    let mut loader = MockContentLoader::new("demo", Duration::from_millis(400));
    load_segment(&mut loader, SegmentRef { page: 0, segment: 0 }, &signal).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.tap(0, Region::Forward)?;
    handle.tap(0, Region::Forward)?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    bridge.pause();
    tokio::time::sleep(Duration::from_millis(300)).await;
    bridge.start();

    // Off the end of page 0, then through the remaining pages
    handle.tap(0, Region::Forward)?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    handle.tap(1, Region::Forward)?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    handle.tap(2, Region::Forward)?;
    handle.tap(2, Region::Forward)?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle.stop();
    let mut viewer = task.await.context("viewer driver panicked")?;
    drop(signal);
    forwarder.await.context("readiness forwarder panicked")?;

    info!("Final state: {:?}", viewer.snapshot());
    for entry in viewer.observer().entries() {
        let line = match &entry.event {
            ViewerEvent::LimitReached => "limit reached".to_string(),
            ViewerEvent::Overscroll(edge) => format!("overscroll {:?}", edge),
            ViewerEvent::PageChanged(page) => format!("page changed to {}", page),
            ViewerEvent::SegmentShown { page, segment, .. } => {
                format!("showing page {} segment {}", page, segment)
            }
        };
        println!("{}  {}", entry.at.format("%H:%M:%S%.3f"), line);
    }

    viewer.shutdown();
    Ok(())
}
