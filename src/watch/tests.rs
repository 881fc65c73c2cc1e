use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind};
use notify::{Event, EventKind};

use super::*;
use crate::task::Task;
use crate::task::fixture::{RecordingReloader, Site};

fn modify(path: &Path) -> Event {
    Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.to_path_buf())
}

fn site_batch(site: &Site, settle: Duration) -> ChangeBatch {
    let filter = WatchFilter::new(&site.config.watch_globs()).unwrap();
    ChangeBatch::new(filter).with_settle(settle)
}

#[test]
fn test_filter_roots_are_glob_bases() {
    let site = Site::new();
    let filter = WatchFilter::new(&site.config.watch_globs()).unwrap();
    let src = site.config.paths.source.clone();

    // `src/*.html` makes `src` the single outermost root
    assert_eq!(filter.roots(), &[src]);
}

#[test]
fn test_filter_matches_watched_globs_only() {
    let site = Site::new();
    let filter = WatchFilter::new(&site.config.watch_globs()).unwrap();
    let src = &site.config.paths.source;

    assert!(filter.matches(&src.join("sass/main.scss")));
    assert!(filter.matches(&src.join("js/lib/util.js")));
    assert!(filter.matches(&src.join("index.html")));
    assert!(filter.matches(&src.join("images/a/b.png")));
    assert!(!filter.matches(&src.join("notes.txt")));
    assert!(!filter.matches(&src.join("partials/nav.html")));
}

#[test]
fn test_events_within_window_form_one_batch() {
    let site = Site::new();
    let mut batch = site_batch(&site, Duration::from_millis(50));
    let src = site.config.paths.source.clone();

    batch.add_event(&modify(&src.join("sass/main.scss")));
    batch.add_event(&modify(&src.join("js/app.js")));
    batch.add_event(&modify(&src.join("sass/main.scss")));
    assert!(batch.take_if_ready().is_none());

    std::thread::sleep(Duration::from_millis(80));
    let changes = batch.take_if_ready().unwrap();
    assert_eq!(changes.len(), 2);

    // Drained: nothing left for a second run
    assert!(batch.take_if_ready().is_none());
}

#[test]
fn test_temp_and_unwatched_files_ignored() {
    let site = Site::new();
    let mut batch = site_batch(&site, Duration::ZERO);
    let src = site.config.paths.source.clone();

    assert!(!batch.add_event(&modify(&src.join("sass/main.scss.swp"))));
    assert!(!batch.add_event(&modify(&src.join("sass/.main.scss"))));
    assert!(!batch.add_event(&modify(&src.join("index.html~"))));
    assert!(!batch.add_event(&modify(&src.join("README.md"))));
    assert!(batch.take_if_ready().is_none());
}

#[test]
fn test_metadata_only_changes_ignored() {
    let site = Site::new();
    let mut batch = site_batch(&site, Duration::ZERO);
    let path = site.config.paths.source.join("index.html");

    let chmod = Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)))
        .add_path(path.clone());
    assert!(!batch.add_event(&chmod));

    let create = Event::new(EventKind::Create(CreateKind::File)).add_path(path);
    assert!(batch.add_event(&create));
}

#[test]
fn test_sleep_duration_idle_is_long() {
    let site = Site::new();
    let batch = site_batch(&site, Duration::from_millis(SETTLE_MS));
    assert!(batch.sleep_duration() > Duration::from_secs(60));
}

#[test]
fn test_one_batch_runs_series_once_then_reloads() {
    let site = Site::new();
    site.write("src/index.html", "<html><body></body></html>");
    site.write("src/sass/main.scss", ".a { color: red; }");
    let reloader = RecordingReloader::default();

    let mut batch = site_batch(&site, Duration::ZERO);
    let src = site.config.paths.source.clone();
    batch.add_event(&modify(&src.join("index.html")));
    batch.add_event(&modify(&src.join("sass/main.scss")));

    let changes: Vec<PathBuf> = batch.take_if_ready().unwrap();
    let reports = rebuild(&site.config, &reloader, &changes);

    let order: Vec<Task> = reports.iter().map(|r| r.task).collect();
    assert_eq!(order, WATCH_SERIES);
    assert_eq!(order.last(), Some(&Task::Reload));
    assert_eq!(reloader.count(), 1);
    assert!(site.output("index.html").is_file());
    assert!(site.output("css/main.css").is_file());
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

async fn wait_for_reloads(reloader: &RecordingReloader, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if reloader.count() >= expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[test]
fn test_watch_actor_rebuilds_once_per_batch() {
    let site = Site::new();
    site.write("src/index.html", "<html><body>v1</body></html>");
    site.write("src/sass/main.scss", ".a { color: red; }");
    site.write("src/js/app.js", "var x = 1;\n");
    let config = Arc::new(site.config.clone());
    let reloader = Arc::new(RecordingReloader::default());

    runtime().block_on(async {
        let actor = WatchActor::new(Arc::clone(&config), reloader.clone()).unwrap();
        let task = tokio::spawn(actor.run());

        site.write("src/index.html", "<html><body>v2</body></html>");
        site.write("src/sass/main.scss", ".a { color: blue; }");
        assert!(wait_for_reloads(&reloader, 1).await, "no rebuild after change");

        // both writes settled into one batch, so nothing else runs
        tokio::time::sleep(Duration::from_millis(SETTLE_MS * 3)).await;
        assert_eq!(reloader.count(), 1);
        assert!(site.read_output("index.html").contains("v2"));
        assert!(site.read_output("css/main.css").contains("blue"));

        // a later change is its own batch
        site.write("src/js/app.js", "var x = 2;\n");
        assert!(wait_for_reloads(&reloader, 2).await, "no rebuild after second change");
        tokio::time::sleep(Duration::from_millis(SETTLE_MS * 3)).await;
        assert_eq!(reloader.count(), 2);
        assert!(site.read_output("js/app.js").contains('2'));

        task.abort();
    });
}

#[test]
fn test_watch_actor_ignores_output_writes() {
    let site = Site::new();
    site.write("src/index.html", "<html><body></body></html>");
    let config = Arc::new(site.config.clone());
    let reloader = Arc::new(RecordingReloader::default());

    runtime().block_on(async {
        let actor = WatchActor::new(Arc::clone(&config), reloader.clone()).unwrap();
        let task = tokio::spawn(actor.run());

        site.write("dist/index.html", "<html></html>");
        site.write("src/notes.txt", "not an asset");
        tokio::time::sleep(Duration::from_millis(SETTLE_MS * 3)).await;
        assert_eq!(reloader.count(), 0);

        task.abort();
    });
}
