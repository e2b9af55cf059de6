use chrono::Duration;
use std::sync::Arc;
use tst_cache::{FileStore, Store};
use tst_core::{init_tracing, LoggingConfig, PipelineConfig};
use tst_test_utils::{injected_code, page, ts_inline, CountingCompiler, StaticFetcher, TestHarness};

async fn harness(dir: &std::path::Path, origin: &str) -> TestHarness {
    let store: Arc<dyn Store> = Arc::new(FileStore::open(dir, origin).await.unwrap());
    TestHarness::with_store(store, StaticFetcher::new(), CountingCompiler::new())
}

#[tokio::test]
async fn compiled_output_survives_reload() {
    init_tracing(&LoggingConfig::default());
    let dir = tempfile::tempdir().unwrap();

    let first = harness(dir.path(), "https://example.com").await;
    let mut before = page([ts_inline("let a: number = 1")]);
    first
        .pipeline(PipelineConfig::new())
        .run(&mut before)
        .await
        .unwrap();
    assert_eq!(first.compiler.calls(), 1);

    let second = harness(dir.path(), "https://example.com").await;
    let mut after = page([ts_inline("let a: number = 1")]);
    let report = second
        .pipeline(PipelineConfig::new())
        .run(&mut after)
        .await
        .unwrap();

    assert_eq!(second.compiler.calls(), 0);
    assert_eq!(report.cache_hits(), 1);
    assert_eq!(injected_code(&before), injected_code(&after));
}

#[tokio::test]
async fn origins_do_not_share_entries() {
    let dir = tempfile::tempdir().unwrap();

    let a = harness(dir.path(), "https://a.example").await;
    a.pipeline(PipelineConfig::new())
        .run(&mut page([ts_inline("let a = 1")]))
        .await
        .unwrap();

    let b = harness(dir.path(), "https://b.example").await;
    b.pipeline(PipelineConfig::new())
        .run(&mut page([ts_inline("let a = 1")]))
        .await
        .unwrap();

    assert_eq!(b.compiler.calls(), 1);
}

#[tokio::test]
async fn eviction_is_persisted() {
    let dir = tempfile::tempdir().unwrap();

    let first = harness(dir.path(), "https://example.com").await;
    let pipeline = first.pipeline(PipelineConfig::new());
    pipeline.run(&mut page([ts_inline("let a = 1")])).await.unwrap();

    first.clock.advance(Duration::days(31));
    let report = pipeline.run(&mut page([])).await.unwrap();
    assert_eq!(report.evicted, 1);

    let reopened = FileStore::open(dir.path(), "https://example.com").await.unwrap();
    assert!(reopened.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn prefixes_partition_one_store() {
    let dir = tempfile::tempdir().unwrap();
    let shared = harness(dir.path(), "https://example.com").await;

    let default_prefix = shared.pipeline(PipelineConfig::new());
    let other_prefix = shared.pipeline(PipelineConfig::new().with_cache_prefix("other-app"));

    default_prefix.run(&mut page([ts_inline("let a = 1")])).await.unwrap();
    other_prefix.run(&mut page([ts_inline("let a = 1")])).await.unwrap();

    assert_eq!(shared.compiler.calls(), 2);
    assert_eq!(shared.store.keys().await.unwrap().len(), 2);
}
