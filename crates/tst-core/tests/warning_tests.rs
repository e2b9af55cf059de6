use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;
use tst_artifact::ScriptTarget;
use tst_test_utils::{page, setup_test_pipeline, ts_inline};

/// Layer keeping every event's level and rendered message
#[derive(Clone, Default)]
struct RecordingLayer {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingLayer {
    fn at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for RecordingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events.lock().push((*event.metadata().level(), visitor.0));
    }
}

fn recording() -> (RecordingLayer, tracing::subscriber::DefaultGuard) {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    (layer, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn one_warning_names_the_skipped_target() {
    let (recorded, _guard) = recording();
    let (pipeline, _) = setup_test_pipeline();

    let mut doc = page([
        ts_inline("let one = 1"),
        ScriptTarget::inline("text/javascript", "let two = 2"),
        ts_inline("let three = 3"),
    ]);
    pipeline.run(&mut doc).await.unwrap();

    let warnings = recorded.at(Level::WARN);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].starts_with("inline script #1 was not transpiled"));
    assert!(warnings[0].contains("text/javascript"));
}

#[tokio::test]
async fn clean_page_emits_no_warnings() {
    let (recorded, _guard) = recording();
    let (pipeline, _) = setup_test_pipeline();

    pipeline
        .run(&mut page([ts_inline("let a = 1"), ts_inline("let b = 2")]))
        .await
        .unwrap();

    assert!(recorded.at(Level::WARN).is_empty());
    assert!(!recorded.at(Level::INFO).is_empty());
}

#[tokio::test]
async fn inline_failures_are_told_apart() {
    let (recorded, _guard) = recording();
    let (pipeline, _) = setup_test_pipeline();

    pipeline
        .run(&mut page([
            ScriptTarget::inline("text/javascript", "a"),
            ts_inline("let ok = 1"),
            ScriptTarget::inline("text/javascript", "b"),
        ]))
        .await
        .unwrap();

    let warnings = recorded.at(Level::WARN);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("inline script #0 "));
    assert!(warnings[1].starts_with("inline script #2 "));
}
