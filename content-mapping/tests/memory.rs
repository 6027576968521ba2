use content_mapping::destination::memory::MemoryDestination;
use content_mapping::document::{Document, DocumentMapper, Fields};
use content_mapping::error::{ErrorKind, SyncResult};
use content_mapping::source::memory::MemorySource;
use content_mapping::synchronizer::{SyncSummary, Synchronizer};
use content_mapping::types::RecordId;
use content_mapping::{BatchConfig, SynchronizerConfig};
use content_mapping_telemetry::tracing::init_test_tracing;
use std::fs;

const CLASS: &str = "article";

#[derive(Debug, Clone)]
struct Article {
    id: u64,
    title: &'static str,
    published: bool,
}

impl Article {
    fn new(id: u64, title: &'static str, published: bool) -> Self {
        Self {
            id,
            title,
            published,
        }
    }
}

fn article_id(article: &Article) -> RecordId {
    RecordId(article.id)
}

fn article_fields(article: &Article) -> SyncResult<Option<Fields>> {
    if !article.published {
        return Ok(None);
    }

    let mut fields = Fields::new();
    fields.insert("title".to_string(), serde_json::to_value(article.title)?);

    Ok(Some(fields))
}

fn stored(id: u64, title: &str) -> Document {
    Document::new(RecordId(id), CLASS).with_field("title", title)
}

fn config(force: bool) -> SynchronizerConfig {
    SynchronizerConfig {
        class_name: CLASS.to_string(),
        force,
        batch: BatchConfig { max_size: 2 },
    }
}

fn articles() -> MemorySource<Article> {
    MemorySource::new(vec![
        Article::new(1, "Hello", true),
        Article::new(2, "World", true),
        Article::new(3, "Draft", false),
    ])
}

#[tokio::test]
async fn memory_destination_mirrors_published_articles() {
    init_test_tracing();

    let config = config(false);
    let destination = MemoryDestination::with_batch_config(config.batch.clone());
    destination
        .seed([stored(2, "Old title"), stored(4, "Removed")])
        .await;

    let mut synchronizer = Synchronizer::new(
        articles(),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );

    let summary = synchronizer.run(&config).await.unwrap();

    assert_eq!(
        summary,
        SyncSummary {
            inserted: 1,
            updated: 1,
            kept: 0,
            deleted: 1,
            skipped: 1,
        }
    );
    assert_eq!(
        destination.documents(CLASS).await,
        vec![stored(1, "Hello"), stored(2, "World")]
    );
    assert_eq!(destination.pending_writes().await, 0);
    // One flush once the batch filled up, one on commit.
    assert_eq!(destination.flushes().await, 2);
    assert_eq!(destination.commits().await, 1);
}

#[tokio::test]
async fn second_pass_without_changes_writes_nothing() {
    init_test_tracing();

    let config = config(false);
    let destination = MemoryDestination::with_batch_config(config.batch.clone());
    let mut synchronizer = Synchronizer::new(
        articles(),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );

    synchronizer.run(&config).await.unwrap();
    let flushes = destination.flushes().await;

    let summary = synchronizer.run(&config).await.unwrap();

    assert_eq!(summary.kept, 2);
    assert_eq!(summary.skipped, 1);
    assert!(!summary.has_changes());
    assert_eq!(destination.flushes().await, flushes);
    assert_eq!(destination.commits().await, 2);
}

#[tokio::test]
async fn forced_pass_rewrites_every_document() {
    init_test_tracing();

    let destination = MemoryDestination::with_batch_config(config(false).batch);
    let mut synchronizer = Synchronizer::new(
        articles(),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );

    synchronizer.run(&config(false)).await.unwrap();
    let summary = synchronizer.run(&config(true)).await.unwrap();

    assert_eq!(summary.updated, 2);
    assert_eq!(summary.kept, 0);
    assert!(synchronizer.mapper().is_forced());
    assert_eq!(destination.documents(CLASS).await.len(), 2);
}

#[tokio::test]
async fn unordered_source_leaves_destination_uncommitted() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let mut synchronizer = Synchronizer::new(
        MemorySource::new(vec![
            Article::new(2, "World", true),
            Article::new(1, "Hello", true),
        ]),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );

    let err = synchronizer.synchronize(CLASS, false).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceIdsOutOfOrder);
    assert_eq!(destination.commits().await, 0);
    assert!(destination.documents(CLASS).await.is_empty());
    assert_eq!(destination.pending_writes().await, 1);
}

#[tokio::test]
async fn pass_after_failed_pass_drops_its_buffered_writes() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let mut failing = Synchronizer::new(
        MemorySource::new(vec![
            Article::new(5, "Later", true),
            Article::new(2, "Earlier", true),
        ]),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );
    failing.synchronize(CLASS, false).await.unwrap_err();
    assert_eq!(destination.pending_writes().await, 1);

    let mut synchronizer = Synchronizer::new(
        MemorySource::new(vec![Article::new(1, "Hello", true)]),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );
    let summary = synchronizer.synchronize(CLASS, false).await.unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.deleted, 0);
    assert_eq!(destination.documents(CLASS).await, vec![stored(1, "Hello")]);
    assert_eq!(destination.commits().await, 1);
}

#[tokio::test]
async fn records_without_fields_are_still_inserted() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let mut synchronizer = Synchronizer::new(
        articles(),
        DocumentMapper::new(article_id, |_: &Article| -> SyncResult<Option<Fields>> { Ok(Some(Fields::new())) }),
        destination.clone(),
    );

    let summary = synchronizer.synchronize(CLASS, false).await.unwrap();

    assert_eq!(summary.inserted, 3);
    assert_eq!(summary.kept, 0);
    assert_eq!(
        destination.documents(CLASS).await,
        vec![
            Document::new(RecordId(1), CLASS),
            Document::new(RecordId(2), CLASS),
            Document::new(RecordId(3), CLASS),
        ]
    );

    let summary = synchronizer.synchronize(CLASS, false).await.unwrap();

    assert_eq!(summary.kept, 3);
    assert!(!summary.has_changes());
}

#[tokio::test]
async fn pass_reads_settings_from_configuration_directory() {
    init_test_tracing();

    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("base.yaml"),
        "class_name: article\nbatch:\n  max_size: 2\n",
    )
    .unwrap();
    fs::write(dir.path().join("dev.yaml"), "force: true\n").unwrap();
    fs::write(dir.path().join("prod.yaml"), "force: false\n").unwrap();

    let destination = MemoryDestination::new();
    destination.seed([stored(1, "Hello")]).await;
    let mut synchronizer = Synchronizer::new(
        articles(),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );

    let summary = synchronizer.run_from_directory(dir.path()).await.unwrap();

    assert_eq!(summary.processed(), 3);
    assert_eq!(summary.inserted, 1);
    assert_eq!(destination.documents(CLASS).await.len(), 2);
    assert_eq!(destination.commits().await, 1);
}

#[tokio::test]
async fn missing_configuration_is_a_config_error() {
    init_test_tracing();

    let dir = tempfile::tempdir().unwrap();
    let destination = MemoryDestination::new();
    let mut synchronizer = Synchronizer::new(
        articles(),
        DocumentMapper::new(article_id, article_fields),
        destination.clone(),
    );

    let err = synchronizer
        .run_from_directory(dir.path())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigError);
    assert_eq!(destination.commits().await, 0);
}
