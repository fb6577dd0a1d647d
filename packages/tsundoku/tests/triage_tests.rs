//! Integration tests for the add and shelf workflows.
//!
//! These drive `Triage` end to end with mock collaborators:
//! 1. Add: fetch, extract, store, with each stage failing in turn
//! 2. Shelf: ordering, position-based delete, bulk clear

use std::sync::Arc;

use llm_client::LlmError;
use tsundoku::{
    extractor::{ExtractorConfig, Strategy, MIN_CHAR_BUDGET},
    testing::{MockFetcher, MockGenerator},
    AddOutcome, ArticleRecord, DeleteOutcome, ExtractError, Extractor, FetchError, MemoryStore,
    RecordStore, StoreError, Triage,
};

const URL_A: &str = "https://example.com/a";
const REPLY: &str = r#"{"title": "A", "summary": "S", "point": "P", "action": "Act"}"#;

struct Harness {
    triage: Triage,
    fetcher: Arc<MockFetcher>,
    generator: Arc<MockGenerator>,
    store: Arc<MemoryStore>,
}

fn harness(fetcher: MockFetcher, generator: MockGenerator, store: MemoryStore) -> Harness {
    harness_with(fetcher, generator, store, ExtractorConfig::default())
}

fn harness_with(
    fetcher: MockFetcher,
    generator: MockGenerator,
    store: MemoryStore,
    config: ExtractorConfig,
) -> Harness {
    let fetcher = Arc::new(fetcher);
    let generator = Arc::new(generator);
    let store = Arc::new(store);
    let triage = Triage::new(
        fetcher.clone(),
        Extractor::new(generator.clone(), config),
        store.clone(),
    );
    Harness {
        triage,
        fetcher,
        generator,
        store,
    }
}

fn record(title: &str) -> ArticleRecord {
    ArticleRecord {
        title: title.to_string(),
        url: format!("https://example.com/{}", title.to_lowercase()),
        summary: format!("About {}", title),
        point: "P".into(),
        action: "Act".into(),
    }
}

fn reply_titled(title: &str) -> String {
    format!(
        r#"{{"title": "{}", "summary": "S", "point": "P", "action": "Act"}}"#,
        title
    )
}

async fn titles(store: &MemoryStore) -> Vec<String> {
    store
        .read_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect()
}

// =============================================================================
// Add and shelf workflows
// =============================================================================

#[tokio::test]
async fn test_add_saves_record_at_top() {
    let h = harness(
        MockFetcher::new().with_page(URL_A, "Some article text."),
        MockGenerator::new().with_reply(REPLY),
        MemoryStore::with_records([record("Older")]),
    );

    let outcome = h.triage.add(URL_A).await;

    assert!(outcome.is_success(), "{}", outcome.message());
    let records = h.store.read_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0],
        ArticleRecord {
            title: "A".into(),
            url: URL_A.into(),
            summary: "S".into(),
            point: "P".into(),
            action: "Act".into(),
        }
    );
    assert_eq!(records[1].title, "Older");
}

#[tokio::test]
async fn test_empty_url_calls_nothing() {
    let h = harness(
        MockFetcher::new(),
        MockGenerator::new().with_reply(REPLY),
        MemoryStore::new(),
    );

    for input in ["", "   ", "\n"] {
        let outcome = h.triage.add(input).await;
        assert!(matches!(outcome, AddOutcome::EmptyUrl));
        assert!(!outcome.message().is_empty());
    }

    assert!(h.fetcher.calls().is_empty());
    assert!(h.generator.calls().is_empty());
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_dead_url_skips_extraction() {
    let dead = "https://example.com/dead";
    let h = harness(
        MockFetcher::new().with_failure(dead, FetchError::Network("connection refused".into())),
        MockGenerator::new().with_reply(REPLY),
        MemoryStore::with_records([record("Kept")]),
    );

    let outcome = h.triage.add(dead).await;

    assert!(matches!(outcome, AddOutcome::FetchFailed(_)));
    assert_eq!(h.fetcher.calls(), vec![dead.to_string()]);
    assert!(h.generator.calls().is_empty());
    assert_eq!(titles(&h.store).await, vec!["Kept"]);
}

#[tokio::test]
async fn test_missing_action_is_extraction_failure() {
    let h = harness(
        MockFetcher::new().with_page(URL_A, "Valid text."),
        MockGenerator::new().with_reply(r#"{"title": "A", "summary": "S", "point": "P"}"#),
        MemoryStore::new(),
    );

    let outcome = h.triage.add(URL_A).await;

    assert!(matches!(
        outcome,
        AddOutcome::ExtractFailed(ExtractError::MissingField { field: "action" })
    ));
    assert!(outcome.message().contains("action"));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_delete_middle_of_three() {
    let h = harness(
        MockFetcher::new(),
        MockGenerator::new(),
        MemoryStore::with_records(["One", "Two", "Three"].map(record)),
    );

    let listed = h.triage.list().await.unwrap();
    assert_eq!(listed[1].position, 3);

    let outcome = h.triage.delete(&listed[1]).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted { position: 3 });
    assert_eq!(titles(&h.store).await, vec!["One", "Three"]);
}

#[tokio::test]
async fn test_clear_five_then_clear_again() {
    let h = harness(
        MockFetcher::new(),
        MockGenerator::new(),
        MemoryStore::with_records(["A", "B", "C", "D", "E"].map(record)),
    );

    assert_eq!(h.triage.clear().await.unwrap(), 5);
    assert!(h.store.is_empty().await);

    assert_eq!(h.triage.clear().await.unwrap(), 0);
    assert!(h.store.is_empty().await);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn test_successful_records_have_all_fields() {
    let blank_variants = [
        r#"{"title": "", "summary": "S", "point": "P", "action": "Act"}"#,
        r#"{"title": "A", "summary": "  ", "point": "P", "action": "Act"}"#,
        r#"{"title": "A", "summary": "S", "point": null, "action": "Act"}"#,
        r#"{"title": "A", "summary": "S", "point": "P"}"#,
    ];

    for reply in blank_variants {
        let h = harness(
            MockFetcher::new().with_page(URL_A, "text"),
            MockGenerator::new().with_reply(reply),
            MemoryStore::new(),
        );
        let outcome = h.triage.add(URL_A).await;
        assert!(
            matches!(outcome, AddOutcome::ExtractFailed(ExtractError::MissingField { .. })),
            "{} should be rejected",
            reply
        );
        assert!(h.store.is_empty().await);
    }

    let h = harness(
        MockFetcher::new().with_page(URL_A, "text"),
        MockGenerator::new().with_reply(REPLY),
        MemoryStore::new(),
    );
    match h.triage.add(URL_A).await {
        AddOutcome::Saved(record) => {
            for field in [&record.title, &record.summary, &record.point, &record.action] {
                assert!(!field.trim().is_empty());
            }
        }
        other => panic!("expected Saved, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_stages_leave_store_unchanged() {
    let failing_generators = [
        MockGenerator::new().with_error(LlmError::Network("timeout".into())),
        MockGenerator::new().with_error(LlmError::Api("HTTP 500".into())),
        MockGenerator::new().with_reply("not json at all"),
    ];

    for generator in failing_generators {
        let h = harness(
            MockFetcher::new().with_page(URL_A, "text"),
            generator,
            MemoryStore::with_records([record("Existing")]),
        );
        let outcome = h.triage.add(URL_A).await;
        assert!(matches!(outcome, AddOutcome::ExtractFailed(_)));
        assert_eq!(titles(&h.store).await, vec!["Existing"]);
    }

    let h = harness(
        MockFetcher::new().with_failure(URL_A, FetchError::NoContent),
        MockGenerator::new().with_reply(REPLY),
        MemoryStore::with_records([record("Existing")]),
    );
    assert!(matches!(h.triage.add(URL_A).await, AddOutcome::FetchFailed(FetchError::NoContent)));
    assert_eq!(titles(&h.store).await, vec!["Existing"]);
}

#[tokio::test]
async fn test_reads_are_newest_first() {
    let urls: Vec<String> = (1..=4).map(|i| format!("https://example.com/{}", i)).collect();
    let fetcher = urls
        .iter()
        .fold(MockFetcher::new(), |f, url| f.with_page(url.clone(), "text"));
    let h = harness(fetcher, MockGenerator::new(), MemoryStore::new());

    for i in 1..=4 {
        h.generator.set_reply(reply_titled(&format!("Article {}", i)));
        assert!(h.triage.add(&urls[i - 1]).await.is_success());
    }

    let listed = h.triage.list().await.unwrap();
    let shown: Vec<&str> = listed.iter().map(|l| l.record.title.as_str()).collect();
    assert_eq!(shown, vec!["Article 4", "Article 3", "Article 2", "Article 1"]);

    let positions: Vec<usize> = listed.iter().map(|l| l.position).collect();
    assert_eq!(positions, vec![2, 3, 4, 5]);
}

#[tokio::test]
async fn test_delete_shifts_later_records_up() {
    let h = harness(
        MockFetcher::new(),
        MockGenerator::new(),
        MemoryStore::with_records(["A", "B", "C", "D"].map(record)),
    );

    let before = h.triage.list().await.unwrap();
    h.triage.delete(&before[0]).await.unwrap();

    let after = h.triage.list().await.unwrap();
    let shown: Vec<&str> = after.iter().map(|l| l.record.title.as_str()).collect();
    assert_eq!(shown, vec!["B", "C", "D"]);
    assert_eq!(after[0].position, before[0].position);
    assert_eq!(after[0].record, before[1].record);
}

#[tokio::test]
async fn test_stale_listing_deletes_the_displayed_record() {
    let h = harness(
        MockFetcher::new(),
        MockGenerator::new(),
        MemoryStore::with_records(["A", "B", "C"].map(record)),
    );

    // Two deletes from one rendering: the second target has moved up a row
    let stale = h.triage.list().await.unwrap();
    h.triage.delete(&stale[0]).await.unwrap();
    let outcome = h.triage.delete(&stale[2]).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted { position: 3 });
    assert_eq!(titles(&h.store).await, vec!["B"]);

    assert_eq!(h.triage.delete(&stale[0]).await.unwrap(), DeleteOutcome::Vanished);
    assert_eq!(titles(&h.store).await, vec!["B"]);
}

#[tokio::test]
async fn test_duplicate_records_delete_the_displayed_one() {
    let h = harness(
        MockFetcher::new(),
        MockGenerator::new(),
        MemoryStore::with_records([record("Same"), record("Other"), record("Same")]),
    );

    let listed = h.triage.list().await.unwrap();
    let outcome = h.triage.delete(&listed[2]).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted { position: 4 });
    assert_eq!(titles(&h.store).await, vec!["Same", "Other"]);
}

#[tokio::test]
async fn test_clear_on_empty_store_succeeds() {
    let h = harness(MockFetcher::new(), MockGenerator::new(), MemoryStore::new());

    assert_eq!(h.triage.clear().await.unwrap(), 0);
    assert!(h.triage.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_long_article_is_truncated_not_rejected() {
    let long_text = "word ".repeat(50_000);
    let h = harness_with(
        MockFetcher::new().with_page(URL_A, long_text.clone()),
        MockGenerator::new().with_reply(REPLY),
        MemoryStore::new(),
        ExtractorConfig::default().with_char_budget(MIN_CHAR_BUDGET),
    );

    assert!(h.triage.add(URL_A).await.is_success());

    let prompt = h.generator.calls()[0].prompt().to_string();
    assert!(prompt.chars().count() < long_text.chars().count());
    assert!(prompt.ends_with(&long_text[..MIN_CHAR_BUDGET]));
}

// =============================================================================
// Strategies and failure reporting
// =============================================================================

#[tokio::test]
async fn test_freeform_strategy_end_to_end() {
    let h = harness_with(
        MockFetcher::new().with_page(URL_A, "text"),
        MockGenerator::new().with_reply(format!("Here's your summary!\n```json\n{}\n```", REPLY)),
        MemoryStore::new(),
        ExtractorConfig::default().with_strategy(Strategy::Freeform),
    );

    assert!(h.triage.add(URL_A).await.is_success());
    assert_eq!(titles(&h.store).await, vec!["A"]);
}

#[tokio::test]
async fn test_failure_messages_name_the_stage() {
    let h = harness(
        MockFetcher::new().with_page(URL_A, "text"),
        MockGenerator::new().with_error(LlmError::Network("dns".into())),
        MemoryStore::new(),
    );
    let unreachable = h.triage.add(URL_A).await.message();

    let h = harness(
        MockFetcher::new().with_failure(URL_A, FetchError::Status { status: 404 }),
        MockGenerator::new(),
        MemoryStore::new(),
    );
    let fetch_failed = h.triage.add(URL_A).await.message();

    assert_ne!(unreachable, fetch_failed);
    assert!(unreachable.contains("AI service"));
    assert!(fetch_failed.contains("article"));
}

#[tokio::test]
async fn test_out_of_range_delete_is_reported() {
    let store = MemoryStore::with_records([record("A")]);
    assert!(matches!(
        store.delete_at(3).await,
        Err(StoreError::OutOfRange { position: 3, first: 2, last: 2 })
    ));
}
