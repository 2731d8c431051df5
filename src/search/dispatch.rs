use futures_util::future::{try_join_all, BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{DocumentRecord, DocumentType, Intent, IntentKind};
use crate::search::compile::compile;
use crate::search::latest::{requested_prefixes, resolve_latest};
use crate::search::normalize::normalize;
use crate::store::{CollectionKind, DocumentStore};

/// Fixed cap for the "most recent notices" fetch.
const LATEST_NOTICES_LIMIT: usize = 5;

/// What a dispatch step produced: normalized records, or a scalar count
/// for `count_items` intents.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieved {
    Records(Vec<DocumentRecord>),
    Count(u64),
}

/// Collections a document type expands to.
pub fn targets(document_type: DocumentType) -> &'static [CollectionKind] {
    match document_type {
        DocumentType::Notice => &[CollectionKind::Notice],
        DocumentType::Instruction => &[CollectionKind::Instruction],
        DocumentType::Regulation => &[CollectionKind::Regulation],
        DocumentType::All => &[
            CollectionKind::Notice,
            CollectionKind::Instruction,
            CollectionKind::Regulation,
        ],
    }
}

/// Run the retrieval strategy the intent calls for. Per-collection fetches
/// run concurrently; normalization waits for all of them.
pub async fn dispatch(store: &dyn DocumentStore, intent: &Intent) -> Result<Retrieved, StoreError> {
    match intent.kind {
        IntentKind::CountItems => count_items(store, intent).await,
        IntentKind::SearchLatest => search_latest(store, intent).await,
        IntentKind::SearchInfo | IntentKind::Unknown => search_info(store, intent).await,
    }
}

async fn search_info(store: &dyn DocumentStore, intent: &Intent) -> Result<Retrieved, StoreError> {
    let fetches = targets(intent.document_type).iter().map(|&collection| {
        let filter = compile(&intent.keywords, collection, intent.year);
        async move {
            let docs = store.find(collection, &filter).await?;
            Ok::<_, StoreError>((collection, docs))
        }
    });

    let batches = try_join_all(fetches).await?;
    Ok(Retrieved::Records(normalize(batches)))
}

async fn count_items(store: &dyn DocumentStore, intent: &Intent) -> Result<Retrieved, StoreError> {
    let counts = targets(intent.document_type).iter().map(|&collection| {
        let filter = compile(&intent.keywords, collection, intent.year);
        async move {
            match collection {
                // the regulation counts individual articles, not sections
                CollectionKind::Regulation => store.count_articles().await,
                _ => store.count(collection, &filter).await,
            }
        }
    });

    let totals = try_join_all(counts).await?;
    Ok(Retrieved::Count(totals.into_iter().sum()))
}

/// "Most recent" is not expressible as a store filter for instructions:
/// recency lives in the title's sequence number. Notices do carry a
/// reliable chronological field, so they use a store-level sort instead.
async fn search_latest(store: &dyn DocumentStore, intent: &Intent) -> Result<Retrieved, StoreError> {
    let mut fetches: Vec<BoxFuture<'_, Result<(CollectionKind, Vec<Value>), StoreError>>> =
        Vec::new();

    for &collection in targets(intent.document_type) {
        match collection {
            CollectionKind::Notice => {
                let filter = compile(&intent.keywords, collection, intent.year);
                fetches.push(
                    async move {
                        let docs = store
                            .find_sorted_desc(collection, &filter, "issue_date", LATEST_NOTICES_LIMIT)
                            .await?;
                        Ok((collection, docs))
                    }
                    .boxed(),
                );
            }
            CollectionKind::Instruction => {
                let filter = compile(&intent.keywords, collection, intent.year);
                let prefixes = requested_prefixes(intent.sub_type);
                fetches.push(
                    async move {
                        let docs = store.find(collection, &filter).await?;
                        Ok((collection, resolve_latest(&docs, prefixes)))
                    }
                    .boxed(),
                );
            }
            // the regulation has no notion of a latest document
            CollectionKind::Regulation => {}
        }
    }

    let batches = try_join_all(fetches).await?;
    Ok(Retrieved::Records(normalize(batches)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubType;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn seeded_store() -> MemoryStore {
        MemoryStore::from_collections(
            vec![
                json!({
                    "id": "n1", "norm_type": "Circular", "number": "06/20",
                    "topic": "Operativa de caja", "issue_date": "2020-06-15"
                }),
                json!({
                    "id": "n2", "norm_type": "Circular", "number": "01/23",
                    "topic": "Pagos transfronterizos", "issue_date": "2023-01-10"
                }),
                json!({
                    "id": "n3", "norm_type": "Circular", "number": "02/23",
                    "topic": "Actualización de caja", "issue_date": "2023-03-02"
                }),
            ],
            vec![
                json!({"id": "i1", "title": "I10 - Caja auxiliar"}),
                json!({"id": "i2", "title": "I141 - Procedimiento de altas"}),
                json!({"id": "i3", "title": "E3 - Corresponsales"}),
            ],
            vec![
                json!({
                    "id": "r1", "title": "Título I",
                    "articles": [
                        {"number": 1, "summary": "Objeto y ámbito"},
                        {"number": 2, "summary": "Definiciones"}
                    ]
                }),
                json!({
                    "id": "r2", "title": "Título II",
                    "articles": [{"number": 3, "summary": "Régimen de caja"}]
                }),
            ],
        )
    }

    fn intent(kind: IntentKind, document_type: DocumentType) -> Intent {
        Intent {
            kind,
            document_type,
            keywords: Vec::new(),
            year: None,
            sub_type: None,
        }
    }

    #[tokio::test]
    async fn test_search_info_single_collection() {
        let store = seeded_store();
        let mut query = intent(IntentKind::SearchInfo, DocumentType::Notice);
        query.keywords = vec!["06/20".into()];

        let Retrieved::Records(records) = dispatch(&store, &query).await.unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), "n1");
    }

    #[tokio::test]
    async fn test_search_info_all_collections_concat() {
        let store = seeded_store();
        let mut query = intent(IntentKind::SearchInfo, DocumentType::All);
        query.keywords = vec!["caja".into()];

        let Retrieved::Records(records) = dispatch(&store, &query).await.unwrap() else {
            panic!("expected records");
        };
        // n1 + n3 (topic), i1 (title), r2 (article summary)
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["n1", "n3", "i1", "r2"]);
    }

    #[tokio::test]
    async fn test_count_regulation_unwinds_articles() {
        let store = seeded_store();
        let query = intent(IntentKind::CountItems, DocumentType::Regulation);

        let retrieved = dispatch(&store, &query).await.unwrap();
        assert_eq!(retrieved, Retrieved::Count(3));
    }

    #[tokio::test]
    async fn test_count_all_sums_collections() {
        let store = seeded_store();
        let query = intent(IntentKind::CountItems, DocumentType::All);

        // 3 notices + 3 instructions + 3 articles
        let retrieved = dispatch(&store, &query).await.unwrap();
        assert_eq!(retrieved, Retrieved::Count(9));
    }

    #[tokio::test]
    async fn test_latest_instruction_by_sequence() {
        let store = seeded_store();
        let mut query = intent(IntentKind::SearchLatest, DocumentType::Instruction);
        query.sub_type = Some(SubType::Internal);

        let Retrieved::Records(records) = dispatch(&store, &query).await.unwrap() else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), Some("I141 - Procedimiento de altas"));
    }

    #[tokio::test]
    async fn test_latest_instruction_both_prefixes() {
        let store = seeded_store();
        let query = intent(IntentKind::SearchLatest, DocumentType::Instruction);

        let Retrieved::Records(records) = dispatch(&store, &query).await.unwrap() else {
            panic!("expected records");
        };
        let titles: Vec<_> = records.iter().filter_map(|r| r.title()).collect();
        assert_eq!(titles, vec!["I141 - Procedimiento de altas", "E3 - Corresponsales"]);
    }

    #[tokio::test]
    async fn test_latest_notices_sorted_by_date() {
        let store = seeded_store();
        let query = intent(IntentKind::SearchLatest, DocumentType::Notice);

        let Retrieved::Records(records) = dispatch(&store, &query).await.unwrap() else {
            panic!("expected records");
        };
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["n3", "n2", "n1"]);
    }

    #[tokio::test]
    async fn test_latest_with_year_filter() {
        let store = seeded_store();
        let mut query = intent(IntentKind::SearchLatest, DocumentType::Notice);
        query.year = Some(2023);

        let Retrieved::Records(records) = dispatch(&store, &query).await.unwrap() else {
            panic!("expected records");
        };
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["n3", "n2"]);
    }

    #[tokio::test]
    async fn test_latest_regulation_yields_nothing() {
        let store = seeded_store();
        let query = intent(IntentKind::SearchLatest, DocumentType::Regulation);

        let retrieved = dispatch(&store, &query).await.unwrap();
        assert_eq!(retrieved, Retrieved::Records(Vec::new()));
    }
}
