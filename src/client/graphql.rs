//! # GraphQL Record Store Client
//!
//! HTTP client for a monday.com style GraphQL API: boards hold items, items
//! hold subitems, and subitems carry typed column values. Reads use
//! `items_page` cursor pagination; writes are sent as one document of aliased
//! `change_column_value` mutations so each result can be matched back to its
//! operation.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{ItemsPage, MutationResult, RecordStoreApi};
use crate::config::DuplicatorConfig;
use crate::error::{DuplicatorError, DuplicatorResult};
use crate::models::{CollectionId, ColumnId, ColumnValue, ItemId, Record, SubRecord, WriteDescriptor};

/// GraphQL-over-HTTP implementation of [`RecordStoreApi`]
#[derive(Clone)]
pub struct GraphqlRecordStore {
    client: Client,
    endpoint: Url,
}

impl std::fmt::Debug for GraphqlRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlRecordStore")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl GraphqlRecordStore {
    /// Build a client from configuration
    ///
    /// Fails with a configuration error when the endpoint or headers are invalid.
    pub fn new(config: &DuplicatorConfig) -> DuplicatorResult<Self> {
        let endpoint = Url::parse(&config.api_url).map_err(|e| {
            DuplicatorError::configuration(format!("Invalid api_url '{}': {e}", config.api_url))
        })?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            default_headers.insert(
                header::AUTHORIZATION,
                token.parse().map_err(|e| {
                    DuplicatorError::configuration(format!("Invalid api_token: {e}"))
                })?,
            );
        }
        if let Some(version) = &config.api_version {
            default_headers.insert(
                "api-version",
                version.parse().map_err(|e| {
                    DuplicatorError::configuration(format!("Invalid api_version: {e}"))
                })?,
            );
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!("creation-log-duplicator/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| DuplicatorError::configuration(format!("HTTP client setup failed: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// POST a GraphQL document and decode the envelope
    async fn post<T: DeserializeOwned>(&self, document: String) -> Result<GraphqlResponse<T>, String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({ "query": document }))
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Remote API rejected request with 429 Too Many Requests");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status.as_u16(), truncate(&body, 500)));
        }

        response
            .json::<GraphqlResponse<T>>()
            .await
            .map_err(|e| format!("malformed response: {e}"))
    }

    /// POST a read query; any GraphQL error or missing `data` is a query failure
    async fn query<T: DeserializeOwned>(&self, operation: &str, document: String) -> DuplicatorResult<T> {
        let envelope = self
            .post::<T>(document)
            .await
            .map_err(|e| DuplicatorError::remote_query(operation, e))?;

        if let Some(message) = envelope.error_summary() {
            return Err(DuplicatorError::remote_query(operation, message));
        }
        envelope
            .data
            .ok_or_else(|| DuplicatorError::remote_query(operation, "response has no data"))
    }
}

#[async_trait]
impl RecordStoreApi for GraphqlRecordStore {
    async fn count_items(&self, collection_id: &CollectionId) -> DuplicatorResult<u64> {
        let data: CountData = self
            .query("count_items", count_query(collection_id))
            .await?;

        data.boards
            .into_iter()
            .next()
            .and_then(|b| b.items_count)
            .ok_or_else(|| {
                DuplicatorError::remote_query("count_items", format!("board {collection_id} not found"))
            })
    }

    async fn page_items(
        &self,
        collection_id: &CollectionId,
        limit: u32,
        cursor: Option<&str>,
    ) -> DuplicatorResult<ItemsPage> {
        let data: PageData = self
            .query("page_items", page_query(collection_id, limit, cursor))
            .await?;

        if let Some(complexity) = &data.complexity {
            debug!(
                before = complexity.before,
                after = complexity.after,
                query = complexity.query,
                "Query complexity budget"
            );
        }

        let board = data.boards.into_iter().next().ok_or_else(|| {
            DuplicatorError::remote_query("page_items", format!("board {collection_id} not found"))
        })?;

        let items = board
            .items_page
            .items
            .into_iter()
            .map(WireItem::into_record)
            .collect::<DuplicatorResult<Vec<_>>>()?;

        Ok(ItemsPage::new(items, board.items_page.cursor))
    }

    async fn mutate(&self, operations: &[WriteDescriptor]) -> DuplicatorResult<Vec<MutationResult>> {
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        let envelope = self
            .post::<HashMap<String, Option<MutatedItem>>>(mutation_document(operations))
            .await
            .map_err(|e| DuplicatorError::remote_mutation(0, e))?;

        let errors_by_alias = envelope.errors_by_alias();
        let summary = envelope.error_summary();
        let Some(data) = envelope.data else {
            let message = summary.unwrap_or_else(|| "response has no data".to_string());
            return Err(DuplicatorError::remote_mutation(0, message));
        };

        Ok(operations
            .iter()
            .enumerate()
            .map(|(index, op)| {
                let alias = alias_for(index);
                match data.get(&alias) {
                    Some(Some(_)) => MutationResult::ok(op.sub_record_id.clone()),
                    _ => MutationResult::error(
                        op.sub_record_id.clone(),
                        errors_by_alias
                            .get(&alias)
                            .cloned()
                            .unwrap_or_else(|| "no result returned".to_string()),
                    ),
                }
            })
            .collect())
    }
}

fn alias_for(index: usize) -> String {
    format!("op{index}")
}

/// Encode a string as a GraphQL string literal
fn literal(value: &str) -> String {
    // JSON string escaping is a subset of GraphQL string escaping
    serde_json::Value::String(value.to_string()).to_string()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn count_query(collection_id: &CollectionId) -> String {
    format!(
        "query {{ boards (ids: [{}]) {{ items_count }} }}",
        literal(collection_id.as_str())
    )
}

fn page_query(collection_id: &CollectionId, limit: u32, cursor: Option<&str>) -> String {
    let page_args = match cursor {
        Some(cursor) => format!("limit: {limit}, cursor: {}", literal(cursor)),
        None => format!("limit: {limit}"),
    };

    format!(
        "query {{ \
           complexity {{ before after query }} \
           boards (ids: [{}]) {{ \
             items_page ({page_args}) {{ \
               cursor \
               items {{ \
                 id name \
                 subitems {{ \
                   id \
                   board {{ id }} \
                   column_values {{ id type value column {{ title }} }} \
                 }} \
               }} \
             }} \
           }} \
         }}",
        literal(collection_id.as_str())
    )
}

fn mutation_document(operations: &[WriteDescriptor]) -> String {
    let body: Vec<String> = operations
        .iter()
        .enumerate()
        .map(|(index, op)| {
            format!(
                "{}: change_column_value(board_id: {}, item_id: {}, column_id: {}, value: {}) {{ id }}",
                alias_for(index),
                literal(op.collection_id.as_str()),
                literal(op.sub_record_id.as_str()),
                literal(op.target_column_id.as_str()),
                literal(&op.value),
            )
        })
        .collect();

    format!("mutation {{ {} }}", body.join(" "))
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
    #[serde(default)]
    error_message: Option<String>,
}

impl<T> GraphqlResponse<T> {
    fn error_summary(&self) -> Option<String> {
        if let Some(message) = &self.error_message {
            return Some(message.clone());
        }
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn errors_by_alias(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .filter_map(|e| {
                let alias = e.path.first()?.as_str()?.to_string();
                Some((alias, e.message.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CountData {
    boards: Vec<BoardCount>,
}

#[derive(Debug, Deserialize)]
struct BoardCount {
    items_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PageData {
    complexity: Option<Complexity>,
    boards: Vec<BoardPage>,
}

#[derive(Debug, Deserialize)]
struct Complexity {
    before: Option<i64>,
    after: Option<i64>,
    query: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BoardPage {
    items_page: WireItemsPage,
}

#[derive(Debug, Deserialize)]
struct WireItemsPage {
    cursor: Option<String>,
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: String,
    name: String,
    #[serde(default)]
    subitems: Option<Vec<WireSubitem>>,
}

impl WireItem {
    fn into_record(self) -> DuplicatorResult<Record> {
        let subrecords = self
            .subitems
            .unwrap_or_default()
            .into_iter()
            .map(WireSubitem::into_subrecord)
            .collect::<DuplicatorResult<Vec<_>>>()?;

        Ok(Record {
            id: ItemId::new(self.id),
            name: self.name,
            subrecords,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireSubitem {
    id: String,
    board: Option<WireBoardRef>,
    #[serde(default)]
    column_values: Vec<WireColumnValue>,
}

impl WireSubitem {
    fn into_subrecord(self) -> DuplicatorResult<SubRecord> {
        let board = self.board.ok_or_else(|| {
            DuplicatorError::remote_query(
                "page_items",
                format!("subitem {} has no owning board", self.id),
            )
        })?;

        Ok(SubRecord {
            id: ItemId::new(self.id),
            parent_collection_id: CollectionId::new(board.id),
            column_values: self
                .column_values
                .into_iter()
                .map(|cv| ColumnValue {
                    column_id: ColumnId::new(cv.id),
                    column_title: cv.column.map(|c| c.title).unwrap_or_default(),
                    column_type: cv.column_type,
                    raw_value: cv.value,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireBoardRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireColumnValue {
    id: String,
    #[serde(rename = "type")]
    column_type: String,
    value: Option<String>,
    column: Option<WireColumn>,
}

#[derive(Debug, Deserialize)]
struct WireColumn {
    title: String,
}

#[derive(Debug, Deserialize)]
struct MutatedItem {
    #[allow(dead_code)]
    id: Option<String>,
}
