//! # Page Fetcher
//!
//! Walks a cursor-paginated collection. [`Paginator`] yields one page of
//! records per call until the remote store returns a null cursor;
//! [`PageFetcher::fetch_all`] drains it into the full working set.
//!
//! Any failed page call fails the whole fetch. There is no partial-result
//! mode, so a run never writes from an incomplete record set.

use futures::stream::{self, Stream};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::RecordStoreApi;
use crate::config::DuplicatorConfig;
use crate::error::{DuplicatorError, DuplicatorResult};
use crate::models::{CollectionId, Record};
use crate::orchestration::cancellation::CancellationFlag;

/// Lazy, restartable cursor walker over one collection
pub struct Paginator {
    api: Arc<dyn RecordStoreApi>,
    collection_id: CollectionId,
    limit: u32,
    max_pages: usize,
    cancellation: CancellationFlag,
    cursor: Option<String>,
    pages_fetched: usize,
    records_fetched: usize,
    exhausted: bool,
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("collection_id", &self.collection_id)
            .field("limit", &self.limit)
            .field("pages_fetched", &self.pages_fetched)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl Paginator {
    pub fn new(
        api: Arc<dyn RecordStoreApi>,
        collection_id: CollectionId,
        limit: u32,
        max_pages: usize,
    ) -> Self {
        Self {
            api,
            collection_id,
            limit,
            max_pages,
            cancellation: CancellationFlag::new(),
            cursor: None,
            pages_fetched: 0,
            records_fetched: 0,
            exhausted: false,
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Fetch the next page, or `None` once the final page has been returned
    pub async fn next_page(&mut self) -> DuplicatorResult<Option<Vec<Record>>> {
        if self.exhausted {
            return Ok(None);
        }
        if self.cancellation.is_cancelled() {
            return Err(DuplicatorError::cancelled("next page fetch"));
        }
        if self.pages_fetched >= self.max_pages {
            return Err(DuplicatorError::remote_query(
                "page_items",
                format!(
                    "collection {} still returned a cursor after {} pages",
                    self.collection_id, self.max_pages
                ),
            ));
        }

        let page = self
            .api
            .page_items(&self.collection_id, self.limit, self.cursor.as_deref())
            .await?;

        self.pages_fetched += 1;
        self.records_fetched += page.items.len();
        self.exhausted = page.is_last();
        self.cursor = page.next_cursor;

        info!(
            collection_id = %self.collection_id,
            page = self.pages_fetched,
            items = page.items.len(),
            has_more = !self.exhausted,
            "📄 PAGE_FETCH: Fetched page"
        );

        Ok(Some(page.items))
    }

    /// Forget the cursor so the next call starts again from the first page
    pub fn reset(&mut self) {
        self.cursor = None;
        self.pages_fetched = 0;
        self.records_fetched = 0;
        self.exhausted = false;
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn records_fetched(&self) -> usize {
        self.records_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Stream of pages ending after the final page or the first error
    pub fn into_stream(self) -> impl Stream<Item = DuplicatorResult<Vec<Record>>> {
        stream::try_unfold(self, |mut paginator| async move {
            let page = paginator.next_page().await?;
            Ok::<_, DuplicatorError>(page.map(|records| (records, paginator)))
        })
    }
}

/// Builds the complete record set of a collection
#[derive(Clone)]
pub struct PageFetcher {
    api: Arc<dyn RecordStoreApi>,
    page_limit: u32,
    max_pages: usize,
}

impl PageFetcher {
    pub fn new(api: Arc<dyn RecordStoreApi>, config: &DuplicatorConfig) -> Self {
        Self {
            api,
            page_limit: config.page_limit,
            max_pages: config.max_pages,
        }
    }

    pub fn paginator(&self, collection_id: &CollectionId) -> Paginator {
        Paginator::new(
            Arc::clone(&self.api),
            collection_id.clone(),
            self.page_limit,
            self.max_pages,
        )
    }

    /// Fetch every record of the collection in remote order
    ///
    /// The item count is queried first for diagnostics only; the loop is driven
    /// solely by the cursor.
    pub async fn fetch_all(
        &self,
        collection_id: &CollectionId,
        cancellation: &CancellationFlag,
    ) -> DuplicatorResult<Vec<Record>> {
        if cancellation.is_cancelled() {
            return Err(DuplicatorError::cancelled("item count query"));
        }
        let expected = self.api.count_items(collection_id).await?;
        info!(
            collection_id = %collection_id,
            expected_items = expected,
            "📊 PAGE_FETCH: Collection item count"
        );

        let mut paginator = self
            .paginator(collection_id)
            .with_cancellation(cancellation.clone());
        let mut records = Vec::new();
        while let Some(page) = paginator.next_page().await? {
            records.extend(page);
        }

        if records.len() as u64 != expected {
            warn!(
                collection_id = %collection_id,
                expected_items = expected,
                fetched_items = records.len(),
                "Fetched item count differs from reported count"
            );
        }
        debug!(
            collection_id = %collection_id,
            pages = paginator.pages_fetched(),
            "Pagination complete"
        );
        info!(
            collection_id = %collection_id,
            fetched_items = records.len(),
            "✅ PAGE_FETCH: Total items fetched"
        );

        Ok(records)
    }
}
