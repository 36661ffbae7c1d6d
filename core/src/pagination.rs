//! Bookmark pagination as a lazy stream.
//!
//! `MochiClient::paginate` fetches one page at a time and yields its items in
//! server order. The next page is requested only after the consumer has taken
//! every item of the current one, so dropping the stream early stops the
//! fetching. Iteration ends when a page has no bookmark, when a page is empty,
//! or when the server hands back the bookmark that was just sent.
//!
//! A failed page ends the stream with that error. Resuming is up to the
//! caller, from the last bookmark it saw.

use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::debug;

use crate::client::MochiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, Query, RequestBody};
use crate::types::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    At(String),
    Done,
}

impl Cursor {
    /// Where to go after a page fetched with `used`.
    fn advance(used: Option<&str>, returned: Option<String>, page_len: usize) -> Cursor {
        // An empty bookmark means no bookmark.
        match returned.filter(|b| !b.is_empty()) {
            None => Cursor::Done,
            Some(_) if page_len == 0 => Cursor::Done,
            Some(next) if Some(next.as_str()) == used => Cursor::Done,
            Some(next) => Cursor::At(next),
        }
    }
}

impl MochiClient {
    /// Stream every item of a list endpoint.
    ///
    /// `query` is sent with every page; its `bookmark` key is managed by the
    /// cursor and `limit`, when given, sets the page size.
    pub fn paginate<'a, T>(
        &'a self,
        path: &'a str,
        query: Query,
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<T, ApiError>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        let query = query.set_opt("limit", limit);
        let pages = stream::try_unfold(Cursor::Start, move |cursor| {
            let query = query.clone();
            async move {
                let bookmark = match cursor {
                    Cursor::Done => return Ok::<_, ApiError>(None),
                    Cursor::Start => None,
                    Cursor::At(bookmark) => {
                        sleep(self.config().page_delay).await;
                        Some(bookmark)
                    }
                };

                let query = query.set_opt("bookmark", bookmark.as_deref());
                let request = self.build_request(HttpMethod::Get, path, &query, RequestBody::Empty);
                let page: Page<T> = self.send(request).await?;
                debug!(
                    path,
                    bookmark = bookmark.as_deref().unwrap_or(""),
                    items = page.docs.len(),
                    "fetched page"
                );

                let next = Cursor::advance(bookmark.as_deref(), page.bookmark, page.docs.len());
                Ok(Some((page.docs, next)))
            }
        });

        pages
            .map_ok(|docs| stream::iter(docs.into_iter().map(Ok::<T, ApiError>)))
            .try_flatten()
    }
}
