//! Search page: debounced title search.

use std::rc::Rc;
use std::time::Duration;

use crate::core::clock::Timer;
use crate::core::search::SearchDebouncer;
use crate::models::Item;
use crate::services::api::ApiClient;

/// Debounced search over `GET /content/search`.
pub type SearchView = SearchDebouncer<Item>;

/// Build the search page state.
#[must_use]
pub fn search_view(api: &ApiClient, timer: Rc<dyn Timer>, quiet: Duration, page_size: u32) -> SearchView {
    let api = api.clone();
    SearchDebouncer::new(timer, quiet, page_size, move |title: String, page| {
        let api = api.clone();
        async move {
            api.search(&title, page)
                .await
                .map(|page| page.map(Item::Content))
        }
    })
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;
    use crate::core::feed::FeedError;
    use crate::core::search::SearchOutcome;
    use crate::services::transport::Method;
    use crate::testing::{FakeTransport, TokioTimer, content_json, page_json};

    #[tokio::test(start_paused = true)]
    async fn typing_burst_issues_one_search_request() -> Result<(), FeedError> {
        let transport = FakeTransport::new();
        transport.respond(
            Method::Get,
            "/content/search",
            200,
            page_json(vec![content_json("Abc")], 0, 1, 12),
        );
        let view = search_view(
            &ApiClient::new(transport.clone()),
            Rc::new(TokioTimer),
            Duration::from_millis(500),
            12,
        );

        let (_, _, last) = futures_util::join!(
            view.input("a"),
            async {
                sleep(Duration::from_millis(150)).await;
                view.input("ab").await
            },
            async {
                sleep(Duration::from_millis(300)).await;
                view.input("abc").await
            },
        );

        assert!(matches!(last?, SearchOutcome::Searched(_)));
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].path, "/content/search");
        assert_eq!(sent[0].query[0], ("title".to_string(), "abc".to_string()));
        assert_eq!(view.feed().state().items.len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_box_makes_no_request() -> Result<(), FeedError> {
        let transport = FakeTransport::new();
        let view = search_view(
            &ApiClient::new(transport.clone()),
            Rc::new(TokioTimer),
            Duration::from_millis(500),
            12,
        );

        assert_eq!(view.input("").await?, SearchOutcome::Cleared);

        assert!(transport.requests().is_empty());
        Ok(())
    }
}
