//! Shared test doubles for the pipeline stages

use crate::crawler::{FetchFailure, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
    Transport,
    FailThenBody { failures_left: u32, body: String },
}

/// In-memory fetcher serving canned replies per URL
///
/// Unknown URLs answer with HTTP 404. Every call is counted.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: &str) {
        self.set(url, Reply::Body(body.to_string()));
    }

    pub fn fail_status(&self, url: &str, status: u16) {
        self.set(url, Reply::Status(status));
    }

    pub fn fail_transport(&self, url: &str) {
        self.set(url, Reply::Transport);
    }

    pub fn fail_then_serve(&self, url: &str, failures: u32, body: &str) {
        self.set(
            url,
            Reply::FailThenBody {
                failures_left: failures,
                body: body.to_string(),
            },
        );
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn set(&self, url: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        self.calls.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(FetchFailure::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(Reply::Transport) => Err(FetchFailure::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
            Some(Reply::FailThenBody {
                failures_left,
                body,
            }) => {
                if *failures_left > 0 {
                    *failures_left -= 1;
                    Err(FetchFailure::Status {
                        url: url.to_string(),
                        status: 503,
                    })
                } else {
                    Ok(body.clone())
                }
            }
            None => Err(FetchFailure::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Catalog index markup with one block per `(name, href)` pair
pub fn catalog_html(categories: &[(&str, &str)]) -> String {
    let blocks: String = categories
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<div class="item_block col-md-6 col-sm-6"><table><tr>
                <td class="section_info"><a href="{}"> {} </a></td>
                </tr></table></div>"#,
                href, name
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", blocks)
}

/// Listing page markup: pagination up to `total_pages`, one card per `(href, offers)`
pub fn listing_html(total_pages: u32, cards: &[(&str, &[&str])]) -> String {
    let pagination: String = (1..=total_pages)
        .map(|n| format!(r#"<a class="dark_link" href="?PAGEN_1={n}">{n}</a>"#))
        .collect();
    let cards: String = cards
        .iter()
        .map(|(href, offers)| {
            let favorites: String = offers
                .iter()
                .map(|id| format!(r#"<div class="ixi_favorite" data-offer-id="{}"></div>"#, id))
                .collect();
            format!(
                r#"<section class="bth-card-element">
                <a class="bth-card-img-link" href="{}"><img src="x.jpg"></a>{}
                </section>"#,
                href, favorites
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <div class="bth-products-list-container">{}</div>
        <div class="module-pagination">{}</div>
        </body></html>"#,
        cards, pagination
    )
}

/// Detail page markup; `None` fields are left out of the page
pub fn detail_html(name: Option<&str>, sku: Option<&str>, price: Option<&str>) -> String {
    let name = name.map(|n| format!("<h1>{}</h1>", n)).unwrap_or_default();
    let sku = sku
        .map(|s| format!(r#"<div class="article" data-articule="{}"></div>"#, s))
        .unwrap_or_default();
    let price = price
        .map(|p| format!(r#"<meta itemprop="price" content="{}">"#, p))
        .unwrap_or_default();
    format!(
        "<html><head></head><body>{}{}<div class=\"offer\">{}</div></body></html>",
        name, sku, price
    )
}
