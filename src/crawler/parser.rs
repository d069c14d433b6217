//! Page parsing for the storefront layout
//!
//! Parsing is pure and synchronous: raw page content plus the role the page
//! plays in the crawl go in, structured data comes out. The [`PageParser`]
//! trait is the seam for other site layouts; [`MarkupParser`] implements the
//! layout the harvester ships with.

use crate::state::{Category, ProductLink, ProductRecord};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Role a fetched page plays in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// The catalog root listing every category
    CatalogIndex,

    /// One paginated listing page of a category
    CategoryListing,

    /// The page of a single product offer
    ProductDetail,
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CatalogIndex => "catalog index",
            Self::CategoryListing => "category listing",
            Self::ProductDetail => "product detail",
        };
        f.write_str(name)
    }
}

/// A page lacked the structure its role requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {role} page: {cause}")]
pub struct ParseError {
    pub role: PageRole,
    pub cause: String,
}

impl ParseError {
    pub fn new(role: PageRole, cause: impl Into<String>) -> Self {
        Self {
            role,
            cause: cause.into(),
        }
    }
}

/// Content of one category listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Total number of listing pages in the category
    pub page_count: u32,

    /// Product links on this page; `None` when the page has no listing container
    pub links: Option<Vec<ProductLink>>,
}

/// Structured result of parsing one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPage {
    Categories(Vec<Category>),
    Listing(ListingPage),
    Product(ProductRecord),
}

/// Maps raw page content to structured data for one site layout
pub trait PageParser: Send + Sync {
    /// Parses `content` as a page playing `role`
    fn parse(&self, content: &str, role: PageRole) -> Result<ParsedPage, ParseError>;

    fn parse_catalog(&self, content: &str) -> Result<Vec<Category>, ParseError> {
        match self.parse(content, PageRole::CatalogIndex)? {
            ParsedPage::Categories(categories) => Ok(categories),
            other => Err(mismatch(PageRole::CatalogIndex, &other)),
        }
    }

    fn parse_listing(&self, content: &str) -> Result<ListingPage, ParseError> {
        match self.parse(content, PageRole::CategoryListing)? {
            ParsedPage::Listing(listing) => Ok(listing),
            other => Err(mismatch(PageRole::CategoryListing, &other)),
        }
    }

    fn parse_product(&self, content: &str) -> Result<ProductRecord, ParseError> {
        match self.parse(content, PageRole::ProductDetail)? {
            ParsedPage::Product(record) => Ok(record),
            other => Err(mismatch(PageRole::ProductDetail, &other)),
        }
    }
}

fn mismatch(role: PageRole, parsed: &ParsedPage) -> ParseError {
    let kind = match parsed {
        ParsedPage::Categories(_) => "categories",
        ParsedPage::Listing(_) => "a listing",
        ParsedPage::Product(_) => "a product",
    };
    ParseError::new(role, format!("parser produced {} instead", kind))
}

const CATEGORY_BLOCK: &str = "div.item_block";
const CATEGORY_LINK: &str = "td.section_info a";
const PAGINATION: &str = "div.module-pagination";
const PAGINATION_LINK: &str = "a.dark_link";
const LISTING_CONTAINER: &str = "div.bth-products-list-container";
const PRODUCT_CARD: &str = "section.bth-card-element";
const CARD_LINK: &str = "a.bth-card-img-link[href]";
const OFFER_ID: &str = "div.ixi_favorite[data-offer-id]";
const PRODUCT_NAME: &str = "h1";
const PRODUCT_SKU: &str = "[data-articule]";
const PRODUCT_PRICE: &str = r#"meta[itemprop="price"]"#;

/// Query parameter carrying the offer identifier on product links
pub const OFFER_PARAM: &str = "oid";

/// Parser for the storefront markup
///
/// # Markup
///
/// | Role | Element |
/// |------|---------|
/// | catalog index | `div.item_block` holding `td.section_info a` |
/// | listing | pagination in `div.module-pagination a.dark_link` (last = page count) |
/// | listing | cards `section.bth-card-element` in `div.bth-products-list-container` |
/// | listing | card link `a.bth-card-img-link`, offers `div.ixi_favorite[data-offer-id]` |
/// | detail | name in `h1`, SKU in `data-articule`, price in `meta[itemprop=price]` |
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::{MarkupParser, PageParser};
/// use url::Url;
///
/// let parser = MarkupParser::new(Url::parse("https://shop.example.com/").unwrap());
/// let record = parser.parse_product("<h1> Widget </h1>").unwrap();
/// assert_eq!(record.name, "Widget");
/// assert_eq!(record.sku, None);
/// ```
#[derive(Debug, Clone)]
pub struct MarkupParser {
    base_url: Url,
}

impl MarkupParser {
    /// Creates a parser resolving product links against `base_url`
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn parse_catalog_index(&self, document: &Html) -> Result<Vec<Category>, ParseError> {
        let role = PageRole::CatalogIndex;
        let block_selector = selector(CATEGORY_BLOCK, role)?;
        let link_selector = selector(CATEGORY_LINK, role)?;

        let mut categories = Vec::new();
        for block in document.select(&block_selector) {
            let Some(link) = block.select(&link_selector).next() else {
                tracing::debug!("Skipping category block without a section link");
                continue;
            };

            let name = element_text(&link);
            let href = link.value().attr("href").map(str::trim).unwrap_or("");
            if name.is_empty() || href.is_empty() {
                tracing::debug!("Skipping category block with empty name or link");
                continue;
            }

            categories.push(Category::new(name, href));
        }

        if categories.is_empty() {
            return Err(ParseError::new(role, "no category sections found"));
        }

        Ok(categories)
    }

    fn parse_category_listing(&self, document: &Html) -> Result<ListingPage, ParseError> {
        let page_count = self.page_count(document)?;
        let links = self.product_links(document)?;
        Ok(ListingPage { page_count, links })
    }

    /// Reads the page count from the last pagination link
    ///
    /// A listing without a pagination control has a single page.
    fn page_count(&self, document: &Html) -> Result<u32, ParseError> {
        let role = PageRole::CategoryListing;
        let pagination_selector = selector(PAGINATION, role)?;
        let link_selector = selector(PAGINATION_LINK, role)?;

        let Some(pagination) = document.select(&pagination_selector).next() else {
            return Ok(1);
        };

        let Some(last) = pagination.select(&link_selector).last() else {
            return Ok(1);
        };

        let text = element_text(&last);
        match text.parse::<u32>() {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(ParseError::new(
                role,
                format!("last pagination link '{}' is not a page number", text),
            )),
        }
    }

    /// Collects one link per offer on every card, deduplicated within the page
    fn product_links(&self, document: &Html) -> Result<Option<Vec<ProductLink>>, ParseError> {
        let role = PageRole::CategoryListing;
        let container_selector = selector(LISTING_CONTAINER, role)?;
        let card_selector = selector(PRODUCT_CARD, role)?;
        let card_link_selector = selector(CARD_LINK, role)?;
        let offer_selector = selector(OFFER_ID, role)?;

        let Some(container) = document.select(&container_selector).next() else {
            return Ok(None);
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for card in container.select(&card_selector) {
            let Some(href) = card
                .select(&card_link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
            else {
                tracing::debug!("Skipping product card without a link");
                continue;
            };

            for offer in card.select(&offer_selector) {
                let Some(offer_id) = offer
                    .value()
                    .attr("data-offer-id")
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                else {
                    continue;
                };

                match self.offer_url(href, offer_id) {
                    Some(url) => {
                        if seen.insert(url.clone()) {
                            links.push(ProductLink::new(url));
                        }
                    }
                    None => tracing::debug!("Could not resolve product link '{}'", href),
                }
            }
        }

        Ok(Some(links))
    }

    fn offer_url(&self, href: &str, offer_id: &str) -> Option<String> {
        let mut url = self.base_url.join(href).ok()?;
        url.query_pairs_mut().append_pair(OFFER_PARAM, offer_id);
        Some(url.to_string())
    }

    fn parse_product_detail(&self, document: &Html) -> Result<ProductRecord, ParseError> {
        let role = PageRole::ProductDetail;

        let name = document
            .select(&selector(PRODUCT_NAME, role)?)
            .next()
            .map(|h1| element_text(&h1))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseError::new(role, "no product name heading"))?;

        let sku = document
            .select(&selector(PRODUCT_SKU, role)?)
            .next()
            .and_then(|el| non_empty_attr(&el, "data-articule"));

        let price = document
            .select(&selector(PRODUCT_PRICE, role)?)
            .next()
            .and_then(|el| non_empty_attr(&el, "content"));

        Ok(ProductRecord { name, sku, price })
    }
}

impl PageParser for MarkupParser {
    fn parse(&self, content: &str, role: PageRole) -> Result<ParsedPage, ParseError> {
        let document = Html::parse_document(content);

        match role {
            PageRole::CatalogIndex => self
                .parse_catalog_index(&document)
                .map(ParsedPage::Categories),
            PageRole::CategoryListing => self
                .parse_category_listing(&document)
                .map(ParsedPage::Listing),
            PageRole::ProductDetail => self
                .parse_product_detail(&document)
                .map(ParsedPage::Product),
        }
    }
}

fn selector(css: &str, role: PageRole) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::new(role, format!("bad selector '{}': {:?}", css, e)))
}

/// Element text with surrounding whitespace trimmed
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
