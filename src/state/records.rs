/// Harvested data types
///
/// These are the values flowing between stages: categories from the catalog
/// index, product links from listing pages and product records from detail
/// pages.
use serde::Serialize;
use std::fmt;
use url::Url;

/// A catalog category as listed on the catalog index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name of the category
    pub name: String,

    /// Category path as found in the markup, usually site-relative
    pub relative_path: String,
}

impl Category {
    pub fn new(name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
        }
    }

    /// Resolves the category path against the storefront base URL
    pub fn url(&self, base_url: &Url) -> Result<Url, url::ParseError> {
        base_url.join(&self.relative_path)
    }
}

/// Absolute URL of one purchasable offer's detail page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductLink {
    pub absolute_url: String,
}

impl ProductLink {
    pub fn new(absolute_url: impl Into<String>) -> Self {
        Self {
            absolute_url: absolute_url.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.absolute_url
    }
}

impl fmt::Display for ProductLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute_url)
    }
}

/// Product links harvested from a single listing page, in page order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinkBatch {
    /// 1-based listing page number
    pub page: u32,

    pub links: Vec<ProductLink>,
}

impl PageLinkBatch {
    pub fn new(page: u32, links: Vec<ProductLink>) -> Self {
        Self { page, links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Structured fields extracted from one product detail page
///
/// `name` is always present and non-empty; `sku` and `price` are absent when
/// the page does not carry the corresponding markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "SKU")]
    pub sku: Option<String>,

    #[serde(rename = "Price")]
    pub price: Option<String>,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sku: None,
            price: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }
}
