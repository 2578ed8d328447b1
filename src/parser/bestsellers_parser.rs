use crate::configuration::CatalogSettings;
use crate::data_models::Product;
use crate::parser::errors::ParserError;
use crate::parser::traits::{CatalogSource, Parser};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::debug;
use url::Url;

struct Lookups {
    item: Selector,
    title: Selector,
    link: Selector,
}

/// Scrapes the first items of a storefront bestsellers page.
#[derive(Debug, Clone)]
pub struct BestsellersParser {
    rules: CatalogSettings,
    timeout: Duration,
}

impl Parser for BestsellersParser {}

impl BestsellersParser {
    pub fn new(rules: CatalogSettings, timeout: Duration) -> Self {
        Self { rules, timeout }
    }

    fn lookups(rules: &CatalogSettings) -> Result<Lookups, ParserError> {
        Ok(Lookups {
            item: Self::selector(&rules.item_lookup)?,
            title: Self::selector(&rules.title_lookup)?,
            link: Self::selector(&rules.link_lookup)?,
        })
    }

    pub fn parse_page(rules: &CatalogSettings, timeout: Duration) -> Result<Vec<Product>, ParserError> {
        let client = Self::create_client(timeout)?;
        let response_text = client.get(&rules.url).send()?.error_for_status()?.text()?;
        let document = Html::parse_document(&response_text);
        Self::parse_data(rules, &document)
    }

    fn parse_data(rules: &CatalogSettings, document: &Html) -> Result<Vec<Product>, ParserError> {
        let lookups = Self::lookups(rules)?;
        let base = Url::parse(&rules.base_url)?;
        let mut products = vec![];
        for item in document.select(&lookups.item).take(rules.max_products) {
            match Self::parse_product(rules, &lookups, &base, item) {
                Some(product) => products.push(product),
                None => debug!(store = %rules.store_name, "skipping item without title or link"),
            }
        }
        Ok(products)
    }

    fn parse_product(
        rules: &CatalogSettings,
        lookups: &Lookups,
        base: &Url,
        item: ElementRef,
    ) -> Option<Product> {
        let title = Self::select_data_point(item, &lookups.title, false)?;
        let href = Self::select_data_point(item, &lookups.link, true)?;
        let link = base.join(&href).ok()?;
        Some(Product::new(title, link.to_string(), rules.store_name.clone()))
    }
}

#[async_trait]
impl CatalogSource for BestsellersParser {
    fn name(&self) -> &str {
        &self.rules.store_name
    }

    async fn fetch(&self) -> Result<Vec<Product>, ParserError> {
        let rules = self.rules.clone();
        let timeout = self.timeout;
        let task: tokio::task::JoinHandle<Result<Vec<Product>, ParserError>> =
            spawn_blocking(move || Self::parse_page(&rules, timeout));
        task.await?
    }
}
