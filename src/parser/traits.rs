use crate::data_models::Product;
use crate::parser::errors::ParserError;
use async_trait::async_trait;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use scraper::{ElementRef, Selector};
use std::time::Duration;

/// Anything that can list the products a storefront currently shows.
///
/// An empty listing is a valid answer, errors are reserved for transport or
/// parsing failures. Implementations do not retry.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Product>, ParserError>;
}

pub trait Parser {
    fn clean_data_point(input: ElementRef) -> String {
        let element = input.text().collect::<Vec<_>>().join(" ");
        element.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn create_client(timeout: Duration) -> Result<Client, ParserError> {
        Client::builder()
            .redirect(Policy::limited(30))
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0")
            .build()
            .map_err(ParserError::FailedClient)
    }

    fn selector(lookup: &str) -> Result<Selector, ParserError> {
        Selector::parse(lookup).map_err(|_| ParserError::CrawlerSelectorError(lookup.to_string()))
    }

    fn select_data_point(
        element: ElementRef,
        selector: &Selector,
        look_for_href: bool,
    ) -> Option<String> {
        let elem = element.select(selector).next()?;
        if look_for_href {
            return elem.attr("href").map(|href| href.trim().to_string());
        }
        Some(Self::clean_data_point(elem)).filter(|text| !text.is_empty())
    }
}
