//! Page orchestration: main categories, sub-categories, product pages
//!
//! Pages are fetched and scraped strictly one after another. Rows are appended
//! in the nested visiting order, so the resulting table is deterministic for a
//! fixed set of pages.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::dto::ProductTable;
use crate::domain::{PageSource, Record, ScrapeConfig, ScrapeTarget};
use crate::infrastructure::config::{ConfigProvider, CrawlPlan, keys};
use crate::infrastructure::parsing;

/// Scrape configurations for the three page levels; `None` means the section
/// was missing or unusable
#[derive(Debug, Clone, Default)]
pub struct ScrapeSections {
    pub main_urls: Option<ScrapeConfig>,
    pub sub_urls: Option<ScrapeConfig>,
    pub products: Option<ScrapeConfig>,
}

impl ScrapeSections {
    pub fn from_provider(provider: &ConfigProvider) -> Self {
        Self {
            main_urls: provider.scrape_config(keys::MAIN_URLS_TO_SCRAP),
            sub_urls: provider.scrape_config(keys::PRODUCT_SUB_URLS_TO_SCRAP),
            products: provider.scrape_config(keys::PRODUCT_SCRAPING),
        }
    }

    /// Configured product field names, in record order
    pub fn field_names(&self) -> Vec<&str> {
        match self.products.as_ref().map(|config| &config.target) {
            Some(ScrapeTarget::Fields(specs)) => specs.names().collect(),
            _ => Vec::new(),
        }
    }
}

/// Category label from one `/`-separated URL segment: the text after its
/// first `-`, or the whole segment when it has none.
///
/// A URL with too few segments yields an empty label.
pub fn category_label(url: &str, segment: usize) -> String {
    match url.split('/').nth(segment) {
        Some(part) => part.split_once('-').map_or(part, |(_, rest)| rest).to_string(),
        None => {
            warn!("URL '{}' has no segment {} for a category label", url, segment);
            String::new()
        }
    }
}

pub struct PageOrchestrator<S: PageSource> {
    source: S,
    plan: CrawlPlan,
    sections: ScrapeSections,
}

impl<S: PageSource> PageOrchestrator<S> {
    /// Segment of a main-category URL holding the main category
    pub const MAIN_CATEG_SEGMENT: usize = 2;
    /// Segment of a sub-category URL holding the sub-category
    pub const SUB_CATEG_SEGMENT: usize = 3;

    pub fn new(source: S, plan: CrawlPlan, sections: ScrapeSections) -> Self {
        Self {
            source,
            plan,
            sections,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Visit every configured page and collect the products into one table.
    ///
    /// Any fetch failure aborts the run.
    pub async fn run(&self) -> Result<ProductTable> {
        let mut table = ProductTable::with_category_columns(self.sections.field_names());

        if !self.plan.main_url_collection_needed {
            info!("Main URL collection disabled, nothing to scrape");
            return Ok(table);
        }

        let main_urls = self
            .collect_urls(&self.plan.main_source_url, self.sections.main_urls.as_ref())
            .await?;
        info!("Collected {} main category URLs", main_urls.len());

        if !self.plan.product_sub_url_coll_needed {
            info!("Sub-category collection disabled, stopping after main categories");
            return Ok(table);
        }

        for main_url in &main_urls {
            let main_categ = category_label(main_url, Self::MAIN_CATEG_SEGMENT);
            let sub_urls = self
                .collect_urls(&self.absolute(main_url), self.sections.sub_urls.as_ref())
                .await?;
            info!("Category '{}': {} sub-category URLs", main_categ, sub_urls.len());

            for sub_url in &sub_urls {
                let sub_categ = category_label(sub_url, Self::SUB_CATEG_SEGMENT);
                let records = self
                    .collect_records(&self.absolute(sub_url), self.sections.products.as_ref())
                    .await?;
                info!(
                    "Category '{}' / '{}': {} products",
                    main_categ,
                    sub_categ,
                    records.len()
                );

                for record in &records {
                    table.push_record(&main_categ, &sub_categ, record);
                }
            }
        }

        info!("Scraped {} products in total", table.len());
        Ok(table)
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.plan.sub_source_url_beginning, path)
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.source
            .fetch_page(url)
            .await
            .with_context(|| format!("Failed to fetch {}", url))
    }

    // An absent config skips the page without fetching it.
    async fn collect_urls(&self, url: &str, config: Option<&ScrapeConfig>) -> Result<Vec<String>> {
        if config.is_none() {
            debug!("No URL config, skipping {}", url);
            return Ok(Vec::new());
        }
        let html = self.fetch(url).await?;
        Ok(parsing::collect_urls(&html, config))
    }

    async fn collect_records(&self, url: &str, config: Option<&ScrapeConfig>) -> Result<Vec<Record>> {
        if config.is_none() {
            debug!("No product config, skipping {}", url);
            return Ok(Vec::new());
        }
        let html = self.fetch(url).await?;
        Ok(parsing::collect_records(&html, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldSpec, FieldSpecs, RegionLayout, RegionMatcher, UrlSpec};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory pages, recording every URL requested
    #[derive(Default)]
    struct FakePages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl FakePages {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for FakePages {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("404 for {}", url))
        }
    }

    const BASE: &str = "https://shop.example";

    fn plan() -> CrawlPlan {
        CrawlPlan {
            main_url_collection_needed: true,
            main_source_url: format!("{}/", BASE),
            product_sub_url_coll_needed: true,
            sub_source_url_beginning: BASE.to_string(),
        }
    }

    fn sections() -> ScrapeSections {
        ScrapeSections {
            main_urls: Some(ScrapeConfig::urls(
                RegionLayout::new(RegionMatcher::new("ul").with_attr("class", "categories")),
                UrlSpec::new("a", "href"),
            )),
            sub_urls: Some(ScrapeConfig::urls(
                RegionLayout::new(RegionMatcher::new("div").with_attr("id", "subs"))
                    .with_sub_container(RegionMatcher::new("li")),
                UrlSpec::new("a", "href").with_pattern("/c/"),
            )),
            products: Some(ScrapeConfig::fields(
                RegionLayout::new(RegionMatcher::new("div").with_attr("class", "list"))
                    .with_sub_container(RegionMatcher::new("div").with_attr("class", "item")),
                FieldSpecs::new()
                    .with_field("name", FieldSpec::new("h2", "class", "title"))
                    .with_field("price", FieldSpec::new("span", "class", "price")),
            )),
        }
    }

    fn shop() -> FakePages {
        FakePages::default()
            .with_page(
                "https://shop.example/",
                r#"<ul class="categories"><li><a href="/c/1-tools">Tools</a></li><li><a href="/c/2-garden">Garden</a></li></ul>"#,
            )
            .with_page(
                "https://shop.example/c/1-tools",
                r#"<div id="subs"><ul><li><a href="/c/1-tools/10-hammers">Hammers</a></li><li><a href="/about">About</a></li></ul></div>"#,
            )
            .with_page(
                "https://shop.example/c/2-garden",
                r#"<div id="subs"><ul><li><a href="/c/2-garden/20-hoses">Hoses</a></li></ul></div>"#,
            )
            .with_page(
                "https://shop.example/c/1-tools/10-hammers",
                r#"<div class="list">
                     <div class="item"><h2 class="title">Claw</h2><span class="price">12.00</span></div>
                     <div class="item"><h2 class="title">Mallet</h2></div>
                   </div>"#,
            )
            .with_page(
                "https://shop.example/c/2-garden/20-hoses",
                r#"<div class="list"><div class="item"><h2 class="title">Hose</h2><span class="price">30.00</span></div></div>"#,
            )
    }

    #[rstest]
    #[case("/c/1-tools", 2, "tools")]
    #[case("/c/12-home-garden", 2, "home-garden")]
    #[case("/c/plain", 2, "plain")]
    #[case("/c/1-tools/s/10-hammers", 3, "s")]
    #[case("/c/1-tools/10-hammers", 3, "hammers")]
    #[case("/c", 2, "")]
    fn category_labels(#[case] url: &str, #[case] segment: usize, #[case] expected: &str) {
        assert_eq!(category_label(url, segment), expected);
    }

    #[tokio::test]
    async fn visits_pages_in_nested_order() {
        let orchestrator = PageOrchestrator::new(shop(), plan(), sections());

        let table = orchestrator.run().await.unwrap();

        assert_eq!(table.columns(), ["main_categ", "sub_categ", "name", "price"]);
        assert_eq!(
            table.rows(),
            [
                vec!["tools", "hammers", "Claw", "12.00"],
                vec!["tools", "hammers", "Mallet", ""],
                vec!["garden", "hoses", "Hose", "30.00"],
            ]
        );
        assert_eq!(
            orchestrator.source().requested(),
            vec![
                "https://shop.example/",
                "https://shop.example/c/1-tools",
                "https://shop.example/c/1-tools/10-hammers",
                "https://shop.example/c/2-garden",
                "https://shop.example/c/2-garden/20-hoses",
            ]
        );
    }

    #[tokio::test]
    async fn disabled_main_collection_fetches_nothing() {
        let plan = CrawlPlan {
            main_url_collection_needed: false,
            ..plan()
        };
        let orchestrator = PageOrchestrator::new(shop(), plan, sections());

        let table = orchestrator.run().await.unwrap();

        assert!(table.is_empty());
        assert!(orchestrator.source().requested().is_empty());
    }

    #[tokio::test]
    async fn disabled_sub_collection_stops_after_main_page() {
        let plan = CrawlPlan {
            product_sub_url_coll_needed: false,
            ..plan()
        };
        let orchestrator = PageOrchestrator::new(shop(), plan, sections());

        assert!(orchestrator.run().await.unwrap().is_empty());
        assert_eq!(orchestrator.source().requested(), vec!["https://shop.example/"]);
    }

    #[tokio::test]
    async fn missing_product_section_skips_product_pages() {
        let sections = ScrapeSections {
            products: None,
            ..sections()
        };
        let orchestrator = PageOrchestrator::new(shop(), plan(), sections);

        let table = orchestrator.run().await.unwrap();

        assert_eq!(table.columns(), ["main_categ", "sub_categ"]);
        assert!(table.is_empty());
        assert_eq!(
            orchestrator.source().requested(),
            vec![
                "https://shop.example/",
                "https://shop.example/c/1-tools",
                "https://shop.example/c/2-garden",
            ]
        );
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let pages = FakePages::default().with_page(
            "https://shop.example/",
            r#"<ul class="categories"><li><a href="/c/9-gone">Gone</a></li></ul>"#,
        );
        let orchestrator = PageOrchestrator::new(pages, plan(), sections());

        let err = orchestrator.run().await.unwrap_err();

        assert!(format!("{:#}", err).contains("https://shop.example/c/9-gone"));
    }
}
