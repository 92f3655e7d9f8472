//! One extraction session over one document

use scraper::Html;
use tracing::{debug, warn};

use super::extractors::Extractor;
use super::region_tracker::{RegionSignal, RegionTracker};
use super::tag_events::{DocumentEvents, TagEvent};
use super::ExtractionStrategy;
use crate::domain::{ExtractionMode, ExtractionResult, Record, ScrapeConfig};

/// Feeds one event stream through a fresh region tracker and extractor
#[derive(Debug, Clone, Copy)]
pub struct SessionRunner {
    mode: ExtractionMode,
}

impl SessionRunner {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    /// Run to exhaustion or until the container closes.
    ///
    /// An absent config, or one built for the other mode, yields an empty
    /// result without pulling a single event.
    pub fn run<'a, I>(&self, events: I, config: Option<&ScrapeConfig>) -> ExtractionResult
    where
        I: IntoIterator<Item = TagEvent<'a>>,
    {
        let Some(config) = config else {
            debug!("No scrape config, skipping session");
            return ExtractionResult::empty(self.mode);
        };
        if config.mode() != self.mode {
            warn!(
                "Scrape config is for {:?} extraction but session runs {:?}, skipping",
                config.mode(),
                self.mode
            );
            return ExtractionResult::empty(self.mode);
        }

        let mut tracker = RegionTracker::new(&config.layout, Extractor::for_target(&config.target));
        let mut consumed = 0usize;

        for event in events {
            consumed += 1;
            match event {
                TagEvent::Start { name, attrs } => tracker.on_start_tag(name, &attrs),
                TagEvent::Text(content) => tracker.on_text(content),
                TagEvent::End { name } => {
                    if tracker.on_end_tag(name) == RegionSignal::Abort {
                        debug!("Container closed after {} events, rest of document skipped", consumed);
                        break;
                    }
                }
            }
        }

        let result = tracker.into_strategy().finish();
        debug!("Session produced {} items from {} events", result.len(), consumed);
        result
    }
}

fn run_document(html: &str, mode: ExtractionMode, config: Option<&ScrapeConfig>) -> ExtractionResult {
    if config.is_none() {
        return ExtractionResult::empty(mode);
    }
    let document = Html::parse_document(html);
    SessionRunner::new(mode).run(DocumentEvents::new(&document), config)
}

/// URLs found in the innermost region of `html`
pub fn collect_urls(html: &str, config: Option<&ScrapeConfig>) -> Vec<String> {
    run_document(html, ExtractionMode::Urls, config)
        .into_urls()
        .unwrap_or_default()
}

/// One record per record region of `html`
pub fn collect_records(html: &str, config: Option<&ScrapeConfig>) -> Vec<Record> {
    run_document(html, ExtractionMode::Fields, config)
        .into_records()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldSpec, FieldSpecs, RegionLayout, RegionMatcher, UrlSpec};
    use std::cell::Cell;

    /// Event source test double counting how many events were pulled
    struct CountingEvents<'e, 'a> {
        events: std::vec::IntoIter<TagEvent<'a>>,
        pulled: &'e Cell<usize>,
    }

    impl<'e, 'a> CountingEvents<'e, 'a> {
        fn new(events: Vec<TagEvent<'a>>, pulled: &'e Cell<usize>) -> Self {
            Self {
                events: events.into_iter(),
                pulled,
            }
        }
    }

    impl<'a> Iterator for CountingEvents<'_, 'a> {
        type Item = TagEvent<'a>;

        fn next(&mut self) -> Option<Self::Item> {
            let event = self.events.next()?;
            self.pulled.set(self.pulled.get() + 1);
            Some(event)
        }
    }

    fn item_layout() -> RegionLayout {
        RegionLayout::new(RegionMatcher::new("div").with_attr("class", "list"))
            .with_sub_container(RegionMatcher::new("div").with_attr("class", "item"))
    }

    fn price_config() -> ScrapeConfig {
        ScrapeConfig::fields(
            item_layout(),
            FieldSpecs::new().with_field("price", FieldSpec::new("span", "class", "price")),
        )
    }

    fn product_link_config() -> ScrapeConfig {
        ScrapeConfig::urls(
            item_layout(),
            UrlSpec::new("a", "href")
                .with_filter("class", "item-link")
                .with_pattern("/product/"),
        )
    }

    #[test]
    fn url_mode_collects_matching_links_per_item() {
        let html = r#"<html><body>
            <div class="list">
              <div class="item">
                <a class="item-link" href="/product/1">one</a>
                <a class="item-link" href="/other">other</a>
              </div>
              <div class="item">
                <a class="item-link" href="/product/1">again</a>
                <a class="item-link" href="/other">other</a>
              </div>
            </div>
        </body></html>"#;

        let urls = collect_urls(html, Some(&product_link_config()));

        assert_eq!(urls, vec!["/product/1", "/product/1"]);
    }

    #[test]
    fn field_mode_emits_one_record_per_item() {
        let html = r#"<html><body>
            <div class="list">
              <div class="item"><span class="price">9.99</span></div>
              <div class="item"><span class="name">No price</span></div>
            </div>
        </body></html>"#;

        let records = collect_records(html, Some(&price_config()));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("price"), Some("9.99"));
        assert_eq!(records[1].get("price"), Some(""));
    }

    #[test]
    fn void_element_between_field_tag_and_text_keeps_capture() {
        let html = r#"<html><body>
            <div class="list">
              <div class="item"><span class="price"><img src="eur.png">12.00</span></div>
              <div class="item"><span class="price"><br>7.00</span><input type="hidden" value="x"></div>
            </div>
        </body></html>"#;

        let records = collect_records(html, Some(&price_config()));

        let prices: Vec<_> = records.iter().filter_map(|r| r.get("price")).collect();
        assert_eq!(prices, vec!["12.00", "7.00"]);
    }

    #[test]
    fn nested_same_name_tags_do_not_close_regions_early() {
        let html = r#"<html><body>
            <div class="list">
              <div class="item">
                <div><div><span class="price">1.50</span></div></div>
              </div>
              <div class="item"><div><span class="price">2.50</span></div></div>
            </div>
            <div class="item"><span class="price">outside</span></div>
        </body></html>"#;

        let records = collect_records(html, Some(&price_config()));

        let prices: Vec<_> = records.iter().filter_map(|r| r.get("price")).collect();
        assert_eq!(prices, vec!["1.50", "2.50"]);
    }

    #[test]
    fn container_without_sub_container_is_one_record() {
        let config = ScrapeConfig::fields(
            RegionLayout::new(RegionMatcher::new("section").with_attr("id", "detail")),
            FieldSpecs::new()
                .with_field("name", FieldSpec::new("h1", "class", "title"))
                .with_field("price", FieldSpec::new("span", "class", "price")),
        );
        let html = r#"<html><body><section id="detail">
            <h1 class="title"> Widget </h1>
            <section><span class="price">4.20</span></section>
        </section></body></html>"#;

        let records = collect_records(html, Some(&config));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some("Widget"));
        assert_eq!(records[0].get("price"), Some("4.20"));
    }

    #[test]
    fn abort_stops_pulling_events() {
        let config = ScrapeConfig::urls(
            RegionLayout::new(RegionMatcher::new("ul").with_attr("id", "nav")),
            UrlSpec::new("a", "href"),
        );
        let events = vec![
            TagEvent::start("ul", &[("id", "nav")]),
            TagEvent::start("a", &[("href", "/first")]),
            TagEvent::end("a"),
            TagEvent::end("ul"),
            TagEvent::start("ul", &[("id", "nav")]),
            TagEvent::start("a", &[("href", "/never")]),
            TagEvent::end("a"),
            TagEvent::end("ul"),
        ];
        let pulled = Cell::new(0);

        let result = SessionRunner::new(ExtractionMode::Urls)
            .run(CountingEvents::new(events, &pulled), Some(&config));

        assert_eq!(result, ExtractionResult::Urls(vec!["/first".into()]));
        assert_eq!(pulled.get(), 4);
    }

    #[test]
    fn absent_config_consumes_nothing() {
        for mode in [ExtractionMode::Urls, ExtractionMode::Fields] {
            let pulled = Cell::new(0);
            let events = vec![TagEvent::start("div", &[]), TagEvent::end("div")];

            let result = SessionRunner::new(mode).run(CountingEvents::new(events, &pulled), None);

            assert!(result.is_empty());
            assert_eq!(result.mode(), mode);
            assert_eq!(pulled.get(), 0);
        }
        assert!(collect_urls("<a href='/x'></a>", None).is_empty());
        assert!(collect_records("<p>x</p>", None).is_empty());
    }

    #[test]
    fn config_for_the_other_mode_is_treated_as_absent() {
        let pulled = Cell::new(0);
        let events = vec![TagEvent::start("div", &[("class", "list")])];

        let result = SessionRunner::new(ExtractionMode::Fields)
            .run(CountingEvents::new(events, &pulled), Some(&product_link_config()));

        assert_eq!(result, ExtractionResult::Records(vec![]));
        assert_eq!(pulled.get(), 0);
    }
}
