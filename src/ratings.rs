//! External rating lookup: title search, then the app's review percentage.
//!
//! Both steps are cached in their own namespace and every absence is
//! non-fatal: a missing result, element or attribute just yields `None`.

use log::{debug, info, warn};
use regex::Regex;
use scraper::{Html, Selector};

use crate::fetch::Fetcher;
use crate::html_cache::HtmlCache;

pub struct RatingResolver {
    base_url: String,
    cache: HtmlCache,
}

impl RatingResolver {
    pub fn new(base_url: impl Into<String>, cache: HtmlCache) -> Self {
        Self {
            base_url: base_url.into(),
            cache,
        }
    }

    /// Cache-first fetch within the ratings namespace. Network failures log
    /// and yield `None`.
    fn fetch_cached(&self, fetcher: &Fetcher, url: &str) -> Option<String> {
        if let Some(body) = self.cache.get(url) {
            return Some(body);
        }
        match fetcher.fetch(url) {
            Ok(body) => {
                self.cache.put(url, &body);
                Some(body)
            }
            Err(e) => {
                warn!("rating fetch failed: {e}");
                None
            }
        }
    }

    /// Resolve a title to its review percentage, or `None` at any step.
    pub fn resolve(&self, fetcher: &Fetcher, title: &str) -> Option<f64> {
        let app_id = self.search_app_id(fetcher, title)?;
        self.fetch_rating(fetcher, &app_id)
    }

    /// Step 1: keyword search, first matching result, identifier from its
    /// link target.
    fn search_app_id(&self, fetcher: &Fetcher, title: &str) -> Option<String> {
        let url = format!(
            "{}/search/?a=app&q={}",
            self.base_url,
            urlencoding::encode(title)
        );
        info!("searching ratings site for {title:?}");
        let body = self.fetch_cached(fetcher, &url)?;

        match app_id_from_search(&body) {
            Some(id) => {
                info!("found app id {id} for {title:?}");
                Some(id)
            }
            None => {
                warn!("no rating search results for {title:?} ({url})");
                debug!("search response body: {body}");
                None
            }
        }
    }

    /// Step 2: fetch the app page and extract the review percentage.
    fn fetch_rating(&self, fetcher: &Fetcher, app_id: &str) -> Option<f64> {
        let url = format!("{}/app/{}/", self.base_url, app_id);
        let body = self.fetch_cached(fetcher, &url)?;

        match rating_from_app_page(&body) {
            Some(score) => {
                info!("extracted rating {score} for app id {app_id}");
                Some(score)
            }
            None => {
                warn!("no review indicator on app page for {app_id} ({url})");
                debug!("app response body: {body}");
                None
            }
        }
    }
}

/// Identifier of the first search result: third path segment of the `.app a`
/// link target.
fn app_id_from_search(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let result_sel = Selector::parse(".app a").unwrap();
    let link = doc.select(&result_sel).next()?;
    let href = link.value().attr("href")?;
    href.split('/').nth(2).map(str::to_string)
}

/// Review percentage embedded in the reviews link's descriptive attribute.
fn rating_from_app_page(html: &str) -> Option<f64> {
    let doc = Html::parse_document(html);
    let review_sel = Selector::parse(r##"a[href*="#reviews"]"##).unwrap();
    let review = doc.select(&review_sel).next()?;
    let label = review.value().attr("aria-label")?;
    let percent = Regex::new(r"([\d.]+)%").unwrap();
    let caps = percent.captures(label)?;
    caps.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_from_first_search_result() {
        let html = r#"
            <table>
              <tr class="app"><td><a href="/app/367520/Hollow-Knight/">Hollow Knight</a></td></tr>
              <tr class="app"><td><a href="/app/999999/Other/">Other</a></td></tr>
            </table>
        "#;
        assert_eq!(app_id_from_search(html).as_deref(), Some("367520"));
    }

    #[test]
    fn no_search_result_is_absent() {
        assert_eq!(app_id_from_search("<p>No results</p>"), None);
    }

    #[test]
    fn rating_from_aria_label() {
        let html = r#"
            <a href="/app/367520/#reviews" aria-label="96.77% positive reviews">Reviews</a>
        "#;
        assert_eq!(rating_from_app_page(html), Some(96.77));
    }

    #[test]
    fn missing_aria_label_is_absent() {
        let html = r#"<a href="/app/367520/#reviews">Reviews</a>"#;
        assert_eq!(rating_from_app_page(html), None);
    }

    #[test]
    fn missing_review_link_is_absent() {
        assert_eq!(rating_from_app_page("<p>nothing here</p>"), None);
    }
}
