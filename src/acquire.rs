//! Acquisition orchestrator: three-tier lookup, then the live crawl.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use url::Url;

use crate::discount::discount_stats;
use crate::error::ScoutError;
use crate::extract::{parse_detail_page, parse_listing_page, ListingStub};
use crate::fetch::Fetcher;
use crate::html_cache::HtmlCache;
use crate::price::parse_price;
use crate::ratings::RatingResolver;
use crate::snapshot;
use crate::store::RecordStore;
use crate::types::ItemRecord;

/// One of the three ordered data sources consulted during acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Store,
    Snapshot,
    Scrape,
}

/// Tier selection as a pure function of the inputs that matter.
pub fn choose_tier(store_empty: bool, snapshot_valid: bool, force_refresh: bool) -> Tier {
    if force_refresh {
        Tier::Scrape
    } else if !store_empty {
        Tier::Store
    } else if snapshot_valid {
        Tier::Snapshot
    } else {
        Tier::Scrape
    }
}

/// Everything an acquisition run needs, owned in one place.
pub struct Acquisition {
    pub store: RecordStore,
    snapshot_path: PathBuf,
    fetcher: Fetcher,
    page_cache: HtmlCache,
    resolver: RatingResolver,
    /// Politeness pause between successive detail-page fetches.
    detail_delay: Duration,
}

impl Acquisition {
    pub fn new(
        store: RecordStore,
        snapshot_path: impl Into<PathBuf>,
        fetcher: Fetcher,
        page_cache: HtmlCache,
        resolver: RatingResolver,
        detail_delay: Duration,
    ) -> Self {
        Self {
            store,
            snapshot_path: snapshot_path.into(),
            fetcher,
            page_cache,
            resolver,
            detail_delay,
        }
    }

    /// Produce the working record set: store, then snapshot, then live
    /// scrape. A storage failure at any tier degrades to the next one.
    pub fn acquire(
        &self,
        base_url: &str,
        force_refresh: bool,
    ) -> Result<Vec<ItemRecord>, ScoutError> {
        let store_records = if force_refresh {
            Vec::new()
        } else {
            info!("attempting to load records from the database");
            self.store.load_all().unwrap_or_else(|e| {
                warn!("could not load from database: {e}");
                Vec::new()
            })
        };

        let snapshot_records = if force_refresh || !store_records.is_empty() {
            Vec::new()
        } else {
            info!("attempting to load records from the snapshot");
            snapshot::load(&self.snapshot_path).unwrap_or_else(|e| {
                info!("snapshot unavailable: {e}");
                Vec::new()
            })
        };

        match choose_tier(
            store_records.is_empty(),
            !snapshot_records.is_empty(),
            force_refresh,
        ) {
            Tier::Store => {
                info!("loaded {} records from the database", store_records.len());
                Ok(store_records)
            }
            Tier::Snapshot => {
                info!("loaded {} records from the snapshot", snapshot_records.len());
                Ok(snapshot_records)
            }
            Tier::Scrape => self.scrape(base_url),
        }
    }

    /// Crawl listing pages sequentially until the pagination signal or a
    /// page fetch gives out. Partial results are kept: a failed listing
    /// page ends the crawl, a failed item skips only that item.
    fn scrape(&self, base_url: &str) -> Result<Vec<ItemRecord>, ScoutError> {
        info!("fetching wishlist data from the web");
        let today = Local::now().date_naive();
        let mut items: Vec<ItemRecord> = Vec::new();
        let mut page = 1u32;

        loop {
            let url = if page == 1 {
                base_url.to_string()
            } else {
                format!("{base_url}?page={page}")
            };
            info!("fetching listing page {page}: {url}");
            let html = match self.fetcher.fetch(&url) {
                Ok(body) => {
                    self.page_cache.put(&url, &body);
                    body
                }
                Err(e) => {
                    error!("listing page {page} failed, stopping crawl: {e}");
                    break;
                }
            };

            let listing = parse_listing_page(&html);
            info!("found {} listing cards on page {page}", listing.card_count);
            if listing.card_count == 0 {
                info!("no more listing cards, stopping");
                break;
            }

            for stub in &listing.stubs {
                match self.store.exists(&stub.title) {
                    Ok(true) => {
                        info!("skipping {:?}: already in database", stub.title);
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => warn!("database lookup failed for {:?}: {e}", stub.title),
                }

                if let Some(record) = self.process_stub(base_url, stub, today) {
                    // Persist-then-append: each record is durable the moment
                    // it is complete, independent of the rest of the crawl.
                    if let Err(e) = self.store.upsert(&record) {
                        error!("failed to persist {:?}: {e}", record.title);
                    }
                    items.push(record);
                }
            }

            if !listing.has_next {
                info!("no next page link found, stopping");
                break;
            }
            page += 1;
        }

        if items.is_empty() {
            warn!("crawl produced no new records; returning current database contents");
            return self.store.load_all();
        }

        match snapshot::export(&self.snapshot_path, &items) {
            Ok(()) => info!("exported {} records to the snapshot", items.len()),
            Err(e) => error!("failed to export snapshot: {e}"),
        }
        Ok(items)
    }

    /// Enrich one listing stub into a complete record, or `None` if its
    /// detail page is unusable.
    fn process_stub(
        &self,
        base_url: &str,
        stub: &ListingStub,
        today: NaiveDate,
    ) -> Option<ItemRecord> {
        info!("processing {:?}", stub.title);

        let current_price = match &stub.price_text {
            Some(text) => parse_price(text),
            None => {
                warn!("no price found for {:?}", stub.title);
                0.0
            }
        };

        let Some(href) = &stub.detail_href else {
            warn!("no detail link for {:?}, skipping", stub.title);
            return None;
        };
        let Some(detail_url) = absolute_detail_url(base_url, href) else {
            warn!("unusable detail link {href:?} for {:?}, skipping", stub.title);
            return None;
        };

        thread::sleep(self.detail_delay);

        // Detail pages are cache-first even on a forced refresh.
        let detail_html = match self.page_cache.get(&detail_url) {
            Some(body) => body,
            None => match self.fetcher.fetch(&detail_url) {
                Ok(body) => {
                    self.page_cache.put(&detail_url, &body);
                    body
                }
                Err(e) => {
                    error!("detail fetch failed for {:?}: {e}", stub.title);
                    return None;
                }
            },
        };

        let detail = parse_detail_page(&detail_html);
        let steam_score = self.resolver.resolve(&self.fetcher, &stub.title);
        let stats = discount_stats(&detail.raw_discount_dates, today);

        Some(ItemRecord {
            title: stub.title.clone(),
            current_price,
            metascore: detail.metascore,
            openscore: detail.openscore,
            steam_score,
            last_discount: stats.last_discount.map(|d| d.format("%Y-%m-%d").to_string()),
            avg_days_between_discounts: stats.avg_days_between_discounts,
            days_since_last_discount: stats.days_since_last_discount,
        })
    }
}

/// Join a listing card's link target against the wishlist host.
fn absolute_detail_url(base_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_refresh_always_scrapes() {
        assert_eq!(choose_tier(false, true, true), Tier::Scrape);
        assert_eq!(choose_tier(true, true, true), Tier::Scrape);
        assert_eq!(choose_tier(true, false, true), Tier::Scrape);
    }

    #[test]
    fn populated_store_wins_without_refresh() {
        assert_eq!(choose_tier(false, true, false), Tier::Store);
        assert_eq!(choose_tier(false, false, false), Tier::Store);
    }

    #[test]
    fn empty_store_falls_back_to_snapshot_then_scrape() {
        assert_eq!(choose_tier(true, true, false), Tier::Snapshot);
        assert_eq!(choose_tier(true, false, false), Tier::Scrape);
    }

    #[test]
    fn detail_urls_resolve_against_the_wishlist_host() {
        assert_eq!(
            absolute_detail_url("https://deals.example.com/wishlist/abc", "/items/celeste")
                .as_deref(),
            Some("https://deals.example.com/items/celeste")
        );
        // Absolute links pass through untouched.
        assert_eq!(
            absolute_detail_url(
                "https://deals.example.com/wishlist/abc",
                "https://other.example.com/items/x"
            )
            .as_deref(),
            Some("https://other.example.com/items/x")
        );
        assert_eq!(
            absolute_detail_url("not a url", "/items/celeste"),
            None
        );
    }
}
