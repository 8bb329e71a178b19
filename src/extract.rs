//! HTML extraction for listing and detail pages.

use log::warn;
use scraper::{ElementRef, Html, Selector};

/// A partially-parsed listing card, prior to detail enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingStub {
    pub title: String,
    pub price_text: Option<String>,
    pub detail_href: Option<String>,
}

#[derive(Debug)]
pub struct ListingPage {
    pub stubs: Vec<ListingStub>,
    /// Cards seen on the page, including ones skipped for lacking a title.
    pub card_count: usize,
    pub has_next: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct DetailPage {
    pub metascore: Option<i64>,
    pub openscore: Option<i64>,
    /// Raw date-cell text from the discount history table, header excluded.
    pub raw_discount_dates: Vec<String>,
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse one listing page into item stubs and a pagination signal.
/// Cards without a title element are skipped, not fatal.
pub fn parse_listing_page(html: &str) -> ListingPage {
    let doc = Html::parse_document(html);
    let card_sel = Selector::parse(".list-view").unwrap();
    let title_sel = Selector::parse(".main-link h6").unwrap();
    let price_sel = Selector::parse("strong").unwrap();
    let link_sel = Selector::parse(".main-link").unwrap();

    let mut stubs = Vec::new();
    let mut card_count = 0;
    for card in doc.select(&card_sel) {
        card_count += 1;
        let Some(title_el) = card.select(&title_sel).next() else {
            warn!("skipping listing card: no title found");
            continue;
        };
        let title = element_text(title_el);
        let price_text = card.select(&price_sel).next().map(element_text);
        let detail_href = card
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::to_string);
        stubs.push(ListingStub {
            title,
            price_text,
            detail_href,
        });
    }

    ListingPage {
        stubs,
        card_count,
        has_next: has_next_page(&doc),
    }
}

/// Pagination continuation: an explicit rel="next" link wins; failing that,
/// the currently-active page indicator must have a following page sibling.
/// Neither signal means the crawl is done.
fn has_next_page(doc: &Html) -> bool {
    let rel_next_sel = Selector::parse(r#"a.page-link[rel="next"]"#).unwrap();
    if doc.select(&rel_next_sel).next().is_some() {
        return true;
    }

    let active_sel = Selector::parse("li.page-item.active").unwrap();
    let span_sel = Selector::parse("span.page-link").unwrap();
    let link_sel = Selector::parse("a.page-link").unwrap();
    for active in doc.select(&active_sel) {
        if active.select(&span_sel).next().is_none() {
            continue;
        }
        let next_li = active
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "li");
        return match next_li {
            Some(li) => li.select(&link_sel).next().is_some(),
            None => false,
        };
    }
    false
}

/// Parse one detail page into quality scores and raw discount dates.
pub fn parse_detail_page(html: &str) -> DetailPage {
    let doc = Html::parse_document(html);

    let mut page = DetailPage {
        metascore: labeled_score(&doc, "Metacritic"),
        openscore: labeled_score(&doc, "OpenCritic"),
        ..DetailPage::default()
    };

    let table_sel = Selector::parse(".price-history table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();
    match doc.select(&table_sel).next() {
        Some(table) => {
            for row in table.select(&row_sel).skip(1) {
                if let Some(cell) = row.select(&cell_sel).next() {
                    let text = element_text(cell);
                    if !text.is_empty() {
                        page.raw_discount_dates.push(text);
                    }
                }
            }
        }
        None => warn!("no price history table found"),
    }

    page
}

/// Value of the `<a>` adjacent to a `<strong>` label inside a list-group
/// entry. Present only when the text is a well-formed non-negative integer,
/// so a literal "0" stays zero and malformed text stays absent.
fn labeled_score(doc: &Html, label: &str) -> Option<i64> {
    let entry_sel = Selector::parse("li.list-group-item").unwrap();
    let strong_sel = Selector::parse("strong").unwrap();
    for entry in doc.select(&entry_sel) {
        let Some(strong) = entry.select(&strong_sel).next() else {
            continue;
        };
        if !element_text(strong).contains(label) {
            continue;
        }
        let link = strong
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a")?;
        let text = element_text(link);
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            return text.parse().ok();
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <div class="list-view">
          <a class="main-link" href="/items/hollow-knight"><h6>Hollow Knight</h6></a>
          <strong>$14.99</strong>
        </div>
        <div class="list-view">
          <a class="main-link" href="/items/untitled"></a>
          <strong>$9.99</strong>
        </div>
        <div class="list-view">
          <a class="main-link" href="/items/celeste"><h6>Celeste</h6></a>
        </div>
    "#;

    #[test]
    fn cards_without_titles_are_skipped() {
        let page = parse_listing_page(LISTING);
        assert_eq!(page.card_count, 3);
        assert_eq!(page.stubs.len(), 2);
        assert_eq!(page.stubs[0].title, "Hollow Knight");
        assert_eq!(page.stubs[0].price_text.as_deref(), Some("$14.99"));
        assert_eq!(
            page.stubs[0].detail_href.as_deref(),
            Some("/items/hollow-knight")
        );
        // Price is optional on the stub.
        assert_eq!(page.stubs[1].title, "Celeste");
        assert_eq!(page.stubs[1].price_text, None);
    }

    #[test]
    fn rel_next_link_signals_continuation() {
        let html = format!(r#"{LISTING}<a class="page-link" rel="next" href="?page=2">2</a>"#);
        assert!(parse_listing_page(&html).has_next);
    }

    #[test]
    fn active_page_with_following_sibling_signals_continuation() {
        let html = format!(
            r#"{LISTING}
            <ul class="pagination">
              <li class="page-item active"><span class="page-link">1</span></li>
              <li class="page-item"><a class="page-link" href="?page=2">2</a></li>
            </ul>"#
        );
        assert!(parse_listing_page(&html).has_next);
    }

    #[test]
    fn active_page_on_last_position_ends_the_crawl() {
        let html = format!(
            r#"{LISTING}
            <ul class="pagination">
              <li class="page-item"><a class="page-link" href="?page=1">1</a></li>
              <li class="page-item active"><span class="page-link">2</span></li>
            </ul>"#
        );
        assert!(!parse_listing_page(&html).has_next);
    }

    #[test]
    fn no_pagination_markup_ends_the_crawl() {
        assert!(!parse_listing_page(LISTING).has_next);
    }

    const DETAIL: &str = r##"
        <ul>
          <li class="list-group-item"><strong>Metacritic:</strong> <a href="#">87</a></li>
          <li class="list-group-item"><strong>OpenCritic:</strong> <a href="#">0</a></li>
        </ul>
        <div class="price-history">
          <table>
            <tr><th>Date</th><th>Price</th></tr>
            <tr><td>2024-03-10</td><td>$9.99</td></tr>
            <tr><td>2024-02-09</td><td>$12.99</td></tr>
          </table>
        </div>
    "##;

    #[test]
    fn detail_scores_and_history() {
        let page = parse_detail_page(DETAIL);
        assert_eq!(page.metascore, Some(87));
        assert_eq!(page.openscore, Some(0));
        assert_eq!(page.raw_discount_dates, vec!["2024-03-10", "2024-02-09"]);
    }

    #[test]
    fn zero_score_is_present() {
        // "0" is a real score; only non-digit text is absent.
        let page = parse_detail_page(DETAIL);
        assert_eq!(page.openscore, Some(0));
    }

    #[test]
    fn malformed_score_is_absent() {
        let html = r##"
            <li class="list-group-item"><strong>Metacritic:</strong> <a href="#">tbd</a></li>
            <li class="list-group-item"><strong>OpenCritic:</strong> <a href="#">-5</a></li>
        "##;
        let page = parse_detail_page(html);
        assert_eq!(page.metascore, None);
        assert_eq!(page.openscore, None);
    }

    #[test]
    fn missing_history_table_yields_no_dates() {
        let page = parse_detail_page("<p>no history here</p>");
        assert_eq!(page.metascore, None);
        assert!(page.raw_discount_dates.is_empty());
    }
}
