use reqwest::Url;
use scraper::Html;

use crate::html::selector;
use crate::links::resolve_href;

const RESULT_LINK_SELECTOR: &str = "#searchResults h3 a";
const NEXT_PAGE_SELECTOR: &str = ".forward a";
const BASE_SELECTOR: &str = "head base[href]";

/// Links found on one page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub links: Vec<Url>,
    pub next_page: Option<Url>,
}

pub fn parse_list_page(html: &str, page_url: &Url) -> ListPage {
    let doc = Html::parse_document(html);
    extract_list_page(&doc, page_url)
}

/// Collect detail links (document order) and the "forward" link.
///
/// Missing containers are not an error: an unexpected page simply has no
/// links and no successor.
pub fn extract_list_page(doc: &Html, page_url: &Url) -> ListPage {
    let base = document_base(doc, page_url);

    let links = doc
        .select(&selector(RESULT_LINK_SELECTOR))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_href(&base, href))
        .collect();

    let next_page = doc
        .select(&selector(NEXT_PAGE_SELECTOR))
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_href(&base, href));

    ListPage { links, next_page }
}

fn document_base(doc: &Html, page_url: &Url) -> Url {
    doc.select(&selector(BASE_SELECTOR))
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve_href(page_url, href))
        .unwrap_or_else(|| page_url.clone())
}
