use anyhow::Result;
use politikdokumente_core::Speech;
use scraper::{ElementRef, Html};

use crate::date::normalize_date;
use crate::html::{selector, text_content};
use crate::links::canonical_link;

const TITLE_SELECTOR: &str = "#main h1";
const METADATA_SELECTOR: &str = "#main dl";
const ABSTRACT_SELECTOR: &str = "#main .abstract";
const PARAGRAPHS_AFTER_ABSTRACT: &str = "#main .abstract ~ p:not(.picture)";
const BODY_PARAGRAPHS: &str = "#main .basepage_pages > p:not(.picture)";

const DATE_LABEL: &str = "Datum";
const PLACE_LABEL: &str = "Ort";

pub fn parse_detail_page(html: &str, source_url: &str) -> Result<Speech> {
    let doc = Html::parse_document(html);
    extract_detail_page(&doc, source_url)
}

/// Build a `Speech` from one detail page.
///
/// Every field except the title is best effort. A page without a title is
/// rejected.
pub fn extract_detail_page(doc: &Html, source_url: &str) -> Result<Speech> {
    let link = canonical_link(source_url);

    let title = doc
        .select(&selector(TITLE_SELECTOR))
        .next()
        .map(|h1| text_content(h1).trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow::anyhow!("speech page {} has no title", link))?;

    let mut speech = Speech::new(link, title);
    apply_metadata(doc, &mut speech);

    let summary = doc
        .select(&selector(ABSTRACT_SELECTOR))
        .next()
        .map(|el| text_content(el).trim().to_string());

    let paragraphs = if summary.is_some() {
        PARAGRAPHS_AFTER_ABSTRACT
    } else {
        BODY_PARAGRAPHS
    };
    speech.text = join_paragraphs(doc.select(&selector(paragraphs)));
    speech.summary = summary;

    tracing::debug!(
        link = %speech.link,
        date = ?speech.date,
        has_abstract = speech.summary.is_some(),
        chars = speech.text.len(),
        "extracted speech"
    );
    Ok(speech)
}

/// Date and place live in `dt`/`dd` pairs of the first definition list.
fn apply_metadata(doc: &Html, speech: &mut Speech) {
    let Some(dl) = doc.select(&selector(METADATA_SELECTOR)).next() else {
        return;
    };

    let (dt, dd) = (selector("dt"), selector("dd"));
    for (key, value) in dl.select(&dt).zip(dl.select(&dd)) {
        let label = text_content(key);
        match label.trim().trim_end_matches(':') {
            DATE_LABEL => speech.date = normalize_date(&text_content(value)),
            PLACE_LABEL => speech.place = Some(text_content(value)),
            _ => {}
        }
    }
}

fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> String {
    paragraphs
        .map(text_content)
        .collect::<Vec<_>>()
        .join("\n\n")
}
