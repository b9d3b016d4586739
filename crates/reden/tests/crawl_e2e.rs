use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use reden::{write_csv, CrawlConfig, Crawler, PageFetcher};
use reqwest::Url;

const START: &str = "https://www.bundesregierung.de/suche?page=1";

/// Serves canned pages and remembers the order in which they were requested.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeSite {
    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} returned HTTP 404 Not Found", url))
    }
}

fn list_page(links: &[&str], next: Option<&str>) -> String {
    let items: String = links
        .iter()
        .map(|href| format!("<li><h3><a href=\"{}\">Rede</a></h3></li>", href))
        .collect();
    let forward = next
        .map(|href| format!("<ul><li class=\"forward\"><a href=\"{}\">weiter</a></li></ul>", href))
        .unwrap_or_default();
    format!(
        "<html><body><div id=\"searchResults\"><ul>{}</ul></div>{}</body></html>",
        items, forward
    )
}

fn speech_page(title: &str, date: &str) -> String {
    format!(
        "<html><body><div id=\"main\"><h1>{}</h1>\
         <dl><dt>Datum:</dt><dd>{}</dd><dt>Ort:</dt><dd>Berlin</dd></dl>\
         <div class=\"basepage_pages\"><p>Anrede</p><p>Hauptteil</p></div>\
         </div></body></html>",
        title, date
    )
}

fn config() -> CrawlConfig {
    CrawlConfig::default()
        .with_start_url(START)
        .unwrap()
        .with_pause(Duration::ZERO)
}

fn two_page_site() -> FakeSite {
    FakeSite::default()
        .page(
            START,
            &list_page(&["/rede/eins.html", "/rede/zwei.html;jsessionid=ABC"], Some("/suche?page=2")),
        )
        .page(
            "https://www.bundesregierung.de/suche?page=2",
            &list_page(&["/rede/drei.html"], None),
        )
        .page("https://www.bundesregierung.de/rede/eins.html", &speech_page("Eins", "22.03.2011 17:00 Uhr"))
        .page(
            "https://www.bundesregierung.de/rede/zwei.html;jsessionid=ABC",
            &speech_page("Zwei", "18. September 2014"),
        )
        .page("https://www.bundesregierung.de/rede/drei.html", &speech_page("Drei", "irgendwann"))
}

#[tokio::test]
async fn two_list_pages_yield_three_speeches_in_order() {
    let crawler = Crawler::new(two_page_site(), config());
    let speeches = crawler.crawl().await.unwrap();

    let titles: Vec<&str> = speeches.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Eins", "Zwei", "Drei"]);

    assert_eq!(speeches[0].date, NaiveDate::from_ymd_opt(2011, 3, 22));
    assert_eq!(speeches[1].date, NaiveDate::from_ymd_opt(2014, 9, 18));
    assert_eq!(speeches[2].date, None);
    assert_eq!(speeches[1].link, "https://www.bundesregierung.de/rede/zwei.html");
    assert_eq!(speeches[0].text, "Anrede\n\nHauptteil");
}

#[tokio::test]
async fn every_page_is_fetched_once_lists_first() {
    let crawler = Crawler::new(two_page_site(), config());
    crawler.crawl().await.unwrap();

    assert_eq!(
        crawler.fetcher().requests(),
        vec![
            "https://www.bundesregierung.de/suche?page=1",
            "https://www.bundesregierung.de/suche?page=2",
            "https://www.bundesregierung.de/rede/eins.html",
            "https://www.bundesregierung.de/rede/zwei.html;jsessionid=ABC",
            "https://www.bundesregierung.de/rede/drei.html",
        ]
    );
}

#[tokio::test]
async fn list_pages_stream_stops_without_next_link() {
    let crawler = Crawler::new(two_page_site(), config());
    let pages: Vec<_> = crawler.list_pages().try_collect().await.unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].links.len(), 2);
    assert!(pages[0].next_page.is_some());
    assert!(pages[1].next_page.is_none());

    // Restartable: a second pass starts over from the start URL.
    let again: Vec<_> = crawler.list_pages().try_collect().await.unwrap();
    assert_eq!(again, pages);
}

#[tokio::test]
async fn streamed_speeches_match_batch_crawl() {
    let crawler = Crawler::new(two_page_site(), config());
    let streamed: Vec<_> = crawler.speeches().try_collect().await.unwrap();
    let batch = Crawler::new(two_page_site(), config()).crawl().await.unwrap();
    assert_eq!(streamed, batch);
}

#[tokio::test]
async fn first_streamed_speech_arrives_before_next_detail_fetch() {
    let crawler = Crawler::new(two_page_site(), config());
    let mut speeches = std::pin::pin!(crawler.speeches());

    let first = speeches.try_next().await.unwrap().unwrap();
    assert_eq!(first.title, "Eins");
    assert_eq!(
        crawler.fetcher().requests(),
        vec![
            "https://www.bundesregierung.de/suche?page=1",
            "https://www.bundesregierung.de/suche?page=2",
            "https://www.bundesregierung.de/rede/eins.html",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn every_request_waits_for_the_pause() {
    let pause = Duration::from_secs(2);
    let config = CrawlConfig::default()
        .with_start_url(START)
        .unwrap()
        .with_pause(pause);
    let crawler = Crawler::new(two_page_site(), config);

    let started = tokio::time::Instant::now();
    crawler.crawl().await.unwrap();

    let requests = crawler.fetcher().requests().len() as u32;
    assert_eq!(requests, 5);
    assert!(started.elapsed() >= pause * requests);
}

#[tokio::test]
async fn empty_allow_list_keeps_foreign_links() {
    let site = FakeSite::default().page(
        START,
        &list_page(&["/rede/eins.html", "https://www.example.com/fremd.html"], None),
    );
    let config = config().with_allowed_domains(Vec::<String>::new());
    let crawler = Crawler::new(site, config);
    assert!(crawler.config().allowed_domains.is_empty());

    let links = crawler.discover_links().await.unwrap();
    let links: Vec<&str> = links.iter().map(Url::as_str).collect();
    assert_eq!(
        links,
        vec![
            "https://www.bundesregierung.de/rede/eins.html",
            "https://www.example.com/fremd.html",
        ]
    );
}

#[tokio::test]
async fn duplicates_and_offsite_links_are_skipped() {
    let site = FakeSite::default()
        .page(
            START,
            &list_page(
                &[
                    "/rede/eins.html",
                    "https://www.example.com/fremd.html",
                    "/rede/eins.html;jsessionid=XYZ",
                ],
                None,
            ),
        )
        .page("https://www.bundesregierung.de/rede/eins.html", &speech_page("Eins", "1.1.2015"));

    let crawler = Crawler::new(site, config());
    let links = crawler.discover_links().await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].as_str(), "https://www.bundesregierung.de/rede/eins.html");
}

#[tokio::test]
async fn pagination_loop_terminates() {
    let site = FakeSite::default().page(START, &list_page(&["/rede/eins.html"], Some("/suche?page=1")));

    let crawler = Crawler::new(site, config());
    let links = crawler.discover_links().await.unwrap();
    assert_eq!(links.len(), 1);
}

#[tokio::test]
async fn empty_result_page_ends_discovery() {
    let site = FakeSite::default().page(START, "<html><body><p>Keine Treffer</p></body></html>");
    let crawler = Crawler::new(site, config());
    let speeches = crawler.crawl().await.unwrap();
    assert!(speeches.is_empty());
}

#[tokio::test]
async fn missing_title_fails_the_run() {
    let site = FakeSite::default()
        .page(START, &list_page(&["/rede/kaputt.html"], None))
        .page(
            "https://www.bundesregierung.de/rede/kaputt.html",
            "<html><body><div id=\"main\"><p>ohne Titel</p></div></body></html>",
        );

    let crawler = Crawler::new(site, config());
    let err = crawler.crawl().await.unwrap_err();
    assert!(err.to_string().contains("has no title"));
}

#[tokio::test]
async fn fetch_failure_propagates() {
    let site = FakeSite::default().page(START, &list_page(&["/rede/fehlt.html"], None));

    let crawler = Crawler::new(site, config());
    let err = crawler.crawl().await.unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn csv_export_of_a_crawl() {
    let crawler = Crawler::new(two_page_site(), config());
    let speeches = crawler.crawl().await.unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    write_csv(&speeches, file.reopen().unwrap()).unwrap();

    let out = std::fs::read_to_string(file.path()).unwrap();
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("link,title,date,place,abstract,text"));
    assert_eq!(
        lines.next(),
        Some("https://www.bundesregierung.de/rede/eins.html,Eins,2011-03-22,Berlin,,\"Anrede")
    );
}
