use std::collections::HashSet;

use anyhow::Result;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use politikdokumente_core::Speech;
use reqwest::Url;

use crate::config::CrawlConfig;
use crate::detail_page::parse_detail_page;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::links::{canonical_link, is_allowed};
use crate::list_page::{parse_list_page, ListPage};

/// Walks the search result pages, then visits every speech they link to.
///
/// Fetches are strictly sequential and each one is preceded by
/// `CrawlConfig::pause`.
pub struct Crawler<F> {
    fetcher: F,
    config: CrawlConfig,
}

impl Crawler<HttpFetcher> {
    pub fn http(config: CrawlConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        tokio::time::sleep(self.config.pause).await;
        self.fetcher.fetch(url).await
    }

    /// List pages in pagination order, starting at the configured start URL.
    ///
    /// Nothing is fetched until the stream is polled. The sequence ends after
    /// the first page without a followable "next" link; each call starts over.
    pub fn list_pages(&self) -> impl Stream<Item = Result<ListPage>> + '_ {
        let start = Some(self.config.start_url.clone());
        stream::try_unfold((start, HashSet::new()), move |(next, visited)| {
            self.next_list_page(next, visited)
        })
    }

    async fn next_list_page(
        &self,
        next: Option<Url>,
        mut visited: HashSet<Url>,
    ) -> Result<Option<(ListPage, (Option<Url>, HashSet<Url>))>> {
        let Some(url) = next else {
            return Ok(None);
        };
        visited.insert(url.clone());

        tracing::debug!(url = %url, "crawling list page");
        let html = self.fetch(&url).await?;
        let mut page = parse_list_page(&html, &url);
        tracing::debug!(url = %url, links = page.links.len(), "parsed list page");

        page.next_page = page.next_page.take().filter(|candidate| {
            if visited.contains(candidate) {
                tracing::warn!(url = %candidate, "next page already visited, stopping pagination");
                false
            } else if !is_allowed(candidate, &self.config.allowed_domains) {
                tracing::warn!(url = %candidate, "next page is off-site, stopping pagination");
                false
            } else {
                true
            }
        });

        let next = page.next_page.clone();
        Ok(Some((page, (next, visited))))
    }

    /// Follow the whole pagination chain and return every detail link once,
    /// in discovery order.
    pub async fn discover_links(&self) -> Result<Vec<Url>> {
        let mut pages = std::pin::pin!(self.list_pages());
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        while let Some(page) = pages.try_next().await? {
            for link in page.links {
                if !is_allowed(&link, &self.config.allowed_domains) {
                    tracing::warn!(url = %link, "skipping off-site link");
                    continue;
                }
                if !seen.insert(canonical_link(link.as_str()).to_string()) {
                    tracing::debug!(url = %link, "skipping duplicate link");
                    continue;
                }
                links.push(link);
            }
        }

        Ok(links)
    }

    pub async fn fetch_speech(&self, url: &Url) -> Result<Speech> {
        tracing::debug!(url = %url, "crawling speech page");
        let html = self.fetch(url).await?;
        parse_detail_page(&html, url.as_str())
    }

    /// Discover all links, then fetch every speech. Any failure aborts the run.
    pub async fn crawl(&self) -> Result<Vec<Speech>> {
        tracing::info!(start = %self.config.start_url, "start crawling links");
        let links = self.discover_links().await?;
        tracing::info!(count = links.len(), "crawling links finished");

        tracing::info!("start crawling pages");
        let mut speeches = Vec::with_capacity(links.len());
        for link in &links {
            speeches.push(self.fetch_speech(link).await?);
        }
        tracing::info!(count = speeches.len(), "crawling pages finished");

        Ok(speeches)
    }

    /// Like [`Crawler::crawl`], but hands out each speech as soon as its page
    /// has been extracted.
    pub fn speeches(&self) -> impl Stream<Item = Result<Speech>> + '_ {
        stream::once(self.discover_links())
            .map_ok(|links| {
                tracing::info!(count = links.len(), "crawling links finished");
                stream::iter(links).map(Ok::<_, anyhow::Error>)
            })
            .try_flatten()
            .and_then(move |url| async move { self.fetch_speech(&url).await })
    }
}
