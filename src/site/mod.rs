//! Website scraping
//!
//! Crawls the tour operator's website breadth-first and searches the visible
//! text of each page for a query. Used by chat as a fallback when the trip
//! database has no match.

use crate::config::ScraperConfig;
use crate::constants::USER_AGENT;
use crate::error::{Error, Result};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info};

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A fetched page reduced to its title and visible text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub text: String,
}

/// A page matching a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Breadth-first crawler restricted to one site
#[derive(Debug, Clone)]
pub struct SiteScraper {
    client: reqwest::Client,
    base: String,
    max_pages: usize,
    snippet_radius: usize,
    title_selector: Selector,
    link_selector: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Scrape(format!("Bad selector '{}': {:?}", css, e)))
}

impl SiteScraper {
    /// Create a scraper from config
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base: config.base_url.trim_end_matches('/').to_string(),
            max_pages: config.max_pages,
            snippet_radius: config.snippet_radius,
            title_selector: selector("title")?,
            link_selector: selector("a[href]")?,
        })
    }

    /// Site root all crawled URLs live under
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Turn an href into a crawlable absolute URL, if it belongs to this site
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.split('#').next().unwrap_or_default().trim();

        if href.starts_with('/') && !href.starts_with("//") {
            Some(format!("{}{}", self.base, href))
        } else if href.starts_with(&self.base) {
            Some(href.to_string())
        } else {
            None
        }
    }

    /// Reduce an HTML document to a `Page` plus the on-site links it contains
    pub fn extract(&self, url: &str, html: &str) -> (Page, Vec<String>) {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title_selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let text = document
            .root_element()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let hidden = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| e.name()))
                    .map_or(false, |name| HIDDEN_ELEMENTS.contains(&name));
                let trimmed = text.trim();
                (!hidden && !trimmed.is_empty()).then_some(trimmed)
            })
            .collect::<Vec<_>>()
            .join(" ");

        let links = document
            .select(&self.link_selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.resolve_link(href))
            .collect();

        (
            Page {
                url: url.to_string(),
                title,
                text,
            },
            links,
        )
    }

    /// Fetch one page; non-200 responses yield `None`
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            debug!("Skipping {} (status {})", url, response.status());
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }

    /// Crawl the site, visiting at most `max_pages` URLs
    ///
    /// Failed or non-200 fetches count as visited and are skipped.
    pub async fn crawl(&self) -> Vec<Page> {
        let mut queue = VecDeque::from([self.base.clone()]);
        let mut queued: HashSet<String> = queue.iter().cloned().collect();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pages = Vec::new();

        while visited.len() < self.max_pages {
            let Some(url) = queue.pop_front() else {
                break;
            };
            if !visited.insert(url.clone()) {
                continue;
            }

            let html = match self.fetch(&url).await {
                Ok(Some(html)) => html,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Failed to fetch {}: {}", url, e);
                    continue;
                }
            };

            let (page, links) = self.extract(&url, &html);
            pages.push(page);

            for link in links {
                if !visited.contains(&link) && queued.insert(link.clone()) {
                    queue.push_back(link);
                }
            }
        }

        info!("Crawled {} pages from {} ({} visited)", pages.len(), self.base, visited.len());
        pages
    }

    /// Search crawled pages for `query`, case-insensitively
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        let pages = self.crawl().await;
        self.search_pages(&pages, query)
    }

    /// Search already-fetched pages
    pub fn search_pages(&self, pages: &[Page], query: &str) -> Vec<SearchHit> {
        pages
            .iter()
            .filter_map(|page| {
                find_snippet(&page.text, query, self.snippet_radius).map(|snippet| SearchHit {
                    url: page.url.clone(),
                    title: page.title.clone(),
                    snippet,
                })
            })
            .collect()
    }
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Text around the first case-insensitive occurrence of `query`
///
/// Keeps `radius` characters before the match start and up to `radius`
/// characters after it.
pub fn find_snippet(text: &str, query: &str, radius: usize) -> Option<String> {
    let needle: Vec<char> = query.trim().chars().map(fold_char).collect();
    if needle.is_empty() {
        return None;
    }

    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold_char).collect();

    let idx = folded
        .windows(needle.len())
        .position(|window| window == needle.as_slice())?;

    let start = idx.saturating_sub(radius);
    let end = idx.saturating_add(radius).min(chars.len());
    Some(chars[start..end].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title> Ashtavinayak Yatra </title>
    <style>body { color: red; }</style>
    <script>var tracking = "Morgaon";</script>
  </head>
  <body>
    <h1>Eight Ganpati temples</h1>
    <p>The yatra starts at Morgaon and ends at Mahad.</p>
    <a href="/packages">Packages</a>
    <a href="/contact#form">Contact</a>
    <a href="https://www.ashtavinayak.net/temples/ozar">Ozar</a>
    <a href="https://facebook.com/ashtavinayak">Facebook</a>
    <a href="//cdn.example.com/x.js">CDN</a>
    <a href="mailto:info@ashtavinayak.net">Mail</a>
  </body>
</html>"#;

    fn scraper() -> SiteScraper {
        SiteScraper::new(&ScraperConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_title_and_text() {
        let (page, _) = scraper().extract("https://www.ashtavinayak.net", HTML);

        assert_eq!(page.title, "Ashtavinayak Yatra");
        assert!(page.text.contains("Eight Ganpati temples The yatra starts at Morgaon"));
        assert!(!page.text.contains("tracking"));
        assert!(!page.text.contains("color: red"));
    }

    #[test]
    fn test_extract_links_stay_on_site() {
        let (_, links) = scraper().extract("https://www.ashtavinayak.net", HTML);

        assert_eq!(
            links,
            vec![
                "https://www.ashtavinayak.net/packages".to_string(),
                "https://www.ashtavinayak.net/contact".to_string(),
                "https://www.ashtavinayak.net/temples/ozar".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_link() {
        let s = scraper();
        assert_eq!(s.base(), "https://www.ashtavinayak.net");
        assert_eq!(
            s.resolve_link("/about"),
            Some("https://www.ashtavinayak.net/about".to_string())
        );
        assert_eq!(s.resolve_link("about.html"), None);
        assert_eq!(s.resolve_link("https://other.site/"), None);
    }

    #[test]
    fn test_find_snippet_case_insensitive() {
        let text = "Buses leave from Dadar at 6 AM and reach Morgaon by noon.";
        let snippet = find_snippet(text, "MORGAON", 10).unwrap();
        assert_eq!(snippet, "and reach Morgaon by");
    }

    #[test]
    fn test_find_snippet_bounds() {
        assert_eq!(find_snippet("Ozar temple", "ozar", 200).unwrap(), "Ozar temple");
        assert!(find_snippet("Ozar temple", "theur", 200).is_none());
        assert!(find_snippet("Ozar temple", "   ", 200).is_none());
        assert!(find_snippet("Oz", "ozar temple", 200).is_none());
        assert_eq!(find_snippet("Ozar temple", "temple", usize::MAX).unwrap(), "Ozar temple");
    }

    #[test]
    fn test_find_snippet_multibyte() {
        let text = "अष्टविनायक यात्रा — Morgaon Mayureshwar";
        let snippet = find_snippet(text, "morgaon", 3).unwrap();
        assert_eq!(snippet, " — Mor");
    }

    #[test]
    fn test_search_pages() {
        let s = scraper();
        let pages = vec![
            Page {
                url: "https://www.ashtavinayak.net/a".to_string(),
                title: "A".to_string(),
                text: "Siddhatek temple on the Bhima river".to_string(),
            },
            Page {
                url: "https://www.ashtavinayak.net/b".to_string(),
                title: "B".to_string(),
                text: "Ranjangaon".to_string(),
            },
        ];

        let hits = s.search_pages(&pages, "bhima");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "A");
    }
}
