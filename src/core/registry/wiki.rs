//! Wiki-page registry backend
//!
//! The listing is an HTML page (a GitHub wiki) whose `.markdown-body` holds
//! headings for categories followed by lists of package links:
//!
//! ```html
//! <h2>String manipulation</h2>
//! <ul>
//!   <li><a href="https://github.com/clibs/buffer">clibs/buffer</a> - Tiny C string library</li>
//! </ul>
//! ```

use super::{status_error, transport_error, RegistryBackend, RegistryError, RegistryKind};
use crate::core::package::{package_id_from_href, Package};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

#[allow(clippy::expect_used)]
static LISTING_ROOT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".markdown-body").expect("static selector"));

#[allow(clippy::expect_used)]
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Backend that scrapes an HTML listing page
#[derive(Debug, Clone)]
pub struct WikiPageBackend {
    url: String,
}

impl WikiPageBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl RegistryBackend for WikiPageBackend {
    fn kind(&self) -> RegistryKind {
        RegistryKind::WikiPage
    }

    async fn fetch_packages(&self, client: &Client) -> Result<Vec<Package>, RegistryError> {
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        if !response.status().is_success() {
            return Err(status_error(&self.url, response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        parse_listing_page(&body).map_err(|reason| RegistryError::Malformed {
            url: self.url.clone(),
            reason,
        })
    }
}

/// Extract packages from a listing page.
///
/// The nearest heading before a list item, in document order, is its category.
pub fn parse_listing_page(html: &str) -> Result<Vec<Package>, String> {
    let document = Html::parse_document(html);
    let root = document
        .select(&LISTING_ROOT)
        .next()
        .ok_or_else(|| "no .markdown-body element in listing page".to_string())?;

    let mut packages = Vec::new();
    let mut category = String::new();

    for node in root.descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        match element.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                category = collapse_whitespace(&element.text().collect::<String>());
            }
            "li" => {
                if let Some(package) = parse_list_item(element, &category) {
                    packages.push(package);
                }
            }
            _ => {}
        }
    }

    Ok(packages)
}

fn parse_list_item(item: ElementRef<'_>, category: &str) -> Option<Package> {
    let link = item.select(&LINK).next()?;
    let href = link.value().attr("href")?;
    let id = package_id_from_href(href)?;

    let link_text: String = link.text().collect();
    let full_text: String = item.text().collect();
    let after_link = full_text
        .split_once(link_text.as_str())
        .map(|(_, rest)| rest)
        .unwrap_or("");
    let description = collapse_whitespace(after_link.trim_start().trim_start_matches('-'));

    Some(Package {
        id,
        href: href.to_string(),
        description,
        category: category.to_string(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) const LISTING: &str = r##"
        <html><body>
          <div id="wiki-content">
            <div class="markdown-body">
              <h2>String manipulation</h2>
              <ul>
                <li><a href="https://github.com/clibs/buffer">clibs/buffer</a> - Tiny C string library</li>
                <li><a href="https://github.com/stephenmathieson/trim.c">stephenmathieson/trim.c</a> - trim a string</li>
              </ul>
              <h2>Data structures</h2>
              <ul>
                <li><a href="https://github.com/clibs/list">clibs/list</a> -   doubly linked
                    list</li>
                <li><a href="#local-anchor">not a package</a></li>
                <li>plain text item</li>
              </ul>
            </div>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_listing_page() {
        let packages = parse_listing_page(LISTING).unwrap();
        assert_eq!(packages.len(), 3);

        assert_eq!(packages[0].id, "clibs/buffer");
        assert_eq!(packages[0].href, "https://github.com/clibs/buffer");
        assert_eq!(packages[0].description, "Tiny C string library");
        assert_eq!(packages[0].category, "String manipulation");

        assert_eq!(packages[1].id, "stephenmathieson/trim.c");
        assert_eq!(packages[2].id, "clibs/list");
        assert_eq!(packages[2].description, "doubly linked list");
        assert_eq!(packages[2].category, "Data structures");
    }

    #[test]
    fn test_items_before_any_heading_have_empty_category() {
        let html = r#"<div class="markdown-body"><ul>
            <li><a href="https://github.com/a/b">a/b</a> - first</li>
        </ul></div>"#;
        let packages = parse_listing_page(html).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].category, "");
    }

    #[test]
    fn test_page_without_listing_root_is_malformed() {
        let err = parse_listing_page("<html><body><p>Rate limited</p></body></html>").unwrap_err();
        assert!(err.contains("markdown-body"));
    }

    #[tokio::test]
    async fn test_fetch_from_server() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/github.com/clibs/clib/wiki/Packages"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(&mock_server)
            .await;

        let backend = WikiPageBackend::new(format!(
            "{}/github.com/clibs/clib/wiki/Packages",
            mock_server.uri()
        ));
        let packages = backend.fetch_packages(&Client::new()).await.unwrap();
        assert_eq!(packages.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let backend = WikiPageBackend::new(format!("{}/wiki/Packages", mock_server.uri()));
        let err = backend.fetch_packages(&Client::new()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let backend = WikiPageBackend::new(format!("{}/wiki/Packages", mock_server.uri()));
        let err = backend.fetch_packages(&Client::new()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Malformed { .. }));
    }
}
