//! Anchor href extraction.
//!
//! The page is streamed through `lol_html` with a single `a[href]` handler,
//! so no document tree is ever built.

use lol_html::{HtmlRewriter, Settings, element};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Returns every anchor href in `html` resolved against `base_url`, with
/// fragments removed. Malformed markup yields whatever was collected before
/// the parser gave up.
pub fn extract_links(html: &str, base_url: &Url) -> HashSet<Url> {
    let mut hrefs: Vec<String> = Vec::new();

    {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        hrefs.push(href);
                    }
                    Ok(())
                })],
                ..Settings::new()
            },
            |_: &[u8]| {},
        );

        let outcome = match rewriter.write(html.as_bytes()) {
            Ok(()) => rewriter.end(),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            debug!(base = %base_url, error = %err, "HTML scan stopped early");
        }
    }

    hrefs
        .iter()
        .filter_map(|href| resolve_href(base_url, href))
        .collect()
}

fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut url = base.join(trimmed).ok()?;
    url.set_fragment(None);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    fn sorted(links: HashSet<Url>) -> Vec<String> {
        let mut out: Vec<String> = links.into_iter().map(String::from).collect();
        out.sort();
        out
    }

    #[test]
    fn test_resolves_relative_absolute_and_protocol_relative() {
        let html = r#"<html><body>
            <a href="guide.html">Guide</a>
            <a href="/about">About</a>
            <a href="https://example.com/contact">Contact</a>
            <a href="//cdn.example.com/lib">CDN</a>
            <a href="../up">Up</a>
        </body></html>"#;

        assert_eq!(
            sorted(extract_links(html, &base())),
            vec![
                "https://cdn.example.com/lib",
                "https://example.com/about",
                "https://example.com/contact",
                "https://example.com/docs/guide.html",
                "https://example.com/up",
            ]
        );
    }

    #[test]
    fn test_fragments_removed_and_duplicates_collapse() {
        let html = r##"<a href="/a#one">1</a><a href="/a#two">2</a><a href="/a">3</a><a href="#top">top</a>"##;
        assert_eq!(
            sorted(extract_links(html, &base())),
            vec!["https://example.com/a"]
        );
    }

    #[test]
    fn test_ignores_other_tags_and_anchors_without_href() {
        let html = r#"<link href="/style.css"><img src="/logo.png"><a name="x">no href</a><area href="/map">"#;
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn test_empty_and_whitespace_hrefs_ignored() {
        let html = r#"<a href="">empty</a><a href="   ">blank</a><a href="  /trimmed  ">t</a>"#;
        assert_eq!(
            sorted(extract_links(html, &base())),
            vec!["https://example.com/trimmed"]
        );
    }

    #[test]
    fn test_non_web_schemes_are_still_absolute() {
        let html = r#"<a href="mailto:hi@example.com">mail</a>"#;
        let links = extract_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links.iter().next().unwrap().scheme(), "mailto");
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let html = r#"<html><body><a href="/ok">ok</a><div><a href="/unclosed"<p></a></b></i><<<>>"#;
        let links = extract_links(html, &base());
        assert!(links.contains(&Url::parse("https://example.com/ok").unwrap()));
    }

    #[test]
    fn test_empty_document() {
        assert!(extract_links("", &base()).is_empty());
    }
}
