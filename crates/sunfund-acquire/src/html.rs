//! Text extraction from HTML

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use sunfund_domain::RenderedPage;

static ARTICLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("Failed to compile ARTICLE selector"));

static HEADINGS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("Failed to compile HEADINGS selector")
});

static PARAGRAPHS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to compile PARAGRAPHS selector"));

static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Failed to compile BODY selector"));

/// Collapse runs of whitespace the way a browser renders text
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull headings and paragraphs out of the first `article` element
///
/// The text is every heading in document order, one per line, then a
/// newline, then every paragraph, one per line. A page without an `article`
/// element, or whose article holds no heading or paragraph text, is reported
/// as not found.
pub fn article_text(html: &str) -> RenderedPage {
    let document = Html::parse_document(html);
    let Some(article) = document.select(&ARTICLE).next() else {
        return RenderedPage::default();
    };

    let headings: Vec<String> = article
        .select(&HEADINGS)
        .map(visible_text)
        .filter(|t| !t.is_empty())
        .collect();
    let paragraphs: Vec<String> = article
        .select(&PARAGRAPHS)
        .map(visible_text)
        .filter(|t| !t.is_empty())
        .collect();

    let text = format!("{}\n{}", headings.join("\n"), paragraphs.join("\n"));
    if text.trim().is_empty() {
        return RenderedPage::default();
    }

    RenderedPage { found: true, text }
}

/// Visible text of the whole page body, scripts and styles excluded
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = match document.select(&BODY).next() {
        Some(body) => body,
        None => document.root_element(),
    };

    let mut words = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_then_paragraphs() {
        let html = r#"<html><body>
            <nav><p>Menu</p></nav>
            <article>
              <h1>SunCulture raises   $27.5m</h1>
              <p>SunCulture has raised funding.</p>
              <h2>Background</h2>
              <p>The company sells
                 solar irrigation.</p>
            </article>
            <article><p>Related story</p></article>
        </body></html>"#;

        let page = article_text(html);
        assert!(page.found);
        assert_eq!(
            page.text,
            "SunCulture raises $27.5m\nBackground\nSunCulture has raised funding.\nThe company sells solar irrigation."
        );
    }

    #[test]
    fn test_no_article_is_not_found() {
        let page = article_text("<html><body><p>Just a paragraph</p></body></html>");
        assert!(!page.found);
        assert!(page.text.is_empty());
    }

    #[test]
    fn test_empty_article_is_not_found() {
        let page = article_text("<html><body><article><div>  </div></article></body></html>");
        assert!(!page.found);
    }

    #[test]
    fn test_paragraphs_without_headings() {
        let page = article_text("<article><p>Only text.</p></article>");
        assert!(page.found);
        assert_eq!(page.text, "\nOnly text.");
    }

    #[test]
    fn test_page_text_skips_scripts() {
        let html = "<html><head><title>T</title></head><body>\
                    <h1>Headline</h1><script>var x = 1;</script>\
                    <style>p { color: red }</style><p>Body   text</p></body></html>";
        assert_eq!(page_text(html), "Headline Body text");
    }

    #[test]
    fn test_selectors_parse() {
        Lazy::force(&ARTICLE);
        Lazy::force(&HEADINGS);
        Lazy::force(&PARAGRAPHS);
        Lazy::force(&BODY);
    }
}
