//! HTML helpers
//!
//! Visible-text extraction, link extraction and a "first element with this tag
//! and class" query over parsed documents.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Tags whose text never counts as visible
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Whether an element's text is hidden from the reader
pub fn is_hidden_tag(name: &str) -> bool {
    HIDDEN_TAGS.contains(&name)
}

/// Text nodes under `element`, skipping script/style/noscript subtrees
fn text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.descendants().filter_map(move |node_ref| {
        let Node::Text(text) = node_ref.value() else {
            return None;
        };
        let in_hidden = node_ref
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .chain(std::iter::once(*element))
            .any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| is_hidden_tag(el.name()))
            });
        (!in_hidden).then_some(&**text)
    })
}

/// Raw visible text under `element`, concatenated without trimming
pub fn raw_text(element: ElementRef<'_>) -> String {
    text_nodes(element).collect()
}

/// Visible text under `element`: each text node trimmed, empties dropped,
/// joined with `separator`
pub fn visible_text(element: ElementRef<'_>, separator: &str) -> String {
    text_nodes(element)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// All visible text of a document, whitespace-normalized
pub fn page_text(document: &Html) -> String {
    normalize_whitespace(&visible_text(document.root_element(), " "))
}

/// Every `a[href]` in the document, resolved against `base`
pub fn extract_links(document: &Html, base: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .collect()
}

/// The link most closely associated with an element: the element itself or
/// its first descendant `a[href]`, otherwise the nearest ancestor `a[href]`
pub fn nearest_link<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let href = |el: ElementRef<'a>| {
        if el.value().name() == "a" {
            el.value().attr("href")
        } else {
            None
        }
    };

    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find_map(href)
        .or_else(|| element.ancestors().filter_map(ElementRef::wrap).find_map(href))
}

/// Query interface for parsed documents, independent of the HTML engine
pub trait DocumentQuery {
    /// Trimmed, non-empty text of the first element (in document order) whose
    /// tag is one of `tags` and which carries `class`
    fn first_text(&self, tags: &[&str], class: &str) -> Option<String>;
}

impl DocumentQuery for Html {
    fn first_text(&self, tags: &[&str], class: &str) -> Option<String> {
        self.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| tags.contains(&el.value().name()))
            .filter(|el| el.value().classes().any(|c| c == class))
            .map(|el| normalize_whitespace(&visible_text(el, " ")))
            .find(|text| !text.is_empty())
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_skips_hidden_tags() {
        let html = r#"
            <html>
            <body>
                <noscript>Nothing to see without JavaScript</noscript>
                <script>window.profile = { handle: "alice", status: "404" };</script>
                <h1 class="name">alice</h1>
                <p class="bio">Down   the
                    rabbit hole.</p>
                <template><p>Sorry, this user is banned</p></template>
            </body>
            </html>
        "#;

        let document = Html::parse_document(html);
        let text = page_text(&document);

        // script, noscript and template text must not leak into "no results" checks
        assert_eq!(text, "alice Down the rabbit hole.");
    }

    #[test]
    fn test_visible_text_strip_join() {
        let document = Html::parse_fragment("<div> <b> ali </b>\n<i>ce </i></div>");
        let selector = Selector::parse("div").unwrap();
        let div = document.select(&selector).next().unwrap();

        assert_eq!(visible_text(div, ""), "alice");
        assert_eq!(visible_text(div, " "), "ali ce");
    }

    #[test]
    fn test_extract_links_resolves_relative() {
        let html = r#"
            <a href="/u/alice">one</a>
            <a href="https://other.net/alice">two</a>
            <a>no href</a>
        "#;
        let document = Html::parse_document(html);
        let base = Url::parse("https://example.com/profile/alice").unwrap();

        let links: Vec<String> = extract_links(&document, &base)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec!["https://example.com/u/alice", "https://other.net/alice"]
        );
    }

    #[test]
    fn test_nearest_link() {
        let html = r#"
            <a href="/outer"><span id="inside">alice</span></a>
            <div id="holder"><p>alice</p><a href="/child">go</a></div>
            <p id="lonely">alice</p>
        "#;
        let document = Html::parse_document(html);
        let pick = |sel: &str| {
            let selector = Selector::parse(sel).unwrap();
            let element = document.select(&selector).next().unwrap();
            nearest_link(element).map(str::to_string)
        };

        assert_eq!(pick("#inside").as_deref(), Some("/outer"));
        assert_eq!(pick("#holder").as_deref(), Some("/child"));
        assert_eq!(pick("#lonely"), None);
    }

    #[test]
    fn test_first_text_by_tag_and_class() {
        let html = r#"
            <div class="name">Not a heading</div>
            <h2 class="name title">Alice Liddell</h2>
            <h1 class="name">Second Name</h1>
            <p class="location">  Oxford,
                England </p>
            <p class="bio"></p>
            <p class="bio">Curious.</p>
        "#;
        let document = Html::parse_document(html);
        let tags = ["h1", "h2", "h3", "p"];

        assert_eq!(document.first_text(&tags, "name").as_deref(), Some("Alice Liddell"));
        assert_eq!(document.first_text(&tags, "location").as_deref(), Some("Oxford, England"));
        assert_eq!(document.first_text(&tags, "bio").as_deref(), Some("Curious."));
        assert_eq!(document.first_text(&tags, "avatar"), None);
    }
}
