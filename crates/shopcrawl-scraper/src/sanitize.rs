//! Description HTML cleanup.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));
static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static MEDIA: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img, video, iframe, script, style").expect("valid selector")
});
static WRAPPERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, div").expect("valid selector"));

/// How much markup [`strip_markup`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripLevel {
    /// Anchor elements, with their content.
    Links,
    /// Anchors, embedded media and scripts, then `p`/`div` wrappers left
    /// without visible text.
    LinksAndMedia,
}

/// Removes unwanted elements from a description fragment.
///
/// Runs of blank lines collapse to a single newline and the result is
/// trimmed. Applying the function to its own output is a no-op. The HTML
/// parser recovers from any malformed input, so there is no failure path:
/// unbalanced markup comes back repaired rather than rejected.
#[must_use]
pub fn strip_markup(html: &str, level: StripLevel) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let mut fragment = Html::parse_fragment(html);
    detach_matching(&mut fragment, &LINKS, |_| true);
    if level == StripLevel::LinksAndMedia {
        detach_matching(&mut fragment, &MEDIA, |_| true);
        detach_matching(&mut fragment, &WRAPPERS, |el| {
            el.text().all(|t| t.trim().is_empty())
        });
    }

    let serialized = fragment.root_element().inner_html();
    BLANK_LINES_RE
        .replace_all(&serialized, "\n")
        .trim()
        .to_owned()
}

fn detach_matching<F>(fragment: &mut Html, selector: &Selector, should_detach: F)
where
    F: Fn(&scraper::ElementRef<'_>) -> bool,
{
    let ids: Vec<_> = fragment
        .root_element()
        .select(selector)
        .filter(|el| should_detach(el))
        .map(|el| el.id())
        .collect();
    for id in ids {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(strip_markup("", StripLevel::Links), "");
        assert_eq!(strip_markup("  \n ", StripLevel::LinksAndMedia), "");
    }

    #[test]
    fn links_level_removes_anchor_with_text() {
        let html = r#"<p>Great serum. <a href="/collections/all">Shop <b>all</b></a></p>"#;
        assert_eq!(strip_markup(html, StripLevel::Links), "<p>Great serum. </p>");
    }

    #[test]
    fn links_level_keeps_images() {
        let html = r#"<p>Hi</p><img src="a.jpg">"#;
        let out = strip_markup(html, StripLevel::Links);
        assert!(out.contains("<img"), "{out}");
    }

    #[test]
    fn media_level_removes_media_and_scripts() {
        let html = concat!(
            "<p>Text</p>",
            r#"<img src="a.jpg">"#,
            r#"<iframe src="https://video.example"></iframe>"#,
            "<script>track()</script>",
            "<style>p{}</style>",
            "<video></video>",
        );
        assert_eq!(strip_markup(html, StripLevel::LinksAndMedia), "<p>Text</p>");
    }

    #[test]
    fn media_level_removes_wrappers_left_empty() {
        let html = r#"<div><img src="a.jpg"></div><p> </p><p><a href="x">link</a></p><p>Keep</p>"#;
        assert_eq!(strip_markup(html, StripLevel::LinksAndMedia), "<p>Keep</p>");
    }

    #[test]
    fn collapses_blank_lines() {
        let html = "<p>One</p>\n\n  \n<p>Two</p>";
        assert_eq!(
            strip_markup(html, StripLevel::Links),
            "<p>One</p>\n<p>Two</p>"
        );
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "<p>Plain <strong>bold</strong></p>",
            "<div>\n\n<p>Nested <a href='#'>x</a></p>\n\n</div><p></p>",
            "unclosed <em>tag",
        ];
        for level in [StripLevel::Links, StripLevel::LinksAndMedia] {
            for html in inputs {
                let once = strip_markup(html, level);
                assert_eq!(strip_markup(&once, level), once, "input: {html}");
            }
        }
    }
}
