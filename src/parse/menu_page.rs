use scraper::Html;

use super::{element_text, select_with, Page};
use crate::static_selector;

/// Emphasis marker understood by the chat client.
const EMPHASIS: char = '*';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuContent {
    pub title: String,
    pub body_text: String,
    pub image_url: String,
}

impl MenuContent {
    /// Parses the page once and runs every field extraction against it.
    pub fn from_page(page: &Page) -> Self {
        let document = page.document();
        let content = Self {
            title: title(&document),
            body_text: body_text(&document),
            image_url: image_url(&document),
        };
        tracing::info!("Title is: {}", content.title);
        tracing::debug!("The texts: {}", content.body_text);
        tracing::info!("The image is: {}", content.image_url);
        content
    }
}

/// Text of the post title, empty when the page has none.
pub fn title(document: &Html) -> String {
    static_selector!(TITLE_SELECTOR <- ".post_title");
    select_with(document, &TITLE_SELECTOR, |mut titles| {
        titles.next().map(element_text).unwrap_or_default()
    })
}

/// Paragraphs of the post body, one per line, see [`format_paragraph`].
pub fn body_text(document: &Html) -> String {
    static_selector!(PARAGRAPH_SELECTOR <- ".post_content p");
    select_with(document, &PARAGRAPH_SELECTOR, |paragraphs| {
        paragraphs
            .map(|p| format_paragraph(&element_text(p)))
            .collect()
    })
}

/// `src` of the post image, empty when the page has none.
pub fn image_url(document: &Html) -> String {
    static_selector!(IMAGE_SELECTOR <- ".post_image img");
    select_with(document, &IMAGE_SELECTOR, |mut images| {
        images
            .find_map(|img| img.attr("src"))
            .unwrap_or_default()
            .to_owned()
    })
}

/// Renders one paragraph as a line of the message body.
///
/// Multi-line paragraphs get a marker before the paragraph and after every
/// line but the last: `"a\nb"` becomes `"*a*\nb \n"`.
pub fn format_paragraph(text: &str) -> String {
    if text.contains('\n') {
        let marked = text.replace('\n', &format!("{EMPHASIS}\n"));
        format!("{EMPHASIS}{marked} \n")
    } else {
        format!("{text} \n")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn menu_page() -> Page {
        let body = fs::read_to_string("./src/parse/html_examples/menu_page.html").unwrap();
        Page::new(
            "http://xn--jvrr89ebqs6yg.tokyo/2024/06/27/lunch-0627/"
                .parse()
                .unwrap(),
            body,
        )
    }

    #[test]
    fn test_format_single_line() {
        assert_eq!(format_paragraph("カレー"), "カレー \n");
        assert_eq!(format_paragraph(""), " \n");
    }

    #[test]
    fn test_format_multi_line() {
        assert_eq!(format_paragraph("line1\nline2"), "*line1*\nline2 \n");
        assert_eq!(format_paragraph("a\nb\nc"), "*a*\nb*\nc \n");
    }

    #[test]
    fn test_from_page() {
        let content = MenuContent::from_page(&menu_page());
        assert_eq!(content.title, "6/27（木）本日のランチ");
        assert_eq!(
            content.body_text,
            "本日のランチはこちら \n*チキン南蛮*\nサラダ付き \nご飯大盛り無料 \n"
        );
        assert_eq!(
            content.image_url,
            "http://xn--jvrr89ebqs6yg.tokyo/wp-content/uploads/2024/06/lunch0627.jpg"
        );
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let document = Html::parse_document("<html><body><p>no post here</p></body></html>");
        assert_eq!(title(&document), "");
        assert_eq!(body_text(&document), "");
        assert_eq!(image_url(&document), "");
    }

    #[test]
    fn test_image_without_src_is_empty() {
        let document =
            Html::parse_document(r#"<div class="post_image"><img alt="lunch"></div>"#);
        assert_eq!(image_url(&document), "");
    }

    #[test]
    fn test_paragraph_text_includes_inline_markup() {
        let document = Html::parse_document(
            r#"<div class="post_content"><p>本日は<strong>ハンバーグ</strong>です</p></div>"#,
        );
        assert_eq!(body_text(&document), "本日はハンバーグです \n");
    }
}
