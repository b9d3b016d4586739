use scraper::{ElementRef, Selector};

/// Compile a selector that is known to be valid at compile time.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}
