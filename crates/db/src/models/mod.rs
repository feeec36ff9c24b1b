pub mod blog_post;
pub mod client;
pub mod event;
pub mod news_article;
pub mod tailor_item;

/// Trims free-text form input, mapping empty strings to NULL columns.
pub(crate) fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
