pub mod composer;
pub mod config;
pub mod error;
pub mod extractor;

/// A fetched document reduced to the parts worth summarizing.
///
/// `body_text` holds the visible text of the page with every whitespace run
/// collapsed to a single space and no leading or trailing whitespace. It
/// never contains markup or the payload of script/style/media elements.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub url: String,
    pub title: String,
    pub body_text: String,
}
