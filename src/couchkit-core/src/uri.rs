use url::Url;

/// Builds database and document URIs on top of a base URL.
///
/// Each `path` call appends one percent-encoded segment, so an id such as
/// `_design/app` stays a single segment (`_design%2Fapp`).
#[derive(Debug, Clone)]
pub struct UriBuilder {
    url: Url,
}

impl UriBuilder {
    pub fn new(base: &Url) -> Self {
        Self { url: base.clone() }
    }

    /// Append a path segment
    pub fn path(mut self, segment: &str) -> Self {
        // http(s) URLs always have a path; cannot-be-a-base URLs are left untouched
        if let Ok(mut segments) = self.url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        self
    }

    /// Append a form-encoded query pair
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    pub fn build(self) -> Url {
        self.url
    }
}
