use url::Url;

use crate::core::error::BuildError;

/// Ordered, non-empty list of candidate backend base URLs.
///
/// The first entry is the primary host; the rest are fallbacks tried in order,
/// and only after the primary failed without producing any HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls(Vec<Url>);

impl BaseUrls {
    /// Wrap `urls`, rejecting an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoBaseUrls`] when `urls` is empty.
    pub fn new(urls: Vec<Url>) -> Result<Self, BuildError> {
        if urls.is_empty() {
            return Err(BuildError::NoBaseUrls);
        }
        Ok(Self(urls))
    }

    /// Parse a comma-separated list, ignoring blank entries.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Url`] for an unparseable entry and
    /// [`BuildError::NoBaseUrls`] when nothing remains.
    pub fn parse_list(s: &str) -> Result<Self, BuildError> {
        let urls = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Url::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(urls)
    }

    /// The primary host.
    pub fn primary(&self) -> &Url {
        &self.0[0]
    }

    /// Hosts tried after the primary, in order.
    pub fn fallbacks(&self) -> &[Url] {
        &self.0[1..]
    }

    /// All hosts in order.
    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.0.iter()
    }

    /// Number of configured hosts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed list.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Append an endpoint path (query included) to a base URL, keeping the base's own path.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}{path}"))
}
