use std::fmt;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BaseUrlError {
    #[error("no server URL declared")]
    Missing,
    #[error("URL template variables are not supported: {0}")]
    Templated(String),
    #[error("invalid URL {url}: {reason}")]
    Invalid { url: String, reason: String },
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// An absolute http(s) URL that provider endpoints hang off.
///
/// Trailing slashes are dropped, so `endpoint("query")` always yields `<base>/query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(raw: &str) -> Result<Self, BaseUrlError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BaseUrlError::Missing);
        }
        reject_templates(raw)?;
        let url = Url::parse(raw).map_err(|e| BaseUrlError::Invalid {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Resolve a possibly-relative server URL against the document that declared it.
    pub fn resolve(reference: &str, document_url: &str) -> Result<Self, BaseUrlError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(BaseUrlError::Missing);
        }
        reject_templates(reference)?;
        match Url::parse(reference) {
            Ok(url) => Self::from_url(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let document = Url::parse(document_url).map_err(|e| BaseUrlError::Invalid {
                    url: document_url.to_string(),
                    reason: e.to_string(),
                })?;
                let joined = document.join(reference).map_err(|e| BaseUrlError::Invalid {
                    url: reference.to_string(),
                    reason: e.to_string(),
                })?;
                Self::from_url(joined)
            }
            Err(e) => Err(BaseUrlError::Invalid {
                url: reference.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn from_url(mut url: Url) -> Result<Self, BaseUrlError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BaseUrlError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(BaseUrlError::Invalid {
                url: url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        url.set_query(None);
        url.set_fragment(None);
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// `<base>/<segment>`
    pub fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}

impl serde::Serialize for BaseUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn reject_templates(raw: &str) -> Result<(), BaseUrlError> {
    if raw.contains('{') || raw.contains('}') {
        return Err(BaseUrlError::Templated(raw.to_string()));
    }
    Ok(())
}
