//! Header image URL for a post.

use core::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Errors that can occur when parsing an [`ImageUrl`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageUrlError {
    /// Nothing left after trimming whitespace.
    #[error("image URL is required")]
    Empty,
    /// Longer than the stored column allows.
    #[error("image URL must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Not an absolute URL.
    #[error("image URL is not a valid URL: {0}")]
    Invalid(String),
    /// Absolute, but not something a browser can load as an image.
    #[error("image URL must use http or https (got {0})")]
    UnsupportedScheme(String),
}

/// An absolute `http` or `https` URL pointing at a post's header image.
///
/// The original text is kept as entered (after trimming) so edit forms show
/// exactly what the author typed.
///
/// ```
/// use inkpost_core::ImageUrl;
///
/// assert!(ImageUrl::parse("http://x/img.png").is_ok());
/// assert!(ImageUrl::parse("javascript:alert(1)").is_err());
/// assert!(ImageUrl::parse("/relative.png").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Maximum length of an image URL, matching `blog_posts.img_url`.
    pub const MAX_LENGTH: usize = 2048;

    /// Parse an `ImageUrl` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`ImageUrlError`] if the input is blank, too long, not an
    /// absolute URL, or uses a scheme other than `http`/`https`.
    pub fn parse(s: &str) -> Result<Self, ImageUrlError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ImageUrlError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(ImageUrlError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let url = Url::parse(s).map_err(|e| ImageUrlError::Invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self(s.to_owned())),
            other => Err(ImageUrlError::UnsupportedScheme(other.to_owned())),
        }
    }

    /// Returns the URL as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
