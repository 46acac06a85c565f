//! Classifies where the current document sits within the site so the banner
//! can link to the privacy policy with a path that resolves correctly. A
//! static site has no server-side routing, so the link must be relative to
//! the page that renders it.

use crate::policy::Policy;
use url::Url;

/// The two location classes the site's pages fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageLocation {
    /// A page directly under the site root, e.g. `/index.html`.
    SiteRoot,

    /// A page inside a section directory, e.g. `/speakers/index.html`.
    Nested,
}

impl PageLocation {
    /// Classifies the location of `document`. Any path with a directory
    /// component below the root is nested.
    pub fn of(document: &Url) -> PageLocation {
        match document.path().rfind('/') {
            Some(0) | None => PageLocation::SiteRoot,
            Some(_) => PageLocation::Nested,
        }
    }

    /// The privacy-policy href for a page at this location under `policy`.
    pub fn privacy_policy_href(self, policy: &Policy) -> &str {
        match self {
            PageLocation::SiteRoot => &policy.privacy_policy_root,
            PageLocation::Nested => &policy.privacy_policy_nested,
        }
    }
}
