use std::collections::HashSet;
use url::Url;

/// Paths probed by the default discovery strategy, in order.
const COMMON_PATHS: &[&str] = &[
    "/about",
    "/contact",
    "/services",
    "/products",
    "/pricing",
    "/blog",
    "/faq",
    "/team",
    "/careers",
    "/support",
    "/docs",
    "/news",
    "/privacy",
    "/terms",
    "/sitemap",
];

/// Strategy for finding the pages of a site. Implementations must be
/// deterministic for a given root and bounded by `max_pages`; the root
/// itself always comes first. This is the seam where a sitemap reader or
/// a link-graph crawler would plug in.
pub trait UrlDiscovery: Send + Sync {
    fn discover(&self, root: &Url, max_pages: usize) -> Vec<Url>;
}

/// Default strategy: the root plus a fixed list of common site paths.
pub struct CommonPaths;

impl UrlDiscovery for CommonPaths {
    fn discover(&self, root: &Url, max_pages: usize) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        seen.insert(root.as_str().to_string());
        urls.push(root.clone());

        for path in COMMON_PATHS {
            if urls.len() >= max_pages {
                break;
            }
            if let Ok(url) = root.join(path)
                && seen.insert(url.as_str().to_string())
            {
                urls.push(url);
            }
        }

        urls.truncate(max_pages.max(1));
        urls
    }
}

/// A caller-supplied page list. Used by tests and by callers that already
/// know which URLs to analyze.
pub struct FixedList(pub Vec<Url>);

impl UrlDiscovery for FixedList {
    fn discover(&self, _root: &Url, max_pages: usize) -> Vec<Url> {
        self.0.iter().take(max_pages.max(1)).cloned().collect()
    }
}
