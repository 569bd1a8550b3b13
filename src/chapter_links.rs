use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Marks sidebar links whose href has already been made page-relative
pub const REWRITTEN_ATTRIBUTE: &str = "data-root-relative-rewritten";

static EXTERNAL_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[a-z+]+:)?//").unwrap());

/// Location without fragment and query; directory URLs alias their `index.html`.
pub fn current_page(location: &str) -> String {
    let page = location.split('#').next().unwrap_or_default();
    let mut page = page.split('?').next().unwrap_or_default().to_string();
    if page.ends_with('/') {
        page.push_str("index.html");
    }
    page
}

/// Chapter hrefs in the shared sidebar are relative to the book root
pub fn is_root_relative(href: &str) -> bool {
    !href.starts_with('#') && !EXTERNAL_HREF.is_match(href)
}

pub fn rewrite_href(href: &str, path_to_root: &str) -> String {
    if is_root_relative(href) {
        format!("{path_to_root}{href}")
    } else {
        href.to_string()
    }
}

/// What to do with one sidebar link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    /// New `href`, when the link still points at the book root
    pub href: Option<String>,
    pub active: bool,
}

/// Resolves sidebar chapter links against the page they are shown on.
pub struct ChapterLinks {
    page: Url,
    path_to_root: String,
    current_page: String,
}

impl ChapterLinks {
    /// `None` when the location is not an absolute URL
    pub fn new(location: &str, path_to_root: &str) -> Option<Self> {
        let page = Url::parse(location).ok()?;
        Some(Self {
            page,
            path_to_root: path_to_root.to_string(),
            current_page: current_page(location),
        })
    }

    pub fn current_page(&self) -> &str {
        &self.current_page
    }

    /// Absolute URL the link points to once rewritten for this page
    pub fn resolve(&self, href: &str) -> Option<String> {
        let rewritten = rewrite_href(href, &self.path_to_root);
        self.page
            .join(&rewritten)
            .ok()
            .map(|url| url.as_str().to_string())
    }

    pub fn is_active(&self, index: usize, href: &str) -> bool {
        let resolved = self.resolve(href);
        self.matches_current(index, resolved.as_deref())
    }

    /// Plans the rewrite and activation of one link. `rewritten` links are
    /// already page-relative and are resolved as they are.
    pub fn update(&self, index: usize, href: &str, rewritten: bool) -> LinkUpdate {
        if rewritten {
            let resolved = self.page.join(href).ok().map(|url| url.as_str().to_string());
            return LinkUpdate {
                href: None,
                active: self.matches_current(index, resolved.as_deref()),
            };
        }
        LinkUpdate {
            href: is_root_relative(href).then(|| rewrite_href(href, &self.path_to_root)),
            active: self.is_active(index, href),
        }
    }

    fn matches_current(&self, index: usize, resolved: Option<&str>) -> bool {
        if resolved == Some(self.current_page.as_str()) {
            return true;
        }
        // The book's index page stands in for the first chapter.
        index == 0 && self.path_to_root.is_empty() && self.current_page.ends_with("/index.html")
    }

    pub fn active_indices<'a>(&self, hrefs: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
        hrefs
            .into_iter()
            .enumerate()
            .filter(|(index, href)| self.is_active(*index, href))
            .map(|(index, _)| index)
            .collect()
    }
}
