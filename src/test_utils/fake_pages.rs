/// Writes minimal book pages shaped like the generator's output
use std::fs;
use std::path::Path;

/// One heading of a fake page
#[derive(Debug, Clone)]
pub struct FakeHeading {
    pub level: u8,
    pub id: String,
    pub label: String,
}

impl FakeHeading {
    pub fn new(level: u8, id: &str, label: &str) -> Self {
        Self {
            level,
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// Full HTML document with a sidebar and the given headings inside `<main>`
pub fn fake_page_html(title: &str, headings: &[FakeHeading]) -> String {
    let mut main = format!("<h1 id=\"title\"><a class=\"header\" href=\"#title\">{title}</a></h1>\n");
    for heading in headings {
        main.push_str(&format!(
            "<h{level} id=\"{id}\"><a class=\"header\" href=\"#{id}\">{label}</a></h{level}>\n<p>Body of {id}.</p>\n",
            level = heading.level,
            id = heading.id,
            label = heading.label
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{title}</title></head>
<body>
<nav id="mdbook-sidebar" class="sidebar">
<div id="mdbook-sidebar-scrollbox" class="sidebar-scrollbox">
<ol class="chapter">
<li class="chapter-item"><span class="chapter-link-wrapper"><a href="index.html">Introduction</a></span></li>
<li class="chapter-item"><span class="chapter-link-wrapper"><a href="page.html" class="active">{title}</a></span></li>
</ol>
</div>
</nav>
<main>
{main}</main>
</body>
</html>
"#
    )
}

/// Writes [`fake_page_html`] to `path`
pub fn create_fake_page<P: AsRef<Path>>(
    path: P,
    title: &str,
    headings: &[FakeHeading],
) -> std::io::Result<()> {
    fs::write(path, fake_page_html(title, headings))
}
