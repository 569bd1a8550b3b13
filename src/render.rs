//! Markup projections of the navigation state.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::header_tree::{HeaderTree, NodeId, NodeVisual};
use crate::threshold::ThresholdDebug;

pub const ON_THIS_PAGE_CLASS: &str = "on-this-page";
pub const SECTION_CLASS: &str = "section";
pub const TOGGLE_CLASS: &str = "chapter-fold-toggle header-toggle";
pub const NODE_ATTRIBUTE: &str = "data-header-node";
pub const DEBUG_DATA_ID: &str = "mdbook-threshold-debug-data";
pub const DEBUG_LINE_ID: &str = "mdbook-threshold-debug-line";

pub const DEBUG_DATA_STYLE: &str = "position: fixed; top: 50px; right: 10px; \
     background-color: #eeeeee; z-index: 9999; pointer-events: none;";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// The "on this page" block mounted after the active chapter entry.
pub fn render_on_this_page(tree: &HeaderTree) -> String {
    let mut html = format!("<div class=\"{ON_THIS_PAGE_CLASS}\">");
    render_list(tree, tree.roots(), &mut html);
    html.push_str("</div>");
    html
}

fn render_list(tree: &HeaderTree, ids: &[NodeId], html: &mut String) {
    html.push_str(&format!("<ol class=\"{SECTION_CLASS}\">"));
    for id in ids {
        render_node(tree, *id, html);
    }
    html.push_str("</ol>");
}

fn render_node(tree: &HeaderTree, id: NodeId, html: &mut String) {
    let (Some(node), Some(visual)) = (tree.node(id), tree.visual(id)) else {
        return;
    };
    let heading = match visual {
        NodeVisual::Container => {
            // A synthetic level is a bare nested list
            render_list(tree, &node.children, html);
            return;
        }
        NodeVisual::Entry { .. } => match tree.heading(id) {
            Some(heading) => heading,
            None => return,
        },
    };

    html.push_str(&format!(
        "<li class=\"{}\" {NODE_ATTRIBUTE}=\"{id}\"><span class=\"chapter-link-wrapper\">",
        visual.item_class()
    ));
    html.push_str(&format!(
        "<a href=\"{}\" class=\"{}\">{}</a>",
        html_escape::encode_double_quoted_attribute(&heading.href()),
        visual.link_class(),
        heading.label_html
    ));
    if matches!(visual, NodeVisual::Entry { toggle: true, .. }) {
        html.push_str(&format!("<a class=\"{TOGGLE_CLASS}\"><div>❱</div></a>"));
    }
    html.push_str("</span>");
    if !node.children.is_empty() {
        render_list(tree, &node.children, html);
    }
    html.push_str("</li>");
}

/// Plain-text label of a heading
pub fn label_text(label_html: &str) -> String {
    let stripped = TAG_RE.replace_all(label_html, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Indented text outline, one line per node.
pub fn render_outline(tree: &HeaderTree) -> String {
    let mut out = String::new();
    for id in tree.roots() {
        outline_node(tree, *id, 0, &mut out);
    }
    out
}

fn outline_node(tree: &HeaderTree, id: NodeId, depth: usize, out: &mut String) {
    let (Some(node), Some(visual)) = (tree.node(id), tree.visual(id)) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match (visual, tree.heading(id)) {
        (
            NodeVisual::Entry {
                expanded,
                current,
                toggle,
            },
            Some(heading),
        ) => {
            let fold = match (toggle, expanded) {
                (true, true) => "[-] ",
                (true, false) => "[+] ",
                _ => "",
            };
            let marker = if current { " <" } else { "" };
            out.push_str(&format!(
                "{indent}{fold}h{} #{} {}{marker}\n",
                node.level,
                heading.id,
                label_text(&heading.label_html)
            ));
        }
        _ => out.push_str(&format!("{indent}(h{})\n", node.level)),
    }
    for child in &node.children {
        outline_node(tree, *child, depth + 1, out);
    }
}

/// Table body of the threshold debug overlay
pub fn render_debug_table(debug: &ThresholdDebug) -> String {
    let mut html = String::from("<table>");
    for (label, value) in debug.rows() {
        html.push_str(&format!("<tr><td>{label}</td><td>{value}</td></tr>"));
    }
    html.push_str("</table>");
    html
}

/// Inline style of the horizontal line drawn at the threshold
pub fn debug_line_style(threshold: f64) -> String {
    format!(
        "position: fixed; top: {threshold}px; left: 0; width: 100vw; height: 2px; \
         background-color: red; z-index: 9999; pointer-events: none;"
    )
}
