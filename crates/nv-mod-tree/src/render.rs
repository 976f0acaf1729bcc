use nv_base::Config;
use nv_base::config::{ICON_DIRECTORY, ICON_EMPTY_DIRECTORY, ICON_OPEN_DIRECTORY};

use crate::tree::{FileTree, NodeId};

/// One display line and the node it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub node: NodeId,
    pub text: String,
}

/// Render the whole visible tree, starting at the root.
pub fn render_visible(tree: &FileTree, config: &Config) -> Vec<RenderedLine> {
    render(tree, tree.root(), config)
}

/// One line per visible node under `from` (inclusive). `from` itself is drawn
/// without a connector; its descendants are drawn only through open directories.
pub fn render(tree: &FileTree, from: NodeId, config: &Config) -> Vec<RenderedLine> {
    let mut lines = Vec::new();
    render_node(tree, from, config, "", None, &mut lines);
    lines
}

fn render_node(tree: &FileTree, id: NodeId, config: &Config, prefix: &str, is_last: Option<bool>, out: &mut Vec<RenderedLine>) {
    let glyphs = &config.tree;
    let node = tree.node(id);

    let connector = match is_last {
        None => "",
        Some(true) => glyphs.last_branch.as_str(),
        Some(false) => glyphs.branch.as_str(),
    };

    let text = if node.is_dir() {
        let marker = if node.is_open() { &glyphs.open } else { &glyphs.closed };
        let icon_key = if node.children().is_empty() {
            ICON_EMPTY_DIRECTORY
        } else if node.is_open() {
            ICON_OPEN_DIRECTORY
        } else {
            ICON_DIRECTORY
        };
        format!("{}{}{} {} {}", prefix, connector, marker, config.icons.get(icon_key), node.name())
    } else {
        format!("{}{}{} {}", prefix, connector, config.icons.get(node.file_type()), node.name())
    };
    out.push(RenderedLine { node: id, text });

    if !node.is_dir() || !node.is_open() {
        return;
    }

    let child_prefix = match is_last {
        None => prefix.to_string(),
        Some(true) => format!("{}{}", prefix, glyphs.blank),
        Some(false) => format!("{}{}", prefix, glyphs.indent),
    };
    let total = node.children().len();
    for (i, &child) in node.children().iter().enumerate() {
        render_node(tree, child, config, &child_prefix, Some(i == total - 1), out);
    }
}
