//! Nested "on this page" navigation built from the page's headings.
//!
//! The tree mirrors the sidebar markup: every heading becomes an entry (a
//! list item), and a jump of more than one level gets a synthetic container
//! per skipped level (a nested list without its own item). Thus a child is
//! always exactly one level below its parent.

use crate::types::Heading;

/// Level of the outermost list in the sidebar.
pub const ROOT_LEVEL: u8 = 2;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Sidebar entry for the heading at this index
    Entry { heading_index: usize },
    /// Synthetic level with no heading of its own
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    pub kind: NodeKind,
    pub level: u8,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub expanded: bool,
    /// Entry carries a fold toggle control
    pub has_toggle: bool,
}

impl HeaderNode {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    pub fn heading_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Entry { heading_index } => Some(heading_index),
            NodeKind::Container => None,
        }
    }
}

/// Visual projection of a node's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeVisual {
    Container,
    Entry {
        expanded: bool,
        current: bool,
        toggle: bool,
    },
}

impl NodeVisual {
    /// Classes of the entry's `<li>`
    pub fn item_class(&self) -> &'static str {
        match self {
            NodeVisual::Entry { expanded: true, .. } => "header-item expanded",
            _ => "header-item",
        }
    }

    /// Classes of the entry's `<a>`
    pub fn link_class(&self) -> &'static str {
        match self {
            NodeVisual::Entry { current: true, .. } => "header-in-summary current-header",
            _ => "header-in-summary",
        }
    }
}

struct OpenList {
    level: u8,
    owner: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTree {
    headings: Vec<Heading>,
    nodes: Vec<HeaderNode>,
    roots: Vec<NodeId>,
    by_heading: Vec<NodeId>,
    current: Option<usize>,
}

impl HeaderTree {
    /// Builds the tree; `None` when there is nothing to show.
    pub fn build(headings: Vec<Heading>, fold_level: u8) -> Option<Self> {
        let first_level = headings.first()?.level;

        let mut tree = Self {
            nodes: Vec::with_capacity(headings.len()),
            roots: Vec::new(),
            by_heading: Vec::with_capacity(headings.len()),
            current: None,
            headings: Vec::new(),
        };

        let mut stack = vec![OpenList {
            level: ROOT_LEVEL,
            owner: None,
        }];
        for level in ROOT_LEVEL + 1..=first_level {
            tree.open_nested(&mut stack, level);
        }

        for (index, heading) in headings.iter().enumerate() {
            let level = heading.level;
            let current_level = stack.last().map(|open| open.level).unwrap_or(ROOT_LEVEL);

            if level > current_level {
                for next_level in current_level + 1..=level {
                    tree.open_nested(&mut stack, next_level);
                }
            } else if level < current_level {
                while stack.len() > 1 && stack.last().is_some_and(|open| open.level > level) {
                    stack.pop();
                }
            }

            let has_toggle = level >= fold_level
                && headings
                    .get(index + 1)
                    .is_some_and(|next| next.level > level);
            let owner = stack.last().and_then(|open| open.owner);
            let id = tree.push_node(
                owner,
                NodeKind::Entry {
                    heading_index: index,
                },
                level,
                level < fold_level,
                has_toggle,
            );
            tree.by_heading.push(id);
        }

        tree.headings = headings;
        log::debug!(
            "Built header tree: {} headings, {} nodes",
            tree.headings.len(),
            tree.nodes.len()
        );
        Some(tree)
    }

    /// Opens the list for `level` inside the last entry of the current list,
    /// or inside a new synthetic container when that list is still empty.
    fn open_nested(&mut self, stack: &mut Vec<OpenList>, level: u8) {
        let top_owner = stack.last().and_then(|open| open.owner);
        let owner = match self.list(top_owner).last().copied() {
            Some(last) => last,
            None => self.push_node(top_owner, NodeKind::Container, level - 1, true, false),
        };
        stack.push(OpenList {
            level,
            owner: Some(owner),
        });
    }

    fn push_node(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        level: u8,
        expanded: bool,
        has_toggle: bool,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(HeaderNode {
            kind,
            level,
            parent,
            children: Vec::new(),
            expanded,
            has_toggle,
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn list(&self, owner: Option<NodeId>) -> &[NodeId] {
        match owner {
            Some(id) => &self.nodes[id].children,
            None => &self.roots,
        }
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&HeaderNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn heading(&self, id: NodeId) -> Option<&Heading> {
        self.node(id)
            .and_then(HeaderNode::heading_index)
            .and_then(|index| self.headings.get(index))
    }

    pub fn node_for_heading(&self, heading_index: usize) -> Option<NodeId> {
        self.by_heading.get(heading_index).copied()
    }

    pub fn heading_index_by_id(&self, id: &str) -> Option<usize> {
        self.headings.iter().position(|heading| heading.id == id)
    }

    /// Index of the heading marked current
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_heading(&self) -> Option<&Heading> {
        self.current.and_then(|index| self.headings.get(index))
    }

    /// Drops the current marker and collapses every toggle-controlled entry.
    pub fn clear_resolver_state(&mut self) {
        self.current = None;
        for node in self.nodes.iter_mut().filter(|node| node.has_toggle) {
            node.expanded = false;
        }
    }

    /// Marks a heading current and expands its entry and every enclosing entry.
    pub fn mark_current(&mut self, heading_index: usize) -> bool {
        let Some(mut cursor) = self.node_for_heading(heading_index) else {
            return false;
        };
        self.current = Some(heading_index);
        loop {
            let node = &mut self.nodes[cursor];
            if !node.is_container() {
                node.expanded = true;
            }
            match node.parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        true
    }

    /// User-driven fold toggle. Shares the flag with the resolver, so a
    /// manually opened group collapses again once another header becomes current.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.has_toggle => {
                node.expanded = !node.expanded;
                true
            }
            _ => false,
        }
    }

    pub fn visual(&self, id: NodeId) -> Option<NodeVisual> {
        let node = self.node(id)?;
        Some(match node.kind {
            NodeKind::Container => NodeVisual::Container,
            NodeKind::Entry { heading_index } => NodeVisual::Entry {
                expanded: node.expanded,
                current: self.current == Some(heading_index),
                toggle: node.has_toggle,
            },
        })
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut cursor = self.node(id).and_then(|node| node.parent);
        while let Some(parent) = cursor {
            result.push(parent);
            cursor = self.nodes[parent].parent;
        }
        result
    }
}
