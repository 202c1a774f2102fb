//! Element Tree
//!
//! Arena-backed element tree with the text/tail model. Nodes are addressed by
//! [`NodeId`] indices and carry an explicit parent link, so "is my parent one
//! of X" checks and tail splicing need no back-references, and cloning the
//! whole tree for a pristine backup is a plain `Vec` copy.
//!
//! ## Text vs Tail
//!
//! Every element has:
//! - **Text**: text content BEFORE the first child element
//! - **Tail**: text content AFTER the element's closing tag, which belongs to
//!   the parent's content stream
//!
//! ```html
//! <div>
//!   TEXT HERE          <!-- This is div's "text" -->
//!   <span>inner</span>
//!   TAIL HERE          <!-- This is span's "tail" -->
//! </div>
//! ```
//!
//! An empty string stands for "no text". Removed nodes stay in the arena but
//! are unreachable from the root.

use std::fmt::Write as _;

/// Stable index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    tail: String,
    processed: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Element tree arena.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Bumped whenever a node loses its parent.
    revision: u64,
}

/// Joins two text fragments, inserting a space only when neither side
/// already provides whitespace at the seam.
#[must_use]
pub fn join_text(left: &str, right: &str) -> String {
    if left.is_empty() {
        return right.to_string();
    }
    if right.is_empty() {
        return left.to_string();
    }
    let seam_has_space = left.ends_with(char::is_whitespace) || right.starts_with(char::is_whitespace);
    if seam_has_space {
        format!("{left}{right}")
    } else {
        format!("{left} {right}")
    }
}

impl Tree {
    /// Creates a tree holding a single root element.
    #[must_use]
    pub fn new(root_tag: &str) -> Self {
        let root = Node {
            tag: root_tag.to_string(),
            ..Node::default()
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            revision: 0,
        }
    }

    /// Root element.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached element.
    pub fn element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        id
    }

    /// Creates an element and appends it to `parent`.
    pub fn sub_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.element(tag);
        self.append(parent, id);
        id
    }

    /// Appends `child` as last child of `parent`, detaching it from any
    /// previous parent. The child's tail moves with it.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` at `index` among the children of `parent`.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
            self.revision += 1;
        }
    }

    // --- accessors ---

    /// Tag name.
    #[inline]
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    /// Renames the element.
    pub fn set_tag(&mut self, id: NodeId, tag: &str) {
        tag.clone_into(&mut self.nodes[id.0].tag);
    }

    /// Returns `true` if the tag is one of `tags`.
    #[inline]
    #[must_use]
    pub fn is_tag(&self, id: NodeId, tags: &[&str]) -> bool {
        tags.contains(&self.tag(id))
    }

    /// Leading text.
    #[inline]
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    /// Replaces the leading text.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.0].text = text.into();
    }

    /// Tail text.
    #[inline]
    #[must_use]
    pub fn tail(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tail
    }

    /// Replaces the tail text.
    pub fn set_tail(&mut self, id: NodeId, tail: impl Into<String>) {
        self.nodes[id.0].tail = tail.into();
    }

    /// Attribute value.
    #[must_use]
    pub fn get(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value or the empty string.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> &str {
        self.get(id, name).unwrap_or("")
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attrs = &mut self.nodes[id.0].attributes;
        if let Some(slot) = attrs.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value;
        } else {
            attrs.push((name.to_string(), value));
        }
    }

    /// Removes an attribute.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        self.nodes[id.0].attributes.retain(|(k, _)| k != name);
    }

    /// Removes all attributes.
    pub fn clear_attributes(&mut self, id: NodeId) {
        self.nodes[id.0].attributes.clear();
    }

    /// Attributes in insertion order.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        &self.nodes[id.0].attributes
    }

    /// Parent element, `None` for the root and detached nodes.
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in document order.
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Returns `true` if the element has at least one child.
    #[inline]
    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    /// Next sibling element.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Previous sibling element.
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }


    // --- processed marker ---

    /// Returns `true` once a handler has consumed the node.
    #[inline]
    #[must_use]
    pub fn is_processed(&self, id: NodeId) -> bool {
        self.nodes[id.0].processed
    }

    /// Marks the node consumed. Never cleared.
    #[inline]
    pub fn mark_processed(&mut self, id: NodeId) {
        self.nodes[id.0].processed = true;
    }

    /// Marks the node and all its descendants consumed.
    pub fn mark_subtree_processed(&mut self, id: NodeId) {
        for node in self.iter(id) {
            self.nodes[node.0].processed = true;
        }
    }

    // --- traversal ---

    /// Pre-order snapshot of the subtree, including `id` itself.
    #[must_use]
    pub fn iter(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Pre-order snapshot of the descendants of `id`, excluding itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut all = self.iter(id);
        all.remove(0);
        all
    }

    /// Pre-order snapshot of the subtree elements whose tag is in `tags`,
    /// including `id` itself.
    #[must_use]
    pub fn iter_tags(&self, id: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.iter(id).into_iter().filter(|&n| self.is_tag(n, tags)).collect()
    }

    /// First descendant (excluding `id`) whose tag is in `tags`.
    #[must_use]
    pub fn find(&self, id: NodeId, tags: &[&str]) -> Option<NodeId> {
        self.descendants(id).into_iter().find(|&n| self.is_tag(n, tags))
    }

    /// Non-empty text fragments of the subtree in document order, joined by
    /// `separator`. The tail of `id` itself is not included.
    #[must_use]
    pub fn iter_text(&self, id: NodeId, separator: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        // (node, leaving): on leave, emit the tail unless it is the subtree root
        let mut stack = vec![(id, false)];
        while let Some((node, leaving)) = stack.pop() {
            if leaving {
                if node != id && !self.tail(node).is_empty() {
                    parts.push(self.tail(node));
                }
                continue;
            }
            if !self.text(node).is_empty() {
                parts.push(self.text(node));
            }
            stack.push((node, true));
            for &child in self.children(node).iter().rev() {
                stack.push((child, false));
            }
        }
        parts.join(separator)
    }

    /// Concatenated text of the subtree without separators.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.iter_text(id, "")
    }

    // --- structural edits ---

    /// Appends text at a text slot of `parent`: slot 0 is `parent.text`,
    /// slot `i` is the tail of the `i - 1`th child.
    fn push_slot(&mut self, parent: NodeId, slot: usize, text: &str, spaced: bool) {
        if text.is_empty() {
            return;
        }
        let target = if slot == 0 {
            &mut self.nodes[parent.0].text
        } else {
            let child = self.nodes[parent.0].children[slot - 1];
            &mut self.nodes[child.0].tail
        };
        if spaced {
            *target = join_text(target, text);
        } else {
            target.push_str(text);
        }
    }

    /// Appends text after the current last content of `parent`, that is to
    /// the tail of its last child or to its text when it has no children.
    /// A space is inserted when the seam has none.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let slot = self.children(parent).len();
        self.push_slot(parent, slot, text, true);
    }

    /// Same as [`Tree::append_text`], concatenating verbatim.
    pub fn push_text(&mut self, parent: NodeId, text: &str) {
        let slot = self.children(parent).len();
        self.push_slot(parent, slot, text, false);
    }

    /// Removes the element and its subtree. With `keep_tail`, the tail is
    /// spliced onto the previous sibling's tail or the parent's text.
    pub fn remove(&mut self, id: NodeId, keep_tail: bool) {
        let Some((parent, index)) = self.index_in_parent(id) else {
            return;
        };
        if keep_tail {
            let tail = std::mem::take(&mut self.nodes[id.0].tail);
            self.push_slot(parent, index, &tail, true);
        }
        self.detach(id);
    }

    /// Removes the element tag but keeps its text, children and tail in
    /// place, concatenated verbatim at the splice point.
    pub fn strip(&mut self, id: NodeId) {
        let Some((parent, index)) = self.index_in_parent(id) else {
            return;
        };
        let text = std::mem::take(&mut self.nodes[id.0].text);
        let tail = std::mem::take(&mut self.nodes[id.0].tail);
        let kids = std::mem::take(&mut self.nodes[id.0].children);
        self.nodes[parent.0].children.remove(index);
        self.nodes[id.0].parent = None;
        self.revision += 1;

        self.push_slot(parent, index, &text, false);
        for (offset, &kid) in kids.iter().enumerate() {
            self.nodes[kid.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + offset, kid);
        }
        self.push_slot(parent, index + kids.len(), &tail, false);
    }

    /// Strips every descendant of `id` whose tag is in `tags`.
    pub fn strip_tags(&mut self, id: NodeId, tags: &[&str]) {
        for node in self.descendants(id) {
            if self.is_tag(node, tags) {
                self.strip(node);
            }
        }
    }

    /// Removes every descendant of `id` whose tag is in `tags`.
    pub fn strip_elements(&mut self, id: NodeId, tags: &[&str], keep_tail: bool) {
        let mut scope = SubtreeScope::new(self, id);
        for node in self.descendants(id) {
            if self.is_tag(node, tags) && scope.contains(self, node) {
                self.remove(node, keep_tail);
            }
        }
    }

    /// Copies the subtree rooted at `id` into `dest` as a detached element.
    /// The tail of `id` is copied too; `processed` flags are not.
    pub fn copy_subtree(&self, id: NodeId, dest: &mut Tree) -> NodeId {
        let new_root = dest.element(self.tag(id));
        let mut stack = vec![(id, new_root)];
        while let Some((src, dst)) = stack.pop() {
            let node = &self.nodes[src.0];
            dest.nodes[dst.0].attributes.clone_from(&node.attributes);
            dest.nodes[dst.0].text.clone_from(&node.text);
            dest.nodes[dst.0].tail.clone_from(&node.tail);
            for &child in &node.children {
                let copy = dest.sub_element(dst, self.tag(child));
                stack.push((child, copy));
            }
        }
        new_root
    }

    /// Copies the subtree rooted at `id` into a new tree whose root it becomes.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Tree {
        let mut out = Tree::new(self.tag(id));
        let root = out.root();
        let node = &self.nodes[id.0];
        out.nodes[root.0].attributes.clone_from(&node.attributes);
        out.nodes[root.0].text.clone_from(&node.text);
        for &child in &node.children {
            let copy = self.copy_subtree(child, &mut out);
            out.append(root, copy);
        }
        out
    }

    /// Serializes the subtree as XML, with text escaped.
    #[must_use]
    pub fn to_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![(id, false)];
        while let Some((node, leaving)) = stack.pop() {
            let tag = self.tag(node);
            if leaving {
                let _ = write!(out, "</{tag}>");
                if node != id {
                    out.push_str(&escape(self.tail(node)));
                }
                continue;
            }
            out.push('<');
            out.push_str(tag);
            for (k, v) in self.attributes(node) {
                let _ = write!(out, " {k}=\"{}\"", escape(v));
            }
            if self.text(node).is_empty() && !self.has_children(node) {
                out.push_str("/>");
                if node != id {
                    out.push_str(&escape(self.tail(node)));
                }
                continue;
            }
            out.push('>');
            out.push_str(&escape(self.text(node)));
            stack.push((node, true));
            for &child in self.children(node).iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Answers "is this node still below `root`" while a snapshot of the
/// subtree is walked and edited.
///
/// A node found inside is remembered until the tree next detaches a node,
/// so a pre-order walk takes one parent step per node instead of a walk up
/// to the root.
#[derive(Debug)]
pub struct SubtreeScope {
    root: NodeId,
    /// `revision + 1` at which each node was last found inside; 0 is never.
    seen_at: Vec<u64>,
}

impl SubtreeScope {
    #[must_use]
    pub fn new(tree: &Tree, root: NodeId) -> Self {
        Self {
            root,
            seen_at: vec![0; tree.nodes.len()],
        }
    }

    /// Returns `true` if `id` is a strict descendant of the root.
    pub fn contains(&mut self, tree: &Tree, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let stamp = tree.revision + 1;
        if self.seen_at.len() < tree.nodes.len() {
            self.seen_at.resize(tree.nodes.len(), 0);
        }
        let mut path = vec![id];
        let inside = loop {
            let Some(&current) = path.last() else {
                break false;
            };
            match tree.parent(current) {
                None => break false,
                Some(parent) if parent == self.root || self.seen_at[parent.0] == stamp => break true,
                Some(parent) => path.push(parent),
            }
        };
        if inside {
            for node in path {
                self.seen_at[node.0] = stamp;
            }
        }
        inside
    }
}
