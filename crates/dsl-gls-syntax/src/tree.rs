//! Owned article tree produced by [`parse`](crate::parse).
//!
//! The tree is deliberately plain: a node is either a run of decoded text or
//! an element with a tag name, one unparsed attribute string and children.
//! Renderers interpret the attribute string themselves.

/// A node of the article tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Decoded text with escapes already resolved.
    Text(String),
    /// A tag and everything between its opening and closing marks.
    Element(Element),
}

/// A tag node: `[name attrs]children[/name]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name as written, case preserved (`b`, `m1`, `!trs`, `'`).
    pub name: String,
    /// Everything after the name inside the opening bracket, trimmed.
    pub attrs: String,
    pub children: Vec<Node>,
}

impl Node {
    /// Concatenates all descendant text, ignoring tags.
    pub fn render_as_text(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element.render_as_text(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>, attrs: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: attrs.into(),
            children: Vec::new(),
        }
    }

    /// The unnamed element every parse result is rooted at.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Concatenates all descendant text, ignoring tags.
    pub fn render_as_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Appends text, merging with a trailing text child.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_as_text_ignores_tags() {
        let mut bold = Element::new("b", "");
        bold.push_text("bar");
        let mut root = Element::root();
        root.push_text("foo ");
        root.push_element(bold);
        root.push_text("!");

        assert_eq!(root.render_as_text(), "foo bar!");
    }

    #[test]
    fn push_text_merges_adjacent_runs() {
        let mut root = Element::root();
        root.push_text("a");
        root.push_text("b");
        root.push_text("");
        assert_eq!(root.children, vec![Node::Text("ab".into())]);
    }
}
