// src/view/mod.rs
//! A small view tree. Renderers build [`Node`]s from state; the tree is
//! serialized to HTML only at the edge.

pub mod render;

pub use render::{
    render_classification, render_distribution_chart, render_loading, render_notification, render_page,
    render_question_list, render_report_preview, render_upload_result,
};

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(&'static str, String)>,
    /// CSS custom properties (`--name: value`), the only inline styling used.
    pub vars: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

const VOID_TAGS: [&str; 4] = ["input", "br", "meta", "link"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, ..Default::default() }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn class_if(self, cond: bool, class: impl Into<String>) -> Self {
        if cond { self.class(class) } else { self }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn var(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.vars.push((name, value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.vars.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }

    /// Depth-first search for descendants carrying `class`.
    pub fn find_by_class<'a>(&'a self, class: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_by_class(class, &mut found);
        found
    }

    fn collect_by_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(e) = child {
                if e.has_class(class) {
                    found.push(e);
                }
                e.collect_by_class(class, found);
            }
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            Node::Element(e) if e.id.as_deref() == Some(id) => Some(e),
            Node::Element(e) => e.find_by_id(id),
            Node::Text(_) => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !self.vars.is_empty() {
            let style: Vec<String> = self.vars.iter().map(|(n, v)| format!("--{}: {}", n, v)).collect();
            let _ = write!(out, " style=\"{}\"", escape(&style.join("; ")));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.write_html(out),
            Node::Text(t) => out.push_str(&escape(t)),
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_output_is_escaped() {
        let el = Element::new("div")
            .id("q1")
            .class("question-item")
            .attr("data-level", "L1-\"Remember\"")
            .var("level-color", "#FF6B6B")
            .text("<script>alert(1)</script>");
        assert_eq!(
            el.to_html(),
            "<div id=\"q1\" class=\"question-item\" data-level=\"L1-&quot;Remember&quot;\" \
             style=\"--level-color: #FF6B6B\">&lt;script&gt;alert(1)&lt;/script&gt;</div>"
        );
    }

    #[test]
    fn test_void_elements_have_no_close_tag() {
        let el = Element::new("input").attr("type", "file");
        assert_eq!(el.to_html(), "<input type=\"file\">");
    }

    #[test]
    fn test_queries() {
        let tree = Element::new("section")
            .child(Element::new("span").class("badge").text("A"))
            .child(Element::new("div").child(Element::new("span").class("badge").id("b").text("B")));
        assert_eq!(tree.find_by_class("badge").len(), 2);
        assert_eq!(tree.find_by_id("b").unwrap().text_content(), "B");
        assert_eq!(tree.text_content(), "AB");
    }
}
