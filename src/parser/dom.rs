//! html5ever tree sink and the owned element tree the card extractor walks.
//!
//! html5ever does the tokenizing, entity decoding and HTML5 tree
//! construction (implied end tags, foster parenting, raw text elements).
//! The sink records the source line of every element so strict parsing can
//! point at a card.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName};

/// Parse an HTML document into an owned element tree rooted at `#root`.
pub(crate) fn parse_html(html: &str) -> Element {
    let document = parse_document(CardSink::default(), ParseOpts::default()).one(html);
    let mut root = Element {
        name: "#root".to_string(),
        ..Element::default()
    };
    for child in document.children.borrow().iter() {
        append_owned(&mut root, child);
    }
    root
}

fn append_owned(parent: &mut Element, node: &DomNode) {
    match &node.data {
        DomData::Text(text) => {
            let text = text.borrow();
            if !text.is_empty() {
                parent.children.push(Node::Text(text.to_string()));
            }
        }
        DomData::Element { name, attrs, line } => {
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let mut element = Element::new(&name.local, attrs, *line);
            for child in node.children.borrow().iter() {
                append_owned(&mut element, child);
            }
            parent.children.push(Node::Element(element));
        }
        DomData::Document | DomData::Comment => {}
    }
}

/// A node of the parsed tree.
#[derive(Debug)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Default)]
pub(crate) struct Element {
    pub(crate) name: String,
    /// 1-based source line of the start tag
    pub(crate) line: usize,
    pub(crate) classes: Vec<String>,
    attrs: Vec<(String, String)>,
    pub(crate) children: Vec<Node>,
}

impl Element {
    fn new(name: &str, attrs: Vec<(String, String)>, line: usize) -> Self {
        let classes = attrs
            .iter()
            .find(|(k, _)| k == "class")
            .map(|(_, v)| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        Self {
            name: name.to_ascii_lowercase(),
            line,
            classes,
            attrs,
            children: Vec::new(),
        }
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant matching `pred`, depth first.
    pub(crate) fn find_first(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_first(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Text with `<strong>`/`<b>` and inline `<code>` turned back into
    /// emphasis markers.
    pub(crate) fn inline_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => match e.name.as_str() {
                    "strong" | "b" => {
                        out.push_str("**");
                        out.push_str(&e.inline_text());
                        out.push_str("**");
                    }
                    "code" => {
                        out.push('`');
                        out.push_str(&e.raw_text());
                        out.push('`');
                    }
                    "br" => out.push(' '),
                    _ => out.push_str(&e.inline_text()),
                },
            }
        }
        out
    }

    /// Text content with whitespace preserved.
    pub(crate) fn raw_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) if e.name == "br" => out.push('\n'),
                Node::Element(e) => out.push_str(&e.raw_text()),
            }
        }
        out
    }
}

type Handle = Rc<DomNode>;

enum DomData {
    Document,
    Element {
        name: QualName,
        attrs: RefCell<Vec<Attribute>>,
        line: usize,
    },
    Text(RefCell<StrTendril>),
    Comment,
}

struct DomNode {
    data: DomData,
    parent: RefCell<Option<Weak<DomNode>>>,
    children: RefCell<Vec<Handle>>,
}

impl DomNode {
    fn new(data: DomData) -> Handle {
        Rc::new(Self {
            data,
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }

    fn parent(&self) -> Option<Handle> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }
}

fn append_child(parent: &Handle, child: Handle) {
    *child.parent.borrow_mut() = Some(Rc::downgrade(parent));
    parent.children.borrow_mut().push(child);
}

/// Append text, merging with a trailing text node.
fn append_text(parent: &Handle, text: &StrTendril) {
    if let Some(last) = parent.children.borrow().last() {
        if let DomData::Text(existing) = &last.data {
            existing.borrow_mut().push_tendril(text);
            return;
        }
    }
    append_child(parent, DomNode::new(DomData::Text(RefCell::new(text.clone()))));
}

fn detach(target: &Handle) {
    if let Some(parent) = target.parent() {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, target));
    }
    *target.parent.borrow_mut() = None;
}

/// TreeSink that builds an `Rc` node tree and stamps elements with the
/// line the tokenizer was on.
struct CardSink {
    document: Handle,
    line: Cell<u64>,
}

impl Default for CardSink {
    fn default() -> Self {
        Self {
            document: DomNode::new(DomData::Document),
            line: Cell::new(1),
        }
    }
}

impl TreeSink for CardSink {
    type Handle = Handle;
    type Output = Handle;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("HTML parse error on line {}: {}", self.line.get(), msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };
        match &target.data {
            DomData::Element { name, .. } => name,
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        DomNode::new(DomData::Element {
            name,
            attrs: RefCell::new(attrs),
            line: self.line.get() as usize,
        })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        DomNode::new(DomData::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        DomNode::new(DomData::Comment)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => append_child(parent, node),
            NodeOrText::AppendText(text) => append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if element.parent().is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn set_current_line(&self, line_number: u64) {
        self.line.set(line_number);
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let Some(parent) = sibling.parent() else {
            return;
        };
        let node = match new_node {
            NodeOrText::AppendNode(node) => {
                detach(&node);
                node
            }
            NodeOrText::AppendText(text) => DomNode::new(DomData::Text(RefCell::new(text))),
        };
        *node.parent.borrow_mut() = Some(Rc::downgrade(&parent));
        let mut children = parent.children.borrow_mut();
        let at = children
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(children.len());
        children.insert(at, node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        if let DomData::Element {
            attrs: existing, ..
        } = &target.data
        {
            let mut existing = existing.borrow_mut();
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = std::mem::take(&mut *node.children.borrow_mut());
        for child in children {
            append_child(new_parent, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(root: &Element) -> &Element {
        root.find_first(&|e: &Element| e.name == "body").unwrap()
    }

    #[test]
    fn test_document_skeleton() {
        let root = parse_html("<p>Hello</p>");
        let html = root.elements().next().unwrap();
        assert_eq!(html.name, "html");
        let p = body(&root).elements().next().unwrap();
        assert_eq!(p.name, "p");
        assert_eq!(p.raw_text(), "Hello");
    }

    #[test]
    fn test_classes_and_attributes() {
        let root = parse_html(r#"<meta name="Author" content="Lina"><div class="card  active" id="c1"></div>"#);
        let div = root.find_first(&|e: &Element| e.name == "div").unwrap();
        assert!(div.has_class("card"));
        assert!(div.has_class("active"));
        assert_eq!(div.attr("id"), Some("c1"));
        let meta = root.find_first(&|e: &Element| e.name == "meta").unwrap();
        assert_eq!(meta.attr("name"), Some("Author"));
        assert_eq!(meta.attr("content"), Some("Lina"));
    }

    #[test]
    fn test_paragraph_closed_by_list() {
        let root = parse_html("<div><p>Intro<ul><li>a<li>b</ul></div>");
        let div = root.find_first(&|e: &Element| e.name == "div").unwrap();
        let names: Vec<&str> = div.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["p", "ul"]);
        let ul = div.elements().nth(1).unwrap();
        assert_eq!(ul.elements().filter(|e| e.name == "li").count(), 2);
    }

    #[test]
    fn test_entities_decoded() {
        let root = parse_html("<p>a &lt;b&gt; &#65;&#x42; &amp; &quot;q&quot;</p>");
        let p = root.find_first(&|e: &Element| e.name == "p").unwrap();
        assert_eq!(p.raw_text(), "a <b> AB & \"q\"");
    }

    #[test]
    fn test_inline_markers() {
        let root = parse_html("<p>Use <b>cargo</b> and <code>rustc</code><br>now</p>");
        let p = root.find_first(&|e: &Element| e.name == "p").unwrap();
        assert_eq!(p.inline_text(), "Use **cargo** and `rustc` now");
    }

    #[test]
    fn test_element_lines() {
        let root = parse_html("<html>\n<body>\n<div class=\"card\">\n<h2>x</h2>\n</div>");
        let div = root.find_first(&|e: &Element| e.name == "div").unwrap();
        assert_eq!(div.line, 3);
        let h2 = div.elements().next().unwrap();
        assert_eq!(h2.line, 4);
    }

    #[test]
    fn test_table_rows_under_tbody() {
        let root = parse_html("<table><tr><th>K</th></tr><tr><td>v</td></tr></table>");
        let table = root.find_first(&|e: &Element| e.name == "table").unwrap();
        let tbody = table.elements().next().unwrap();
        assert_eq!(tbody.name, "tbody");
        assert_eq!(tbody.elements().count(), 2);
    }
}
