//! Element tree for workbook XML.
//!
//! The tree keeps what the metric queries need: element names, attributes
//! in document order, and children (elements interleaved with text) in
//! document order. It is built once by the parser and never mutated
//! afterwards.

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data (entity references already resolved)
    Text(String),
}

impl Node {
    /// The element, if this node is one.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// The text, if this node is character data.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create a new element with no attributes or children
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Qualified tag name, exactly as written (e.g. `datasource`, `user:ui-builder`)
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order
    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Get attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check if element has attribute
    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Whether the attribute is present with exactly this value
    #[inline]
    pub fn attribute_equals(&self, name: &str, value: &str) -> bool {
        self.attribute(name) == Some(value)
    }

    /// All children, elements and text, in document order
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Direct child elements with the given tag name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |child| child.name == name)
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children.iter().filter_map(Node::as_text).collect()
    }

    /// Every element below this one, depth-first in document order.
    ///
    /// The element itself is not included.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Every element below this one with the given tag name
    pub fn descendants_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |element| element.name == name)
    }

    pub(crate) fn push_attribute(&mut self, key: String, value: String) {
        self.attributes.push((key, value));
    }

    pub(crate) fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append character data, merging with a preceding text node
    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Drop the trailing text node if it holds only whitespace
    pub(crate) fn discard_trailing_whitespace(&mut self) {
        if let Some(Node::Text(last)) = self.children.last()
            && last.trim().is_empty()
        {
            self.children.pop();
        }
    }
}

/// Pre-order iterator over the descendant elements of an [`Element`].
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                },
                Some(Node::Text(_)) => {},
                None => {
                    self.stack.pop();
                },
            }
        }
    }
}
