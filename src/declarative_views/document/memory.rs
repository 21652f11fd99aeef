use super::{Document, QueryError, TemplateNode};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// A selector understood by [`MemoryDocument`].
#[derive(Debug, PartialEq, Eq)]
struct SimpleSelector<'a> {
    tag: Option<&'a str>,
    id: Option<&'a str>,
    class: Option<&'a str>,
}

impl<'a> SimpleSelector<'a> {
    /// Parses `tag`, `#id`, `.class`, `tag#id` and `tag.class`.
    fn parse(selector: &'a str) -> Result<Self, QueryError> {
        let invalid = || QueryError::InvalidSelector(selector.to_string());
        if selector.is_empty() {
            return Err(invalid());
        }

        let (tag, rest) = match selector.find(['#', '.']) {
            Some(0) => (None, selector),
            Some(pos) => (Some(&selector[..pos]), &selector[pos..]),
            None => (Some(selector), ""),
        };

        let (id, class) = if let Some(id) = rest.strip_prefix('#') {
            (Some(id), None)
        } else if let Some(class) = rest.strip_prefix('.') {
            (None, Some(class))
        } else {
            (None, None)
        };

        let ident_ok = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if tag.is_some_and(|t| !ident_ok(t))
            || id.is_some_and(|i| !ident_ok(i))
            || class.is_some_and(|c| !ident_ok(c))
        {
            return Err(invalid());
        }

        Ok(Self { tag, id, class })
    }

    fn matches(&self, node: &TemplateNode) -> bool {
        self.tag
            .map_or(true, |tag| node.tag_name().eq_ignore_ascii_case(tag))
            && self.id.map_or(true, |id| node.attribute("id") == Some(id))
            && self.class.map_or(true, |class| {
                node.attribute("class")
                    .is_some_and(|list| list.split_whitespace().any(|c| c == class))
            })
    }
}

/// An in-memory document holding attached template nodes.
///
/// Nodes sit in a `RefCell` so the attribute cache can be written back
/// through a shared reference.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocument {
    nodes: RefCell<Vec<TemplateNode>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a node to the document.
    pub fn insert(&mut self, node: TemplateNode) {
        self.nodes.get_mut().push(node.attached());
    }

    /// Builder-style [`MemoryDocument::insert`].
    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.insert(node);
        self
    }

    /// Detaches every node matching `selector`. Returns how many were removed.
    pub fn remove(&mut self, selector: &str) -> Result<usize, QueryError> {
        let parsed = SimpleSelector::parse(selector)?;
        let nodes = self.nodes.get_mut();
        let before = nodes.len();
        nodes.retain(|node| !parsed.matches(node));
        Ok(before - nodes.len())
    }

    /// Mutable access to the first node matching `selector`.
    pub fn node_mut(&mut self, selector: &str) -> Result<Option<&mut TemplateNode>, QueryError> {
        let parsed = SimpleSelector::parse(selector)?;
        Ok(self.nodes.get_mut().iter_mut().find(|node| parsed.matches(node)))
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }
}

impl Document for MemoryDocument {
    fn query(&self, selector: &str) -> Result<Option<TemplateNode>, QueryError> {
        let parsed = SimpleSelector::parse(selector)?;
        Ok(self
            .nodes
            .borrow()
            .iter()
            .find(|node| parsed.matches(node))
            .cloned())
    }

    fn sync_attribute_cache(&self, selector: &str, data: &BTreeMap<String, Value>) {
        let Ok(parsed) = SimpleSelector::parse(selector) else {
            return;
        };
        if let Some(node) = self
            .nodes
            .borrow_mut()
            .iter_mut()
            .find(|node| parsed.matches(node))
        {
            *node.data_mut() = data.clone();
        }
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// Builds script-tag templates the way pages usually embed them.
    pub struct DocumentFixture {
        pub document: MemoryDocument,
    }

    impl Default for DocumentFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DocumentFixture {
        pub fn new() -> Self {
            Self {
                document: MemoryDocument::new(),
            }
        }

        /// A `<script type="text/x-template" id=...>` holding `html`.
        pub fn with_template(mut self, id: &str, html: &str) -> Self {
            self.document.insert(
                TemplateNode::new("script")
                    .with_attribute("type", "text/x-template")
                    .with_attribute("id", id)
                    .with_inner_html(html),
            );
            self
        }

        /// A template carrying all four default el-defining attributes.
        pub fn with_declarative_template(
            mut self,
            id: &str,
            tag_name: &str,
            class_name: &str,
            el_id: &str,
            attributes_json: &str,
        ) -> Self {
            self.document.insert(
                TemplateNode::new("script")
                    .with_attribute("type", "text/x-template")
                    .with_attribute("id", id)
                    .with_attribute("data-tag-name", tag_name)
                    .with_attribute("data-class-name", class_name)
                    .with_attribute("data-id", el_id)
                    .with_attribute("data-attributes", attributes_json)
                    .with_inner_html(format!("<p>{}</p>", id)),
            );
            self
        }

        pub fn build(self) -> MemoryDocument {
            self.document
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::DocumentFixture;
    use super::*;

    #[test]
    fn test_query_by_id() {
        let doc = DocumentFixture::new()
            .with_template("list", "<li></li>")
            .build();
        let node = doc.query("#list").unwrap().unwrap();
        assert_eq!(node.inner_html(), "<li></li>");
        assert!(node.is_attached());
    }

    #[test]
    fn test_query_missing_is_none() {
        let doc = MemoryDocument::new();
        assert_eq!(doc.query("#doesNotExist").unwrap(), None);
    }

    #[test]
    fn test_query_by_tag_class_and_compound() {
        let doc = MemoryDocument::new()
            .with_node(TemplateNode::new("template").with_attribute("class", "a b"))
            .with_node(TemplateNode::new("script").with_attribute("id", "s"));

        assert!(doc.query(".b").unwrap().is_some());
        assert!(doc.query("template.a").unwrap().is_some());
        assert!(doc.query("script#s").unwrap().is_some());
        assert!(doc.query("template#s").unwrap().is_none());
        assert!(doc.query("script").unwrap().is_some());
    }

    #[test]
    fn test_markup_is_not_a_selector() {
        let doc = MemoryDocument::new();
        assert!(matches!(
            doc.query("<p>hi</p>"),
            Err(QueryError::InvalidSelector(_))
        ));
        assert!(doc.query("").is_err());
        assert!(doc.query("#").is_err());
    }

    #[test]
    fn test_sync_attribute_cache_writes_back() {
        let doc = DocumentFixture::new().with_template("t", "").build();
        let mut data = BTreeMap::new();
        data.insert("tagName".to_string(), Value::from("ul"));

        doc.sync_attribute_cache("#t", &data);
        doc.sync_attribute_cache("<p>not a selector</p>", &BTreeMap::new());

        assert_eq!(doc.query("#t").unwrap().unwrap().data(), &data);
    }

    #[test]
    fn test_node_mut_and_remove() {
        let mut doc = DocumentFixture::new().with_template("t", "old").build();
        doc.node_mut("#t").unwrap().unwrap().set_inner_html("new");
        assert_eq!(doc.query("#t").unwrap().unwrap().inner_html(), "new");

        assert_eq!(doc.remove("#t").unwrap(), 1);
        assert!(doc.is_empty());
    }
}
