//! Structure model: the merged trie of known parameters
//!
//! Nodes live in an arena owned by [`StructureModel`]; children are referenced
//! by [`NodeId`] and keyed by token name. There are no parent pointers,
//! ancestry is tracked by whoever walks the trie.

use crate::keypath::{ParamPath, Token, TokenKind, Wrap};
use crate::model::catalog::CatalogEntry;
use crate::model::value::DocValue;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Handle of a node inside a [`StructureModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Which input introduced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Chart,
    Catalog,
    Both,
}

impl Source {
    /// Combine the current source with an incoming one; never downgrades
    #[must_use]
    pub const fn merge(self, incoming: Self) -> Self {
        match (self, incoming) {
            (Self::Chart, Self::Chart) => Self::Chart,
            (Self::Catalog, Self::Catalog) => Self::Catalog,
            _ => Self::Both,
        }
    }
}

/// Catalog attributes attached to the terminal node of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Unrecognized record fields, carried verbatim
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, JsonValue>,
}

/// A vertex of the structure trie
#[derive(Debug, Clone)]
pub struct StructureNode {
    name: String,
    kind: TokenKind,
    children: BTreeMap<String, NodeId>,
    dynamic_children: Vec<NodeId>,
    index_child: Option<NodeId>,
    depth: usize,
    source: Option<Source>,
    data_type: Option<String>,
    description: Option<String>,
    metadata: Option<NodeMetadata>,
}

impl StructureNode {
    fn new(name: &str, kind: TokenKind, depth: usize, source: Option<Source>) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            children: BTreeMap::new(),
            dynamic_children: Vec::new(),
            index_child: None,
            depth,
            source,
            data_type: None,
            description: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Distance from the root; top-level parameters have depth 1
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// `None` only for the root
    #[must_use]
    pub const fn source(&self) -> Option<Source> {
        self.source
    }

    #[must_use]
    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    #[must_use]
    pub const fn is_array_element(&self) -> bool {
        matches!(self.kind, TokenKind::Index)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&NodeMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> &BTreeMap<String, NodeId> {
        &self.children
    }

    /// A node with children is a container (mapping or sequence)
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn set_data_type(&mut self, data_type: &str) {
        let weak = matches!(self.data_type.as_deref(), None | Some("null"));
        if weak {
            self.data_type = Some(data_type.to_owned());
        }
    }
}

/// The merged knowledge graph of known parameters
#[derive(Debug, Clone)]
pub struct StructureModel {
    nodes: Vec<StructureNode>,
}

impl Default for StructureModel {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureModel {
    /// Create a model holding only the root node
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![StructureNode::new("", TokenKind::Key, 0, None)],
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &StructureNode {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing but the root exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Return the child of `parent` named like `token`, creating it if needed.
    /// An existing child keeps its kind; its source is upgraded.
    pub fn ensure_child(&mut self, parent: NodeId, token: &Token, source: Source) -> NodeId {
        if let Some(&existing) = self.nodes[parent.0].children.get(token.name()) {
            let node = &mut self.nodes[existing.0];
            node.source = Some(node.source.map_or(source, |current| current.merge(source)));
            return existing;
        }

        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes
            .push(StructureNode::new(token.name(), token.kind(), depth, Some(source)));

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.insert(token.name().to_owned(), id);
        match token.kind() {
            TokenKind::Dynamic => parent_node.dynamic_children.push(id),
            TokenKind::Index => parent_node.index_child = Some(id),
            TokenKind::Key | TokenKind::Special => {}
        }
        id
    }

    /// Fold a parsed document into the trie.
    ///
    /// Mappings contribute one child per key. Sequences contribute a single
    /// `[N]` child shaped after their first element.
    pub fn ingest_document(&mut self, doc: &DocValue, source: Source) {
        let mut worklist: Vec<(NodeId, &DocValue)> = vec![(self.root(), doc)];

        while let Some((node, value)) = worklist.pop() {
            if node != self.root() {
                self.nodes[node.0].set_data_type(value.data_type());
            }
            match value {
                DocValue::Map(entries) => {
                    for (key, child_value) in entries {
                        let child = self.ensure_child(node, &Token::from_key(key), source);
                        worklist.push((child, child_value));
                    }
                }
                DocValue::Seq(items) => {
                    let element = self.ensure_child(node, &Token::index(), source);
                    if let Some(first) = items.first() {
                        worklist.push((element, first));
                    }
                }
                DocValue::Scalar(_) => {}
            }
        }
    }

    /// Walk every catalog entry's path, creating missing nodes; the terminal
    /// node receives the entry's metadata. Returns the number of entries
    /// ingested.
    pub fn ingest_catalog(&mut self, entries: &[CatalogEntry]) -> usize {
        let mut ingested = 0;
        for entry in entries {
            let tokens = entry.path.tokens();
            if tokens.is_empty() {
                continue;
            }

            let mut current = self.root();
            for (position, token) in tokens.iter().enumerate() {
                current = self.ensure_child(current, token, Source::Catalog);
                if let Some(next) = tokens.get(position + 1) {
                    let container = if next.kind() == TokenKind::Index {
                        "sequence"
                    } else {
                        "mapping"
                    };
                    self.nodes[current.0].set_data_type(container);
                }
            }

            let terminal = &mut self.nodes[current.0];
            if let Some(format) = entry.metadata.format.as_deref() {
                terminal.set_data_type(format);
            }
            if entry.description.is_some() {
                terminal.description.clone_from(&entry.description);
            }
            terminal.metadata = Some(entry.metadata.clone());
            ingested += 1;
        }
        ingested
    }

    /// One resolution step: exact name, else the first dynamic child,
    /// else the element child when `token` is an index.
    #[must_use]
    pub fn step(&self, node: NodeId, token: &Token) -> Option<NodeId> {
        let current = &self.nodes[node.0];
        if let Some(&child) = current.children.get(token.name()) {
            return Some(child);
        }
        if let Some(&dynamic) = current.dynamic_children.first() {
            return Some(dynamic);
        }
        if token.kind() == TokenKind::Index {
            return current.index_child;
        }
        None
    }

    /// Resolve a path from the root
    #[must_use]
    pub fn resolve(&self, path: &ParamPath) -> Option<NodeId> {
        self.resolve_from(self.root(), path.tokens())
    }

    /// Resolve `tokens` starting at `start`
    #[must_use]
    pub fn resolve_from(&self, start: NodeId, tokens: &[Token]) -> Option<NodeId> {
        tokens
            .iter()
            .try_fold(start, |node, token| self.step(node, token))
    }

    /// Up to `limit` canonical paths in depth-first pre-order
    #[must_use]
    pub fn trace_sample_paths(&self, limit: usize) -> Vec<ParamPath> {
        let mut samples = Vec::new();
        let mut stack: Vec<(NodeId, ParamPath)> = Vec::new();
        push_children(self, self.root(), &ParamPath::root(), &mut stack);

        while let Some((node, path)) = stack.pop() {
            if samples.len() >= limit {
                break;
            }
            push_children(self, node, &path, &mut stack);
            samples.push(path);
        }
        samples
    }
}

fn push_children(
    model: &StructureModel,
    node: NodeId,
    path: &ParamPath,
    stack: &mut Vec<(NodeId, ParamPath)>,
) {
    for &child in model.node(node).children.values().rev() {
        let child_node = model.node(child);
        let token = match child_node.kind {
            TokenKind::Index => Token::index(),
            TokenKind::Special => Token::special(&child_node.name, Wrap::DoubleQuote),
            TokenKind::Key | TokenKind::Dynamic => Token::from_key(&child_node.name),
        };
        stack.push((child, path.child(token)));
    }
}
