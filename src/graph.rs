//! The documentation graph: an undirected graph over file,
//! entity, and reference nodes, connected by containment edges (file→its
//! entities/references) and link edges (entity↔reference, produced by the
//! matcher). Node identities follow a `|`-delimited scheme so they round-trip
//! through the JSON output unambiguously.
//!
//! A typed `petgraph::Graph` plus a side `HashMap` from stable string id to
//! `NodeIndex`, since petgraph node indices are not meaningful identifiers
//! on their own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use tracing::warn;

use crate::models::{CodeDocLink, CodeFile, DocFile, EntityKind, LinkKind};

/// A node in the documentation graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    File(PathBuf),
    Entity { qualified_name: String, kind: EntityKind },
    Reference { file: PathBuf, line: usize, clean_text: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphEdge {
    Contains,
    Links { link_kind: LinkKind, confidence: f64 },
}

pub fn file_node_id(path: &Path) -> String {
    format!("file|{}", path.display())
}

pub fn entity_node_id(qualified_name: &str) -> String {
    format!("entity|{qualified_name}")
}

pub fn reference_node_id(file: &Path, line: usize, clean_text: &str) -> String {
    format!("ref|{}|{}|{}", file.display(), line, clean_text)
}

/// The documentation graph. Node ids are the `|`-delimited strings above;
/// [`NodeIndex`] is an internal implementation detail never exposed.
#[derive(Debug, Default)]
pub struct DocumentationGraph {
    graph: UnGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
}

impl DocumentationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_insert(&mut self, id: String, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    fn connect(&mut self, a: NodeIndex, b: NodeIndex, edge: GraphEdge) {
        if !self.graph.edges_connecting(a, b).any(|e| *e.weight() == edge) {
            self.graph.add_edge(a, b, edge);
        }
    }

    /// Add a code file's node, its entities' nodes, and the containment
    /// edges between them.
    pub fn add_code_file(&mut self, file: &CodeFile) {
        let file_idx = self.get_or_insert(file_node_id(&file.path), GraphNode::File(file.path.clone()));
        for entity in &file.entities {
            let qualified_name = entity.qualified_name();
            let entity_idx = self.get_or_insert(
                entity_node_id(&qualified_name),
                GraphNode::Entity { qualified_name, kind: entity.kind },
            );
            self.connect(file_idx, entity_idx, GraphEdge::Contains);
        }
    }

    /// Add a doc file's node, its references' nodes, and the containment
    /// edges between them.
    pub fn add_doc_file(&mut self, file: &DocFile) {
        let file_idx = self.get_or_insert(file_node_id(&file.path), GraphNode::File(file.path.clone()));
        for reference in &file.references {
            let clean = reference.clean_text();
            let ref_idx = self.get_or_insert(
                reference_node_id(&reference.location.file, reference.location.line_start, &clean),
                GraphNode::Reference {
                    file: reference.location.file.clone(),
                    line: reference.location.line_start,
                    clean_text: clean,
                },
            );
            self.connect(file_idx, ref_idx, GraphEdge::Contains);
        }
    }

    /// Add a matched code-doc link. Both endpoints must already exist (added
    /// via `add_code_file`/`add_doc_file`); if either is missing the link is
    /// dropped with a warning rather than silently fabricating a node.
    pub fn add_link(&mut self, link: &CodeDocLink) {
        let entity_id = entity_node_id(&link.entity_qualified_name);
        let ref_id = reference_node_id(
            &link.reference_location.file,
            link.reference_location.line_start,
            &link.reference_clean_text,
        );
        let (Some(&entity_idx), Some(&ref_idx)) = (self.index.get(&entity_id), self.index.get(&ref_id)) else {
            warn!("graph: dropping link with unknown endpoint: {entity_id} <-> {ref_id}");
            return;
        };
        self.connect(
            entity_idx,
            ref_idx,
            GraphEdge::Links { link_kind: link.link_kind, confidence: link.confidence },
        );
    }

    pub fn find_entity_by_qualified_name(&self, qualified_name: &str) -> Option<&GraphNode> {
        self.index.get(&entity_node_id(qualified_name)).map(|&idx| &self.graph[idx])
    }

    /// Every reference node linked to the named entity via a `Links` edge.
    pub fn documenting_refs(&self, qualified_name: &str) -> Vec<&GraphNode> {
        let Some(&idx) = self.index.get(&entity_node_id(qualified_name)) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .filter(|e| matches!(e.weight(), GraphEdge::Links { .. }))
            .map(|e| &self.graph[e.target()])
            .collect()
    }

    /// The entity node linked to the given reference, if any.
    pub fn documented_entity(&self, file: &Path, line: usize, clean_text: &str) -> Option<&GraphNode> {
        let idx = *self.index.get(&reference_node_id(file, line, clean_text))?;
        self.graph
            .edges(idx)
            .find(|e| matches!(e.weight(), GraphEdge::Links { .. }))
            .map(|e| &self.graph[e.target()])
    }

    pub fn is_entity_documented(&self, qualified_name: &str) -> bool {
        !self.documenting_refs(qualified_name).is_empty()
    }

    pub fn is_reference_linked(&self, file: &Path, line: usize, clean_text: &str) -> bool {
        self.documented_entity(file, line, clean_text).is_some()
    }

    /// Every reference node whose cleaned text exactly equals `name`,
    /// regardless of whether it is currently linked to an entity. Used to
    /// find documentation that still mentions a name no longer present in
    /// the code (e.g. after the entity it used to link to was deleted, so
    /// no `Links` edge for it can exist any more).
    pub fn references_by_text(&self, name: &str) -> Vec<&GraphNode> {
        self.graph
            .node_weights()
            .filter(|n| matches!(n, GraphNode::Reference { clean_text, .. } if clean_text == name))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Connected components of the whole graph, projected down to their file
    /// nodes. A file with no links to any other file's entities/references
    /// still forms its own singleton cluster if it has any node at all.
    /// Clusters are sorted by their lexicographically-smallest file path,
    /// and each cluster's files are sorted the same way.
    pub fn connected_file_clusters(&self) -> Vec<Vec<PathBuf>> {
        let mut uf = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_indices() {
            let (a, b) = self.graph.edge_endpoints(edge).unwrap();
            uf.union(a.index(), b.index());
        }

        let mut clusters: HashMap<usize, Vec<PathBuf>> = HashMap::new();
        for idx in self.graph.node_indices() {
            if let GraphNode::File(path) = &self.graph[idx] {
                let root = uf.find(idx.index());
                clusters.entry(root).or_default().push(path.clone());
            }
        }

        let mut out: Vec<Vec<PathBuf>> = clusters.into_values().collect();
        for cluster in &mut out {
            cluster.sort();
        }
        out.sort_by(|a, b| a.first().cmp(&b.first()));
        out
    }
}
