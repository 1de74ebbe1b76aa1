//! Impact analysis: turns a commit's entity-level changes
//! into documentation impacts by checking each changed entity against the
//! documentation graph built from the tree's current doc state.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::{DocumentationGraph, GraphNode};
use crate::vcs::tracker::EntityChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    BrokenReference,
    PossiblyStale,
    NeedsUpdate,
    AddedUndocumented,
}

/// Fixed confidence assigned to each impact type, per the ground-truth
/// mapping this analyzer reproduces.
const CONFIDENCE_BROKEN_REFERENCE: f64 = 1.0;
const CONFIDENCE_SIGNATURE_CHANGED: f64 = 0.8;
const CONFIDENCE_DOCSTRING_CHANGED: f64 = 0.6;
const CONFIDENCE_UNDOCUMENTED: f64 = 1.0;

/// Urgency bucket an impact falls into, derived solely from its
/// [`ImpactType`] — never stored independently, always looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

fn severity_for(impact_type: ImpactType) -> Severity {
    match impact_type {
        ImpactType::BrokenReference => Severity::High,
        ImpactType::PossiblyStale => Severity::Medium,
        ImpactType::NeedsUpdate => Severity::Low,
        ImpactType::AddedUndocumented => Severity::Low,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationImpact {
    pub entity_qualified_name: String,
    pub impact_type: ImpactType,
    pub confidence: f64,
    pub severity: Severity,
    pub doc_path: PathBuf,
    pub doc_line: usize,
    pub description: String,
}

/// `(file, line)` locations of every reference documenting `qualified_name`,
/// found by following `Links` edges from its entity node.
fn referencing_doc_locations(graph: &DocumentationGraph, qualified_name: &str) -> Vec<(PathBuf, usize)> {
    graph
        .documenting_refs(qualified_name)
        .into_iter()
        .filter_map(|node| match node {
            GraphNode::Reference { file, line, .. } => Some((file.clone(), *line)),
            _ => None,
        })
        .collect()
}

/// Like [`referencing_doc_locations`], but matches by bare name against
/// every reference node in the graph rather than following `Links` edges. A
/// deleted entity has no node of its own in a graph built from the tree
/// after its removal, so it can never have a `Links` edge; this is the only
/// way to tell whether documentation still mentions it by name.
fn referencing_doc_locations_by_name(graph: &DocumentationGraph, name: &str) -> Vec<(PathBuf, usize)> {
    graph
        .references_by_text(name)
        .into_iter()
        .filter_map(|node| match node {
            GraphNode::Reference { file, line, .. } => Some((file.clone(), *line)),
            _ => None,
        })
        .collect()
}

fn dedup_locations(locations: Vec<(PathBuf, usize)>) -> Vec<(PathBuf, usize)> {
    let mut seen = HashSet::new();
    locations.into_iter().filter(|loc| seen.insert(loc.clone())).collect()
}

/// Maps a commit's [`EntityChange`]s to documentation impacts, consulting
/// `graph` (built from the tree's current documentation) to tell whether an
/// affected entity is actually documented anywhere. One impact is emitted
/// per referencing doc location, deduplicated by `(file, line)`.
pub struct ImpactAnalyzer;

impl ImpactAnalyzer {
    pub fn analyze(changes: &[EntityChange], graph: &DocumentationGraph) -> Vec<DocumentationImpact> {
        changes.iter().flat_map(|change| Self::analyze_one(change, graph)).collect()
    }

    fn analyze_one(change: &EntityChange, graph: &DocumentationGraph) -> Vec<DocumentationImpact> {
        match change {
            EntityChange::Added(entity) => {
                if graph.is_entity_documented(&entity.qualified_name()) {
                    return Vec::new();
                }
                vec![Self::build(
                    entity.qualified_name(),
                    ImpactType::AddedUndocumented,
                    CONFIDENCE_UNDOCUMENTED,
                    format!("{} was added and has no documentation referencing it", entity.name),
                    PathBuf::new(),
                    0,
                )]
            }
            EntityChange::Deleted(entity) => {
                let mut locations = referencing_doc_locations(graph, &entity.qualified_name());
                if locations.is_empty() {
                    locations = referencing_doc_locations_by_name(graph, &entity.name);
                }
                dedup_locations(locations)
                    .into_iter()
                    .map(|(path, line)| {
                        Self::build(
                            entity.qualified_name(),
                            ImpactType::BrokenReference,
                            CONFIDENCE_BROKEN_REFERENCE,
                            format!("{} was deleted but is still referenced in documentation", entity.name),
                            path,
                            line,
                        )
                    })
                    .collect()
            }
            EntityChange::SignatureChanged { after, .. } => {
                dedup_locations(referencing_doc_locations(graph, &after.qualified_name()))
                    .into_iter()
                    .map(|(path, line)| {
                        Self::build(
                            after.qualified_name(),
                            ImpactType::PossiblyStale,
                            CONFIDENCE_SIGNATURE_CHANGED,
                            format!("{}'s signature changed; referencing documentation may need updating", after.name),
                            path,
                            line,
                        )
                    })
                    .collect()
            }
            EntityChange::DocstringChanged { after, .. } => {
                dedup_locations(referencing_doc_locations(graph, &after.qualified_name()))
                    .into_iter()
                    .map(|(path, line)| {
                        Self::build(
                            after.qualified_name(),
                            ImpactType::NeedsUpdate,
                            CONFIDENCE_DOCSTRING_CHANGED,
                            format!("{}'s docstring changed; referencing documentation may be stale", after.name),
                            path,
                            line,
                        )
                    })
                    .collect()
            }
            // Implementation-only changes don't affect documentation.
            EntityChange::BodyChanged { .. } => Vec::new(),
        }
    }

    fn build(
        entity_qualified_name: String,
        impact_type: ImpactType,
        confidence: f64,
        description: String,
        doc_path: PathBuf,
        doc_line: usize,
    ) -> DocumentationImpact {
        DocumentationImpact {
            entity_qualified_name,
            impact_type,
            confidence,
            severity: severity_for(impact_type),
            doc_path,
            doc_line,
            description,
        }
    }
}
