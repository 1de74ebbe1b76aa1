//! Coverage statistics: how much of the codebase's named surface
//! area is documented, and how much of the documentation's references
//! actually resolve to something real.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::DocumentationGraph;
use crate::models::{CodeEntity, DocReference, EntityKind};

/// Documented/total counts for a single [`EntityKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindCoverage {
    pub total: usize,
    pub documented: usize,
}

impl KindCoverage {
    /// `0.0` when there are no entities of this kind, matching the
    /// crate-wide convention that an empty denominator never divides by
    /// zero.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.documented as f64 / self.total as f64
        }
    }
}

/// Coverage over one analyzed tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageStats {
    pub total_entities: usize,
    pub documented_entities: usize,
    pub total_references: usize,
    pub linked_references: usize,
    pub by_kind: HashMap<EntityKind, KindCoverage>,
    pub by_file: HashMap<PathBuf, KindCoverage>,
    undocumented: Vec<CodeEntity>,
    broken: Vec<DocReference>,
}

impl CoverageStats {
    pub fn coverage_ratio(&self) -> f64 {
        if self.total_entities == 0 {
            0.0
        } else {
            self.documented_entities as f64 / self.total_entities as f64
        }
    }

    /// `100 * documented / total`, or `0` when there are no entities at all.
    pub fn coverage_percent(&self) -> f64 {
        self.coverage_ratio() * 100.0
    }

    /// Entities whose qualified name is not in the documented set.
    pub fn undocumented_entities(&self) -> &[CodeEntity] {
        &self.undocumented
    }

    /// References whose `(file, line)` key is not in the linked set.
    pub fn broken_references(&self) -> &[DocReference] {
        &self.broken
    }

    pub fn link_ratio(&self) -> f64 {
        if self.total_references == 0 {
            0.0
        } else {
            self.linked_references as f64 / self.total_references as f64
        }
    }

    /// Per-file documented/total counts. A file contributes no entry unless
    /// it has at least one entity.
    pub fn coverage_by_file(&self) -> &HashMap<PathBuf, KindCoverage> {
        &self.by_file
    }
}

/// Computes [`CoverageStats`] from a populated graph and the raw entity/
/// reference lists it was built from.
pub struct CoverageCalculator;

impl CoverageCalculator {
    pub fn compute(
        graph: &DocumentationGraph,
        entities: &[CodeEntity],
        references: &[DocReference],
    ) -> CoverageStats {
        let mut stats = CoverageStats {
            total_entities: entities.len(),
            total_references: references.len(),
            ..Default::default()
        };

        for entity in entities {
            let documented = graph.is_entity_documented(&entity.qualified_name());
            if documented {
                stats.documented_entities += 1;
            } else {
                stats.undocumented.push(entity.clone());
            }
            let kind_stats = stats.by_kind.entry(entity.kind).or_default();
            kind_stats.total += 1;
            if documented {
                kind_stats.documented += 1;
            }

            let file_stats = stats.by_file.entry(entity.location.file.clone()).or_default();
            file_stats.total += 1;
            if documented {
                file_stats.documented += 1;
            }
        }

        for reference in references {
            let clean = reference.clean_text();
            if graph.is_reference_linked(&reference.location.file, reference.location.line_start, &clean) {
                stats.linked_references += 1;
            } else {
                stats.broken.push(reference.clone());
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DocumentationGraph;
    use crate::models::{CodeDocLink, CodeFile, DocFile, Language, LinkKind, Location, ReferenceKind};
    use std::path::PathBuf;

    #[test]
    fn coverage_counts_documented_and_undocumented() {
        let mut code = CodeFile::new(PathBuf::from("src/app.py"), Language::Python);
        code.entities.push(CodeEntity::new("documented_fn", EntityKind::Function, Location::new("src/app.py", 1)));
        code.entities.push(CodeEntity::new("orphan_fn", EntityKind::Function, Location::new("src/app.py", 5)));

        let mut doc = DocFile::new(PathBuf::from("README.md"), crate::models::DocFormat::Markdown);
        doc.references.push(DocReference::new(
            "documented_fn",
            Location::new("README.md", 2),
            ReferenceKind::InlineCode,
        ));

        let mut graph = DocumentationGraph::new();
        graph.add_code_file(&code);
        graph.add_doc_file(&doc);
        graph.add_link(&CodeDocLink::new(
            "app.documented_fn",
            Location::new("README.md", 2),
            "documented_fn",
            LinkKind::Exact,
            1.0,
        ));

        let stats = CoverageCalculator::compute(&graph, &code.entities, &doc.references);
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.documented_entities, 1);
        assert_eq!(stats.undocumented_entities().len(), 1);
        assert_eq!(stats.undocumented_entities()[0].name, "orphan_fn");
        assert_eq!(stats.coverage_ratio(), 0.5);
        assert_eq!(stats.coverage_percent(), 50.0);
        assert_eq!(stats.linked_references, 1);
        assert!(stats.broken_references().is_empty());
    }

    #[test]
    fn empty_input_yields_zero_ratios_not_nan() {
        let stats = CoverageStats::default();
        assert_eq!(stats.coverage_ratio(), 0.0);
        assert_eq!(stats.coverage_percent(), 0.0);
        assert_eq!(stats.link_ratio(), 0.0);
    }

    #[test]
    fn coverage_by_file_excludes_files_with_zero_entities() {
        let mut code = CodeFile::new(PathBuf::from("src/app.py"), Language::Python);
        code.entities.push(CodeEntity::new("f", EntityKind::Function, Location::new("src/app.py", 1)));

        let doc = DocFile::new(PathBuf::from("README.md"), crate::models::DocFormat::Markdown);

        let mut graph = DocumentationGraph::new();
        graph.add_code_file(&code);
        graph.add_doc_file(&doc);

        let stats = CoverageCalculator::compute(&graph, &code.entities, &doc.references);
        let by_file = stats.coverage_by_file();
        assert!(by_file.contains_key(&PathBuf::from("src/app.py")));
        assert!(!by_file.contains_key(&PathBuf::from("README.md")));
    }

    #[test]
    fn broken_references_returns_the_unlinked_reference_set() {
        let code = CodeFile::new(PathBuf::from("src/app.py"), Language::Python);
        let mut doc = DocFile::new(PathBuf::from("README.md"), crate::models::DocFormat::Markdown);
        doc.references.push(DocReference::new("fake_func", Location::new("README.md", 1), ReferenceKind::InlineCode));

        let mut graph = DocumentationGraph::new();
        graph.add_code_file(&code);
        graph.add_doc_file(&doc);

        let stats = CoverageCalculator::compute(&graph, &code.entities, &doc.references);
        let broken = stats.broken_references();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].clean_text(), "fake_func");
    }
}
