//! The reference matcher: matches documentation references to
//! code entities through a three-tier confidence cascade — exact name
//! match, then `parent.name`-style qualified match (falling back to a
//! weaker partial tier when the qualifier doesn't fit), then a trigram-
//! indexed substring match — with a flat confidence penalty for matches
//! found inside a fenced code block, since those are weaker evidence of an
//! intentional cross-reference than prose mentions.

use std::collections::{HashMap, HashSet};

use crate::models::{CodeDocLink, CodeEntity, DocReference, LinkKind, ReferenceKind};

/// Multiplier applied to a match's confidence when the reference came from a
/// fenced code block rather than prose, a link, or a header.
const CODE_BLOCK_PENALTY: f64 = 0.6;

const EXACT_CONFIDENCE: f64 = 1.0;
const QUALIFIED_CONFIDENCE: f64 = 0.9;
const QUALIFIED_FALLBACK_CONFIDENCE: f64 = 0.7;
const PARTIAL_CONFIDENCE: f64 = 0.5;
const MIN_PARTIAL_LENGTH: usize = 3;

fn trigrams(s: &str) -> HashSet<String> {
    let lower: Vec<char> = s.to_lowercase().chars().collect();
    if lower.len() < 3 {
        let mut set = HashSet::new();
        set.insert(lower.iter().collect());
        return set;
    }
    lower.windows(3).map(|w| w.iter().collect()).collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

fn substring_either_way(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a.contains(&b) || b.contains(&a)
}

/// Matches documentation references against a fixed set of code entities.
/// The trigram index is built once from the entity set and reused across
/// every reference in the run.
pub struct ReferenceMatcher<'a> {
    entities: &'a [CodeEntity],
    trigram_index: HashMap<String, Vec<usize>>,
    entity_trigrams: Vec<HashSet<String>>,
}

impl<'a> ReferenceMatcher<'a> {
    pub fn new(entities: &'a [CodeEntity]) -> Self {
        let mut trigram_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut entity_trigrams = Vec::with_capacity(entities.len());

        for (idx, entity) in entities.iter().enumerate() {
            let grams = trigrams(&entity.name);
            for gram in &grams {
                trigram_index.entry(gram.clone()).or_default().push(idx);
            }
            entity_trigrams.push(grams);
        }

        Self { entities, trigram_index, entity_trigrams }
    }

    /// Match one reference against the entity set, returning every link the
    /// cascade produces (exact returns every same-named entity; qualified
    /// and partial may also return more than one).
    pub fn match_reference(&self, reference: &DocReference) -> Vec<CodeDocLink> {
        let clean = reference.clean_text();
        if clean.is_empty() {
            return Vec::new();
        }

        let multiplier = if reference.kind == ReferenceKind::CodeBlock { CODE_BLOCK_PENALTY } else { 1.0 };

        self.find_matches(&clean)
            .into_iter()
            .map(|(entity, link_kind, confidence)| {
                CodeDocLink::new(entity.qualified_name(), reference.location.clone(), clean.clone(), link_kind, confidence * multiplier)
            })
            .collect()
    }

    /// Match every reference in `references`, in order, dropping unmatched
    /// ones.
    pub fn match_all(&self, references: &[DocReference]) -> Vec<CodeDocLink> {
        references.iter().flat_map(|r| self.match_reference(r)).collect()
    }

    fn find_matches(&self, clean: &str) -> Vec<(&CodeEntity, LinkKind, f64)> {
        let exact = self.exact_match(clean);
        if !exact.is_empty() {
            return exact;
        }

        let qualified = self.qualified_match(clean);
        if !qualified.is_empty() {
            return qualified;
        }

        if clean.chars().count() >= MIN_PARTIAL_LENGTH {
            return self.partial_match(clean);
        }

        Vec::new()
    }

    /// Every entity whose bare name equals `clean`, verbatim. The only stage
    /// that consults the bare-name index rather than qualified names.
    fn exact_match(&self, clean: &str) -> Vec<(&CodeEntity, LinkKind, f64)> {
        self.entities.iter().filter(|e| e.name == clean).map(|e| (e, LinkKind::Exact, EXACT_CONFIDENCE)).collect()
    }

    /// Entities whose bare name matches the last dot-separated segment of
    /// `clean`. Each becomes a `QUALIFIED` match if its full qualified name
    /// contains `clean`, else a weaker `PARTIAL` fallback.
    fn qualified_match(&self, clean: &str) -> Vec<(&CodeEntity, LinkKind, f64)> {
        if !clean.contains('.') {
            return Vec::new();
        }
        let last_segment = clean.rsplit('.').next().unwrap_or(clean);
        self.entities
            .iter()
            .filter(|e| e.name == last_segment)
            .map(|e| {
                if e.qualified_name().contains(clean) {
                    (e, LinkKind::Qualified, QUALIFIED_CONFIDENCE)
                } else {
                    (e, LinkKind::Partial, QUALIFIED_FALLBACK_CONFIDENCE)
                }
            })
            .collect()
    }

    /// Trigram-indexed candidates whose name is a case-insensitive substring
    /// of `clean` or vice versa, each at a flat confidence.
    fn partial_match(&self, clean: &str) -> Vec<(&CodeEntity, LinkKind, f64)> {
        let query_grams = trigrams(clean);
        let candidates: HashSet<usize> = if query_grams.is_empty() {
            (0..self.entities.len()).collect()
        } else {
            query_grams.iter().filter_map(|gram| self.trigram_index.get(gram)).flatten().copied().collect()
        };

        candidates
            .into_iter()
            .filter(|&idx| substring_either_way(clean, &self.entities[idx].name))
            .map(|idx| (&self.entities[idx], LinkKind::Partial, PARTIAL_CONFIDENCE))
            .collect()
    }

    /// The `limit` entities whose names are most trigram-similar to `name`,
    /// most similar first. Used for "possibly renamed to" suggestions when
    /// an entity disappears between commits.
    pub fn close_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let query_grams = trigrams(name);
        let mut scored: Vec<(f64, &CodeEntity)> = self
            .entities
            .iter()
            .zip(&self.entity_trigrams)
            .filter(|(e, _)| e.name != name)
            .map(|(e, grams)| (jaccard(&query_grams, grams), e))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        scored.into_iter().take(limit).map(|(_, e)| e.qualified_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, Location};

    fn entities() -> Vec<CodeEntity> {
        vec![
            CodeEntity::new("process_data", EntityKind::Function, Location::new("src/app.py", 10)),
            CodeEntity::new("run", EntityKind::Method, Location::new("src/app.py", 20)).with_parent("Worker"),
            CodeEntity::new("Worker", EntityKind::Class, Location::new("src/app.py", 5)),
            CodeEntity::new("process", EntityKind::Function, Location::new("src/utils.py", 3)),
        ]
    }

    fn single(matcher: &ReferenceMatcher, reference: &DocReference) -> CodeDocLink {
        let mut links = matcher.match_reference(reference);
        assert_eq!(links.len(), 1, "expected exactly one link, got {links:?}");
        links.remove(0)
    }

    #[test]
    fn exact_match_on_bare_name() {
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("process_data", Location::new("README.md", 1), ReferenceKind::InlineCode);
        let link = single(&matcher, &reference);
        assert_eq!(link.link_kind, LinkKind::Exact);
        assert_eq!(link.confidence, 1.0);
        assert_eq!(link.entity_qualified_name, "app.process_data");
    }

    #[test]
    fn exact_match_returns_every_same_named_entity() {
        let mut ents = entities();
        ents.push(CodeEntity::new("process_data", EntityKind::Function, Location::new("src/other.py", 1)));
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("process_data", Location::new("README.md", 1), ReferenceKind::InlineCode);
        let links = matcher.match_reference(&reference);
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.link_kind == LinkKind::Exact && l.confidence == 1.0));
    }

    #[test]
    fn qualified_match_on_parent_dot_name() {
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("Worker.run", Location::new("README.md", 1), ReferenceKind::InlineCode);
        let link = single(&matcher, &reference);
        assert_eq!(link.link_kind, LinkKind::Qualified);
        assert_eq!(link.confidence, 0.9);
        assert_eq!(link.entity_qualified_name, "app.Worker.run");
    }

    #[test]
    fn qualified_reference_to_module_function_is_not_exact() {
        // `utils.process` must not be treated as an exact match against the
        // bare-named entity `process` -- only a verbatim bare-name hit may
        // ever be EXACT.
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("utils.process", Location::new("README.md", 3), ReferenceKind::InlineCode);
        let link = single(&matcher, &reference);
        assert_eq!(link.link_kind, LinkKind::Qualified);
        assert_eq!(link.confidence, 0.9);
        assert_eq!(link.entity_qualified_name, "utils.process");
    }

    #[test]
    fn qualified_match_falls_back_to_partial_when_qualifier_does_not_fit() {
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("other.process", Location::new("README.md", 1), ReferenceKind::InlineCode);
        let link = single(&matcher, &reference);
        assert_eq!(link.link_kind, LinkKind::Partial);
        assert_eq!(link.confidence, 0.7);
    }

    #[test]
    fn partial_match_gets_code_block_penalty() {
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("process_dataa", Location::new("README.md", 1), ReferenceKind::CodeBlock);
        let link = single(&matcher, &reference);
        assert_eq!(link.link_kind, LinkKind::Partial);
        assert_eq!(link.confidence, PARTIAL_CONFIDENCE * CODE_BLOCK_PENALTY);
    }

    #[test]
    fn unrelated_text_does_not_match() {
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let reference = DocReference::new("completely_unrelated_xyz", Location::new("README.md", 1), ReferenceKind::InlineCode);
        assert!(matcher.match_reference(&reference).is_empty());
    }

    #[test]
    fn close_matches_excludes_self_and_ranks_by_similarity() {
        let ents = entities();
        let matcher = ReferenceMatcher::new(&ents);
        let matches = matcher.close_matches("process_dat", 5);
        assert!(matches.contains(&"app.process_data".to_string()));
    }
}
