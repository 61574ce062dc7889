//! Graph entity values: nodes, relationships, and paths between them.
//!
//! These are flat records, not a back-pointer object graph — a
//! [`Relationship`] knows the ids of its endpoints but doesn't hold a
//! reference to them. [`Path`] assembly is the one place endpoints get
//! rebound (see [`Path::assemble`]), and that happens once, before the path
//! escapes the unpacker; the emitted `Path` is immutable afterwards.

use super::map::OrderedMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: OrderedMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: i64,
    pub element_id: String,
    pub start_id: i64,
    pub start_element_id: String,
    pub end_id: i64,
    pub end_element_id: String,
    pub rel_type: String,
    pub properties: OrderedMap,
}

impl Relationship {
    /// Swap start/end, used once when a path traverses this relationship
    /// against its natural direction. Internal to path assembly.
    fn reversed(mut self) -> Self {
        std::mem::swap(&mut self.start_id, &mut self.end_id);
        std::mem::swap(&mut self.start_element_id, &mut self.end_element_id);
        self
    }
}

/// A relationship as it appears in a `Path`'s `unique_rels_without_endpoints`
/// list: the wire form omits start/end ids since those are supplied by the
/// path's traversal sequence instead.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundRelationship {
    pub id: i64,
    pub element_id: String,
    pub rel_type: String,
    pub properties: OrderedMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathElement {
    Node(Node),
    Relationship(Relationship),
}

/// An alternating node/relationship/node/.../node sequence of odd length.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    elements: Vec<PathElement>,
}

#[derive(Debug, thiserror::Error)]
pub enum PathAssemblyError {
    #[error("path sequence index {0} is out of range")]
    IndexOutOfRange(i64),
    #[error("path sequence must have an even number of entries")]
    OddSequenceLength,
}

impl Path {
    /// Reconstruct a path from its wire representation: the unique nodes and
    /// unbound relationships it references, plus a flat `sequence` of
    /// `(rel_index, node_index)` pairs. `rel_index` is 1-based; negative
    /// means the relationship was traversed against its stored direction,
    /// which swaps its start/end binding before placement.
    pub fn assemble(
        nodes: Vec<Node>,
        rels: Vec<UnboundRelationship>,
        sequence: &[i64],
    ) -> Result<Path, PathAssemblyError> {
        if !sequence.len().is_multiple_of(2) {
            return Err(PathAssemblyError::OddSequenceLength);
        }
        let mut elements = Vec::with_capacity(sequence.len() + 1);
        let mut current = nodes
            .first()
            .cloned()
            .ok_or(PathAssemblyError::IndexOutOfRange(0))?;
        elements.push(PathElement::Node(current.clone()));

        for pair in sequence.chunks_exact(2) {
            let (rel_idx, node_idx) = (pair[0], pair[1]);
            let reversed = rel_idx < 0;
            let rel_pos = (rel_idx.unsigned_abs() as usize)
                .checked_sub(1)
                .ok_or(PathAssemblyError::IndexOutOfRange(rel_idx))?;
            let unbound = rels
                .get(rel_pos)
                .cloned()
                .ok_or(PathAssemblyError::IndexOutOfRange(rel_idx))?;
            let next = nodes
                .get(node_idx as usize)
                .cloned()
                .ok_or(PathAssemblyError::IndexOutOfRange(node_idx))?;

            let (start, end) = if reversed {
                (&next, &current)
            } else {
                (&current, &next)
            };
            let bound = Relationship {
                id: unbound.id,
                element_id: unbound.element_id,
                start_id: start.id,
                start_element_id: start.element_id.clone(),
                end_id: end.id,
                end_element_id: end.element_id.clone(),
                rel_type: unbound.rel_type,
                properties: unbound.properties,
            };
            let bound = if reversed { bound.reversed() } else { bound };

            elements.push(PathElement::Relationship(bound));
            elements.push(PathElement::Node(next.clone()));
            current = next;
        }

        Ok(Path { elements })
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Node(n) => Some(n),
            _ => None,
        })
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Relationship(r) => Some(r),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64) -> Node {
        Node {
            id,
            element_id: format!("n{id}"),
            labels: vec![],
            properties: OrderedMap::new(),
        }
    }

    fn rel(id: i64) -> UnboundRelationship {
        UnboundRelationship {
            id,
            element_id: format!("r{id}"),
            rel_type: "KNOWS".into(),
            properties: OrderedMap::new(),
        }
    }

    #[test]
    fn reconstructs_path_with_reversed_segment() {
        // n0 -[r1]-> n1 <-[r2]- n0, i.e. sequence [1, 1, -2, 0]
        let nodes = vec![node(0), node(1), node(2)];
        let rels = vec![rel(1), rel(2)];
        let path = Path::assemble(nodes, rels, &[1, 1, -2, 0]).unwrap();

        assert_eq!(path.len(), 5);
        let relationships: Vec<&Relationship> = path.relationships().collect();
        assert_eq!(relationships.len(), 2);

        // r1 bound n0 -> n1
        assert_eq!(relationships[0].start_id, 0);
        assert_eq!(relationships[0].end_id, 1);

        // r2 bound n0 -> n1, then reversed to n1 -> n0
        assert_eq!(relationships[1].start_id, 1);
        assert_eq!(relationships[1].end_id, 0);
    }

    #[test]
    fn odd_sequence_is_rejected() {
        let nodes = vec![node(0)];
        let rels = vec![];
        assert!(matches!(
            Path::assemble(nodes, rels, &[1]),
            Err(PathAssemblyError::OddSequenceLength)
        ));
    }
}
