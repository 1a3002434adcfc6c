//! Vocabulary patterns.
//!
//! A fragment declaration ("verb", "preposition" or "entity") attaches
//! one or more synonym patterns built from word sequences, alternation
//! and optional parts. Patterns live in an arena and are addressed by
//! index, which keeps the alternation trees free of ownership cycles and
//! cheap to share between synonyms.

use ali_module::normalize;

use crate::CompileError;

/// The three fragment kinds of the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// A verb phrase; commands start with one.
    Verb,
    /// A preposition linking two entities.
    Preposition,
    /// An entity phrase.
    Entity,
}

/// Index of a pattern node in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

/// One node of a vocabulary pattern.
#[derive(Debug, Clone)]
pub(crate) enum PatternNode {
    /// A single canonical word.
    Word(String),
    /// Two patterns in sequence.
    Seq(NodeId, NodeId),
    /// Either of two patterns.
    Alt(NodeId, NodeId),
    /// A pattern or nothing.
    Opt(NodeId),
}

/// Arena of pattern nodes.
#[derive(Debug, Default)]
pub(crate) struct PatternArena {
    nodes: Vec<PatternNode>,
}

impl PatternArena {
    pub fn node(&self, id: NodeId) -> &PatternNode {
        &self.nodes[id.0]
    }

    fn add(&mut self, node: PatternNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn word(&mut self, word: &str) -> NodeId {
        self.add(PatternNode::Word(word.to_owned()))
    }

    pub fn seq(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add(PatternNode::Seq(left, right))
    }

    pub fn alt(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add(PatternNode::Alt(left, right))
    }

    pub fn opt(&mut self, inner: NodeId) -> NodeId {
        self.add(PatternNode::Opt(inner))
    }

    /// Normalize fragment text and expand it into a sequence of
    /// single-word nodes.
    pub fn fragment(&mut self, text: &str) -> Result<NodeId, CompileError> {
        let canonical = normalize(text);
        if canonical.is_empty() {
            return Err(CompileError::EmptyFragment);
        }
        let mut words = canonical.split(' ');
        let first = words.next().map(|w| self.word(w));
        let mut node = match first {
            Some(node) => node,
            None => return Err(CompileError::EmptyFragment),
        };
        for word in words {
            let next = self.word(word);
            node = self.seq(node, next);
        }
        Ok(node)
    }

    /// Whether `id` matches exactly the canonical word span.
    pub fn matches(&self, id: NodeId, span: &[&str]) -> bool {
        match self.node(id) {
            PatternNode::Word(word) => span.len() == 1 && span[0] == word,
            PatternNode::Seq(left, right) => (0..=span.len()).any(|split| {
                self.matches(*left, &span[..split]) && self.matches(*right, &span[split..])
            }),
            PatternNode::Alt(left, right) => {
                self.matches(*left, span) || self.matches(*right, span)
            }
            PatternNode::Opt(inner) => span.is_empty() || self.matches(*inner, span),
        }
    }
}

/// The declared patterns of one fragment kind, indexed by fragment id.
///
/// A slot is `None` until the fragment's first synonym arrives; further
/// synonyms fold in as alternatives.
#[derive(Debug, Default)]
pub(crate) struct FragmentTable {
    patterns: Vec<Option<NodeId>>,
}

impl FragmentTable {
    /// Declare a new fragment, returning its id.
    pub fn declare(&mut self) -> usize {
        self.patterns.push(None);
        self.patterns.len() - 1
    }

    /// Number of declared fragments.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Attach a synonym pattern to the most recent fragment.
    pub fn add_synonym(&mut self, arena: &mut PatternArena, node: NodeId) -> Option<usize> {
        let slot = self.patterns.last_mut()?;
        *slot = Some(match *slot {
            None => node,
            Some(existing) => arena.alt(existing, node),
        });
        Some(self.patterns.len() - 1)
    }

    /// The pattern of fragment `id`, if it has one.
    pub fn pattern(&self, id: usize) -> Option<NodeId> {
        self.patterns.get(id).copied().flatten()
    }

    /// Find the unique fragment whose pattern matches the span.
    ///
    /// `Ok(None)` when nothing matches; an error when more than one
    /// fragment does.
    pub fn resolve(
        &self,
        arena: &PatternArena,
        span: &[&str],
    ) -> Result<Option<usize>, Ambiguous> {
        let mut found = None;
        for (id, pattern) in self.patterns.iter().enumerate() {
            let Some(pattern) = pattern else { continue };
            if !arena.matches(*pattern, span) {
                continue;
            }
            if found.is_some() {
                return Err(Ambiguous);
            }
            found = Some(id);
        }
        Ok(found)
    }
}

/// Marker error: a span matched more than one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ambiguous;
