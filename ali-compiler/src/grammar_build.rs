//! Lowering vocabulary patterns to grammar rule sets.
//!
//! Each structural pattern node becomes a rule set: a sequence becomes
//! one two-reference rule, an alternation two one-reference rules, and
//! an optional part an empty rule next to a one-reference rule. Rule
//! sets are canonicalized (rules sorted) and deduplicated, so two
//! fragments with the same shape share one non-terminal. Children are
//! lowered before the set that references them, which makes the
//! non-recursion invariant of the format hold by construction.

use ali_module::{Rule, RuleSet, SymbolRef};

use crate::pattern::{PatternArena, PatternNode};
use crate::tables::Interner;

/// Accumulates the word table and grammar rule sets during compilation.
#[derive(Debug, Default)]
pub(crate) struct GrammarBuilder {
    words: Interner,
    sets: Vec<RuleSet>,
}

impl GrammarBuilder {
    /// The canonical word table accumulated so far.
    pub fn words(&self) -> &Interner {
        &self.words
    }

    /// Number of rule sets accumulated so far.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Consume the builder, yielding `(words, rule sets)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<RuleSet>) {
        (self.words.into_items(), self.sets)
    }

    /// Lower a pattern to the symbol that derives exactly its phrases.
    pub fn lower(&mut self, arena: &PatternArena, id: crate::pattern::NodeId) -> SymbolRef {
        match arena.node(id) {
            PatternNode::Word(word) => SymbolRef::Terminal(self.words.intern(word)),
            PatternNode::Seq(left, right) => {
                let left = self.lower(arena, *left);
                let right = self.lower(arena, *right);
                self.add_set(RuleSet::new(vec![Rule::new(vec![left, right])]))
            }
            PatternNode::Alt(left, right) => {
                let left = self.lower(arena, *left);
                let right = self.lower(arena, *right);
                self.add_set(RuleSet::new(vec![
                    Rule::new(vec![left]),
                    Rule::new(vec![right]),
                ]))
            }
            PatternNode::Opt(inner) => {
                let inner = self.lower(arena, *inner);
                self.add_set(RuleSet::new(vec![Rule::empty(), Rule::new(vec![inner])]))
            }
        }
    }

    /// Canonicalize a rule set and reuse an existing equal one if any.
    fn add_set(&mut self, mut set: RuleSet) -> SymbolRef {
        set.canonicalize();
        let index = self
            .sets
            .iter()
            .position(|existing| *existing == set)
            .unwrap_or_else(|| {
                self.sets.push(set);
                self.sets.len() - 1
            });
        SymbolRef::NonTerminal(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_shared_terminals() {
        let mut arena = PatternArena::default();
        let mut builder = GrammarBuilder::default();

        let a = arena.fragment("look").unwrap();
        let b = arena.fragment("look").unwrap();
        assert_eq!(builder.lower(&arena, a), SymbolRef::Terminal(0));
        assert_eq!(builder.lower(&arena, b), SymbolRef::Terminal(0));
        assert_eq!(builder.words().len(), 1);
        assert_eq!(builder.len(), 0);
    }

    #[test]
    fn equal_rule_sets_are_shared() {
        let mut arena = PatternArena::default();
        let mut builder = GrammarBuilder::default();

        // "go north" twice, via separate pattern nodes.
        let first = arena.fragment("go north").unwrap();
        let second = arena.fragment("go north").unwrap();
        let first_sym = builder.lower(&arena, first);
        let second_sym = builder.lower(&arena, second);
        assert_eq!(first_sym, second_sym);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn alternation_order_is_canonical() {
        let mut arena = PatternArena::default();
        let mut builder = GrammarBuilder::default();

        // a|b and b|a lower to the same rule set.
        let a1 = arena.fragment("a").unwrap();
        let b1 = arena.fragment("b").unwrap();
        let ab = arena.alt(a1, b1);
        let a2 = arena.fragment("a").unwrap();
        let b2 = arena.fragment("b").unwrap();
        let ba = arena.alt(b2, a2);

        assert_eq!(builder.lower(&arena, ab), builder.lower(&arena, ba));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn optional_lowers_to_empty_rule() {
        let mut arena = PatternArena::default();
        let mut builder = GrammarBuilder::default();

        let the = arena.fragment("the").unwrap();
        let opt = arena.opt(the);
        let sym = builder.lower(&arena, opt);

        let SymbolRef::NonTerminal(index) = sym else {
            panic!("optional must lower to a non-terminal");
        };
        let (_, sets) = builder.into_parts();
        assert_eq!(
            sets[index].rules,
            vec![Rule::empty(), Rule::new(vec![SymbolRef::Terminal(0)])]
        );
    }
}
