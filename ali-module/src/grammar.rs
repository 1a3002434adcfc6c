//! Context-free grammar tables and the span recognizer.
//!
//! A grammar is an array of rule sets, one per non-terminal. Rules are
//! sequences of symbol references. The format guarantees the grammar is
//! non-recursive: a rule set may only reference lower-indexed rule sets,
//! which both bounds the naive recognizer and allows nullability to be
//! computed in a single forward pass.

use crate::ModuleError;

/// A reference to a grammar symbol: a terminal (word index), a
/// non-terminal (rule set index), or none.
///
/// Wire encoding: `0` is none, a positive `k` is non-terminal `k - 1`,
/// and a negative `k` is terminal `-1 - k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolRef {
    /// No symbol; derives exactly the empty span.
    None,
    /// A word index into the module's word table.
    Terminal(usize),
    /// A rule set index into the grammar.
    NonTerminal(usize),
}

impl SymbolRef {
    /// Decode the wire representation.
    pub fn decode(raw: i32) -> SymbolRef {
        match raw {
            0 => SymbolRef::None,
            k if k > 0 => SymbolRef::NonTerminal((k - 1) as usize),
            k => SymbolRef::Terminal((-1i64 - k as i64) as usize),
        }
    }

    /// Encode to the wire representation.
    pub fn encode(&self) -> i32 {
        match *self {
            SymbolRef::None => 0,
            SymbolRef::NonTerminal(index) => index as i32 + 1,
            SymbolRef::Terminal(index) => -1 - index as i32,
        }
    }
}

/// One production rule: a sequence of symbol references that must derive
/// contiguous sub-spans in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// The symbol references, left to right.
    pub refs: Vec<SymbolRef>,
}

impl Rule {
    /// A rule over the given references.
    pub fn new(refs: Vec<SymbolRef>) -> Self {
        Rule { refs }
    }

    /// The empty rule, which derives the empty span.
    pub fn empty() -> Self {
        Rule { refs: Vec::new() }
    }
}

/// The production rules of one non-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSet {
    /// The alternative rules.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// A rule set over the given rules, in stored order.
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    /// Sort the rules into the canonical order used for rule set
    /// deduplication.
    pub fn canonicalize(&mut self) {
        self.rules.sort();
    }
}

/// The grammar: rule sets indexed by non-terminal, plus per-non-terminal
/// nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    sets: Vec<RuleSet>,
    nullable: Vec<bool>,
}

impl Grammar {
    /// Build a grammar, validating every reference: terminals must index
    /// into a word table of `num_words` entries, and a rule set may only
    /// reference strictly lower-indexed rule sets.
    pub fn new(sets: Vec<RuleSet>, num_words: usize) -> Result<Self, ModuleError> {
        for (index, set) in sets.iter().enumerate() {
            for rule in &set.rules {
                for reference in &rule.refs {
                    match *reference {
                        SymbolRef::None => {}
                        SymbolRef::Terminal(w) if w >= num_words => {
                            return Err(ModuleError::SymbolOutOfRange {
                                reference: reference.encode(),
                            })
                        }
                        SymbolRef::Terminal(_) => {}
                        SymbolRef::NonTerminal(target) if target >= index => {
                            return Err(ModuleError::ForwardReference { index, target })
                        }
                        SymbolRef::NonTerminal(_) => {}
                    }
                }
            }
        }

        // The non-recursion invariant makes one forward pass sufficient.
        let mut nullable = Vec::with_capacity(sets.len());
        for set in &sets {
            let set_nullable = set.rules.iter().any(|rule| {
                rule.refs.iter().all(|reference| match *reference {
                    SymbolRef::None => true,
                    SymbolRef::Terminal(_) => false,
                    SymbolRef::NonTerminal(target) => nullable[target],
                })
            });
            nullable.push(set_nullable);
        }

        Ok(Grammar { sets, nullable })
    }

    /// Number of non-terminals.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the grammar has no rule sets.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The rule sets, indexed by non-terminal.
    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.sets
    }

    /// Whether non-terminal `index` derives the empty span.
    pub fn is_nullable(&self, index: usize) -> bool {
        self.nullable[index]
    }

    /// Whether a symbol reference derives the empty span.
    pub fn symbol_is_nullable(&self, reference: SymbolRef) -> bool {
        match reference {
            SymbolRef::None => true,
            SymbolRef::Terminal(_) => false,
            SymbolRef::NonTerminal(index) => self.nullable[index],
        }
    }

    /// Whether `symbol` derives exactly the token span.
    ///
    /// Terminals match a single equal token; a non-terminal matches iff
    /// one of its rules does; a rule of `k` references matches iff the
    /// span splits into `k` contiguous (possibly empty) sub-spans each
    /// matched by its reference. Backtracking terminates because the
    /// grammar is non-recursive.
    pub fn derives(&self, symbol: SymbolRef, tokens: &[usize]) -> bool {
        match symbol {
            SymbolRef::None => tokens.is_empty(),
            SymbolRef::Terminal(word) => tokens.len() == 1 && tokens[0] == word,
            SymbolRef::NonTerminal(index) => self.sets[index]
                .rules
                .iter()
                .any(|rule| self.rule_derives(&rule.refs, tokens)),
        }
    }

    fn rule_derives(&self, refs: &[SymbolRef], tokens: &[usize]) -> bool {
        match refs.split_first() {
            None => tokens.is_empty(),
            Some((first, rest)) => (0..=tokens.len()).any(|split| {
                self.derives(*first, &tokens[..split]) && self.rule_derives(rest, &tokens[split..])
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SymbolRef::{NonTerminal, Terminal};

    fn rule(refs: &[SymbolRef]) -> Rule {
        Rule::new(refs.to_vec())
    }

    /// 0: "LOOK" | "EXAMINE"; 1: [] | "THE"; 2: <1> "LAMP"; 3: <0> <2>
    fn sample() -> Grammar {
        Grammar::new(
            vec![
                RuleSet::new(vec![rule(&[Terminal(0)]), rule(&[Terminal(1)])]),
                RuleSet::new(vec![Rule::empty(), rule(&[Terminal(2)])]),
                RuleSet::new(vec![rule(&[NonTerminal(1), Terminal(3)])]),
                RuleSet::new(vec![rule(&[NonTerminal(0), NonTerminal(2)])]),
            ],
            4,
        )
        .unwrap()
    }

    #[test]
    fn wire_encoding_round_trip() {
        for reference in [
            SymbolRef::None,
            Terminal(0),
            Terminal(41),
            NonTerminal(0),
            NonTerminal(7),
        ] {
            assert_eq!(SymbolRef::decode(reference.encode()), reference);
        }
        assert_eq!(SymbolRef::decode(0), SymbolRef::None);
        assert_eq!(SymbolRef::decode(1), NonTerminal(0));
        assert_eq!(SymbolRef::decode(-1), Terminal(0));
    }

    #[test]
    fn terminal_matches_single_token() {
        let g = sample();
        assert!(g.derives(Terminal(0), &[0]));
        assert!(!g.derives(Terminal(0), &[1]));
        assert!(!g.derives(Terminal(0), &[]));
        assert!(!g.derives(Terminal(0), &[0, 0]));
    }

    #[test]
    fn none_matches_empty_span() {
        let g = sample();
        assert!(g.derives(SymbolRef::None, &[]));
        assert!(!g.derives(SymbolRef::None, &[0]));
    }

    #[test]
    fn optional_article() {
        let g = sample();
        // LOOK LAMP
        assert!(g.derives(NonTerminal(3), &[0, 3]));
        // EXAMINE THE LAMP
        assert!(g.derives(NonTerminal(3), &[1, 2, 3]));
        // THE LAMP alone is not a command
        assert!(!g.derives(NonTerminal(3), &[2, 3]));
        assert!(!g.derives(NonTerminal(3), &[]));
    }

    #[test]
    fn nullability() {
        let g = sample();
        assert!(!g.is_nullable(0));
        assert!(g.is_nullable(1));
        assert!(!g.is_nullable(2));
        assert!(!g.is_nullable(3));
        assert!(g.symbol_is_nullable(SymbolRef::None));
        assert!(!g.symbol_is_nullable(Terminal(0)));
    }

    #[test]
    fn nullability_through_chain() {
        // 0: [] ; 1: <0> <0> ; 2: <1> "X"
        let g = Grammar::new(
            vec![
                RuleSet::new(vec![Rule::empty()]),
                RuleSet::new(vec![rule(&[NonTerminal(0), NonTerminal(0)])]),
                RuleSet::new(vec![rule(&[NonTerminal(1), Terminal(0)])]),
            ],
            1,
        )
        .unwrap();
        assert!(g.is_nullable(0));
        assert!(g.is_nullable(1));
        assert!(!g.is_nullable(2));
        assert!(g.derives(NonTerminal(2), &[0]));
    }

    #[test]
    fn forward_and_self_references_are_rejected() {
        let self_ref = Grammar::new(vec![RuleSet::new(vec![rule(&[NonTerminal(0)])])], 0);
        assert_eq!(
            self_ref,
            Err(ModuleError::ForwardReference { index: 0, target: 0 })
        );

        let forward = Grammar::new(
            vec![
                RuleSet::new(vec![rule(&[NonTerminal(1)])]),
                RuleSet::new(vec![Rule::empty()]),
            ],
            0,
        );
        assert_eq!(
            forward,
            Err(ModuleError::ForwardReference { index: 0, target: 1 })
        );
    }

    #[test]
    fn terminal_out_of_range_is_rejected() {
        let g = Grammar::new(vec![RuleSet::new(vec![rule(&[Terminal(4)])])], 4);
        assert_eq!(g, Err(ModuleError::SymbolOutOfRange { reference: -5 }));
    }

    #[test]
    fn derivation_is_stable_under_appended_rule_sets() {
        let g = sample();
        let mut sets = g.rule_sets().to_vec();
        sets.push(RuleSet::new(vec![rule(&[Terminal(0), Terminal(0)])]));
        let extended = Grammar::new(sets, 4).unwrap();

        for tokens in [&[0usize, 3][..], &[1, 2, 3], &[2, 3], &[0], &[]] {
            assert_eq!(
                g.derives(NonTerminal(3), tokens),
                extended.derives(NonTerminal(3), tokens),
            );
        }
    }

    #[test]
    fn canonical_order_sorts_by_kind_then_index() {
        let mut set = RuleSet::new(vec![
            rule(&[NonTerminal(0)]),
            rule(&[Terminal(5)]),
            rule(&[Terminal(2)]),
            Rule::empty(),
        ]);
        set.canonicalize();
        assert_eq!(
            set.rules,
            vec![
                Rule::empty(),
                rule(&[Terminal(2)]),
                rule(&[Terminal(5)]),
                rule(&[NonTerminal(0)]),
            ]
        );
    }
}
