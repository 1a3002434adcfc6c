//! Command declarations: header parsing against the declared vocabulary
//! and the deferred binding of guard and body functions.
//!
//! Headers come in three forms: a bare verb, a verb plus an entity, or a
//! verb, entity, preposition and second entity. Several headers may be
//! declared in a row before one guard and body pair arrives; the pair
//! then binds to every open header, so synonymous commands share their
//! implementation.

use ali_asm::Value;
use ali_module::Command;

use crate::pattern::NodeId;
use crate::{CompileError, CompilerContext};

impl CompilerContext {
    /// Declare a command header. The text is normalized, parsed against
    /// the declared verbs, prepositions and entities, lowered to a
    /// grammar symbol, and left open until its guard/body arrive.
    pub fn begin_command(&mut self, header: &str) -> Result<(), CompileError> {
        let canonical = ali_module::normalize(header);
        let words: Vec<&str> = canonical.split(' ').filter(|w| !w.is_empty()).collect();

        let pattern = self
            .parse_header(&words)
            .ok_or_else(|| CompileError::BadCommandHeader {
                text: canonical.clone(),
            })?;

        let symbol = self.grammar.lower(&self.arena, pattern);
        self.commands.push(Command::new(symbol, -1, -1));
        Ok(())
    }

    /// Close the open (anonymous) function as a guard returning one
    /// value, and attach it to every open command header.
    pub fn end_guard(&mut self) -> Result<(), CompileError> {
        self.force_returns_value()?;
        let guard = self.end_function()? as Value;
        for command in self.commands.iter_mut().rev() {
            if command.function >= 0 {
                break;
            }
            command.guard = guard;
        }
        Ok(())
    }

    /// Close the open (anonymous) function as a command body, and attach
    /// it to every open command header, completing them.
    pub fn end_command(&mut self) -> Result<(), CompileError> {
        let function = self.end_function()? as Value;
        for command in self.commands.iter_mut().rev() {
            if command.function >= 0 {
                break;
            }
            command.function = function;
        }
        Ok(())
    }

    /// Parse a normalized header into a pattern covering its phrases.
    ///
    /// Splits prefer the longest verb: later split points overwrite
    /// earlier ones, as phrases like "PICK UP" must win over "PICK".
    fn parse_header(&mut self, words: &[&str]) -> Option<NodeId> {
        if words.is_empty() {
            return None;
        }

        // Form 1: VERB.
        if let Some(verb) = self.fragment_at(Kind::Verb, words) {
            return self.verbs.pattern(verb);
        }

        // Form 2: VERB ENTITY.
        let mut found = None;
        for split in 1..words.len() {
            let verb = self.fragment_at(Kind::Verb, &words[..split]);
            let entity = self.fragment_at(Kind::Entity, &words[split..]);
            if let (Some(verb), Some(entity)) = (verb, entity) {
                found = Some((verb, entity));
            }
        }
        if let Some((verb, entity)) = found {
            let verb = self.verbs.pattern(verb)?;
            let entity = self.entities.pattern(entity)?;
            return Some(self.arena.seq(verb, entity));
        }

        // Form 3: VERB ENTITY PREPOSITION ENTITY.
        let mut found = None;
        for p in 1..words.len() {
            if self.fragment_at(Kind::Verb, &words[..p]).is_none() {
                continue;
            }
            for q in p + 1..words.len() {
                if self.fragment_at(Kind::Entity, &words[p..q]).is_none() {
                    continue;
                }
                for r in q + 1..words.len() {
                    let verb = self.fragment_at(Kind::Verb, &words[..p]);
                    let first = self.fragment_at(Kind::Entity, &words[p..q]);
                    let preposition = self.fragment_at(Kind::Preposition, &words[q..r]);
                    let second = self.fragment_at(Kind::Entity, &words[r..]);
                    if let (Some(verb), Some(first), Some(preposition), Some(second)) =
                        (verb, first, preposition, second)
                    {
                        found = Some((verb, first, preposition, second));
                    }
                }
            }
        }
        let (verb, first, preposition, second) = found?;
        let verb = self.verbs.pattern(verb)?;
        let first = self.entities.pattern(first)?;
        let preposition = self.prepositions.pattern(preposition)?;
        let second = self.entities.pattern(second)?;
        let head = self.arena.seq(verb, first);
        let tail = self.arena.seq(preposition, second);
        Some(self.arena.seq(head, tail))
    }

    /// Resolve a span against one fragment table; ambiguity counts as no
    /// match for header-splitting purposes.
    fn fragment_at(&self, kind: Kind, span: &[&str]) -> Option<usize> {
        let table = match kind {
            Kind::Verb => &self.verbs,
            Kind::Preposition => &self.prepositions,
            Kind::Entity => &self.entities,
        };
        table.resolve(&self.arena, span).ok().flatten()
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Verb,
    Preposition,
    Entity,
}
