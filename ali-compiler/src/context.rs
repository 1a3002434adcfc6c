//! The compilation context.
//!
//! One value holds every table the back-end accumulates while the front
//! end replays a source file: globals, properties, strings, symbols,
//! vocabulary patterns, the grammar builder, functions and commands.
//! Threading it through the event entry points keeps the back-end
//! re-entrant and testable in isolation.

use std::collections::HashMap;

use ali_asm::{Builtin, Value};
use ali_module::{Command, Function, Grammar, Module, ModuleHeader, WordTable};

use crate::emit::FunctionState;
use crate::grammar_build::GrammarBuilder;
use crate::pattern::{FragmentTable, NodeId, PatternArena};
use crate::tables::Interner;
use crate::{CompileError, FragmentKind};

/// Global variable names pre-bound by the engine. Slots 0 and 1 carry
/// the story title and subtitle; the rest are reserved.
const RESERVED_GLOBALS: [&str; 8] = [
    "title",
    "subtitle",
    "reserved2",
    "reserved3",
    "reserved4",
    "reserved5",
    "reserved6",
    "reserved7",
];

/// The name that marks a function as the module's entry point.
const INIT_FUNCTION_NAME: &str = "initialize";

/// Accumulates a whole module from front-end events; see the crate docs.
#[derive(Debug)]
pub struct CompilerContext {
    pub(crate) globals: Interner,
    pub(crate) properties: Interner,
    pub(crate) strings: Interner,
    pub(crate) symbols: HashMap<String, Value>,
    pub(crate) next_symbol: Value,
    pub(crate) functions: Vec<Function>,
    pub(crate) function_names: HashMap<String, Value>,
    pub(crate) arena: PatternArena,
    pub(crate) pattern_stack: Vec<NodeId>,
    pub(crate) verbs: FragmentTable,
    pub(crate) prepositions: FragmentTable,
    pub(crate) entities: FragmentTable,
    pub(crate) current_kind: Option<FragmentKind>,
    pub(crate) grammar: GrammarBuilder,
    pub(crate) commands: Vec<Command>,
    pub(crate) current_function: Option<FunctionState>,
}

impl Default for CompilerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerContext {
    /// A fresh context with the engine globals and built-in functions
    /// pre-bound.
    pub fn new() -> Self {
        let mut globals = Interner::default();
        for name in RESERVED_GLOBALS {
            globals.intern(name);
        }

        let mut function_names = HashMap::new();
        for builtin in Builtin::ALL {
            function_names.insert(builtin.name().to_owned(), builtin.call_id());
        }

        CompilerContext {
            globals,
            properties: Interner::default(),
            strings: Interner::default(),
            symbols: HashMap::new(),
            next_symbol: -1,
            functions: Vec::new(),
            function_names,
            arena: PatternArena::default(),
            pattern_stack: Vec::new(),
            verbs: FragmentTable::default(),
            prepositions: FragmentTable::default(),
            entities: FragmentTable::default(),
            current_kind: None,
            grammar: GrammarBuilder::default(),
            commands: Vec::new(),
            current_function: None,
        }
    }

    /// Start a verb declaration.
    pub fn begin_verb(&mut self) -> usize {
        self.current_kind = Some(FragmentKind::Verb);
        self.verbs.declare()
    }

    /// Start a preposition declaration.
    pub fn begin_preposition(&mut self) -> usize {
        self.current_kind = Some(FragmentKind::Preposition);
        self.prepositions.declare()
    }

    /// Start an entity declaration.
    pub fn begin_entity(&mut self) -> usize {
        self.current_kind = Some(FragmentKind::Entity);
        self.entities.declare()
    }

    /// Push a literal phrase onto the pattern stack.
    pub fn pattern_fragment(&mut self, text: &str) -> Result<(), CompileError> {
        let node = self.arena.fragment(text)?;
        self.pattern_stack.push(node);
        Ok(())
    }

    /// Combine the top two stack patterns as an alternation.
    pub fn pattern_alt(&mut self) -> Result<(), CompileError> {
        let right = self.pattern_stack.pop().ok_or(CompileError::MalformedPattern)?;
        let left = self.pattern_stack.pop().ok_or(CompileError::MalformedPattern)?;
        self.pattern_stack.push(self.arena.alt(left, right));
        Ok(())
    }

    /// Combine the top two stack patterns in sequence.
    pub fn pattern_seq(&mut self) -> Result<(), CompileError> {
        let right = self.pattern_stack.pop().ok_or(CompileError::MalformedPattern)?;
        let left = self.pattern_stack.pop().ok_or(CompileError::MalformedPattern)?;
        self.pattern_stack.push(self.arena.seq(left, right));
        Ok(())
    }

    /// Make the top stack pattern optional.
    pub fn pattern_opt(&mut self) -> Result<(), CompileError> {
        let inner = self.pattern_stack.pop().ok_or(CompileError::MalformedPattern)?;
        self.pattern_stack.push(self.arena.opt(inner));
        Ok(())
    }

    /// Attach the completed stack pattern to the fragment being
    /// declared, as one synonym.
    pub fn add_synonyms(&mut self) -> Result<(), CompileError> {
        let node = self.pattern_stack.pop().ok_or(CompileError::MalformedPattern)?;
        if !self.pattern_stack.is_empty() {
            return Err(CompileError::MalformedPattern);
        }
        let table = match self.current_kind {
            Some(FragmentKind::Verb) => &mut self.verbs,
            Some(FragmentKind::Preposition) => &mut self.prepositions,
            Some(FragmentKind::Entity) => &mut self.entities,
            None => return Err(CompileError::NoFragmentContext),
        };
        table
            .add_synonym(&mut self.arena, node)
            .ok_or(CompileError::NoFragmentContext)?;
        Ok(())
    }

    /// Bind a symbol name to the entity currently being declared.
    pub fn bind_symbol(&mut self, name: &str) -> Result<(), CompileError> {
        if self.current_kind != Some(FragmentKind::Entity) || self.entities.len() == 0 {
            return Err(CompileError::NoEntityContext);
        }
        let id = (self.entities.len() - 1) as Value;
        if self.symbols.insert(name.to_owned(), id).is_some() {
            return Err(CompileError::SymbolRebound {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Resolve a symbol name to its value; unbound symbols receive
    /// fresh negative identifiers.
    pub fn resolve_symbol(&mut self, name: &str) -> Value {
        if let Some(&value) = self.symbols.get(name) {
            return value;
        }
        let value = self.next_symbol;
        self.next_symbol -= 1;
        self.symbols.insert(name.to_owned(), value);
        value
    }

    /// Index of a global variable, registering it on first use.
    pub fn resolve_global(&mut self, name: &str) -> usize {
        self.globals.intern(name)
    }

    /// Index of an entity property, registering it on first use.
    pub fn resolve_property(&mut self, name: &str) -> usize {
        self.properties.intern(name)
    }

    /// Index of a run-time string, deduplicated.
    pub fn intern_string(&mut self, text: &str) -> usize {
        self.strings.intern(text)
    }

    /// Resolve entity-reference text to the unique entity it denotes.
    pub fn resolve_entity(&mut self, text: &str) -> Result<Value, CompileError> {
        let canonical = ali_module::normalize(text);
        let span: Vec<&str> = canonical.split(' ').filter(|w| !w.is_empty()).collect();
        match self.entities.resolve(&self.arena, &span) {
            Ok(Some(id)) => Ok(id as Value),
            Ok(None) => Err(CompileError::UnknownFragment { text: canonical }),
            Err(_) => Err(CompileError::AmbiguousFragment { text: canonical }),
        }
    }

    /// Number of entities declared so far.
    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    /// Validate the accumulated tables and assemble the module.
    pub fn finish(self) -> Result<Module, CompileError> {
        if self.current_function.is_some() {
            return Err(CompileError::UnterminatedFunction);
        }
        if self.commands.iter().any(|cmd| cmd.function < 0) {
            return Err(CompileError::UnboundCommand);
        }

        let init_func = self
            .function_names
            .get(INIT_FUNCTION_NAME)
            .copied()
            .filter(|&id| id >= 0)
            .unwrap_or(-1);

        let header = ModuleHeader {
            num_globals: self.globals.len(),
            num_entities: self.entities.len(),
            num_properties: self.properties.len(),
            init_func,
        };

        let (words, sets) = self.grammar.into_parts();
        let num_words = words.len();
        let words = WordTable::new(words)?;
        let grammar = Grammar::new(sets, num_words)?;

        tracing::debug!(
            globals = header.num_globals,
            entities = header.num_entities,
            properties = header.num_properties,
            functions = self.functions.len(),
            commands = self.commands.len(),
            "module assembled"
        );

        Ok(Module::new(
            header,
            self.strings.into_items(),
            self.functions,
            words,
            grammar,
            self.commands,
        )?)
    }
}
