//! The module aggregate and its chunked serialization.
//!
//! A module file is an IFF form:
//!
//! ```text
//! FORM <size> ALI
//!    MOD  <size> <header>
//!    STR  <size> <string table>
//!    FUN  <size> <function table>
//!    WRD  <size> <word table>
//!    GRM  <size> <grammar table>
//!    CMD  <size> <command table>
//! ```
//!
//! The inner chunks must appear in exactly this order. Serializing a
//! loaded module reproduces the input byte for byte.

use ali_asm::{Instruction, Value};

use crate::chunk::{padded_size, read_chunk, write_chunk};
use crate::{
    ByteReader, ByteWriter, ChunkId, Command, Function, Grammar, ModuleError, Rule, RuleSet,
    SymbolRef, WordTable,
};

/// The module format version this build reads and writes. The major
/// (high) byte must be 1; the minor byte is ignored when loading.
pub const FORMAT_VERSION: u16 = 0x0100;

/// Fixed-size header fields of a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleHeader {
    /// Number of global variable slots.
    pub num_globals: usize,
    /// Number of entities.
    pub num_entities: usize,
    /// Number of properties per entity.
    pub num_properties: usize,
    /// Initialization function identifier, or `-1` for none.
    pub init_func: Value,
}

impl ModuleHeader {
    /// Total length of the variable vector described by this header.
    pub const fn num_vars(&self) -> usize {
        self.num_globals + self.num_entities * self.num_properties
    }
}

/// A loaded module. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    header: ModuleHeader,
    strings: Vec<String>,
    functions: Vec<Function>,
    words: WordTable,
    grammar: Grammar,
    commands: Vec<Command>,
}

impl Module {
    /// Assemble a module from its parts, validating the cross-table
    /// references (initialization function, command symbols).
    pub fn new(
        header: ModuleHeader,
        strings: Vec<String>,
        functions: Vec<Function>,
        words: WordTable,
        grammar: Grammar,
        commands: Vec<Command>,
    ) -> Result<Self, ModuleError> {
        if header.init_func != -1
            && (header.init_func < 0 || header.init_func as usize >= functions.len())
        {
            return Err(ModuleError::InitFuncOutOfRange {
                id: header.init_func,
            });
        }
        for command in &commands {
            let in_range = match command.symbol {
                SymbolRef::None => true,
                SymbolRef::Terminal(w) => w < words.len(),
                SymbolRef::NonTerminal(nt) => nt < grammar.len(),
            };
            if !in_range {
                return Err(ModuleError::SymbolOutOfRange {
                    reference: command.symbol.encode(),
                });
            }
        }
        Ok(Module {
            header,
            strings,
            functions,
            words,
            grammar,
            commands,
        })
    }

    /// The fixed header fields.
    pub const fn header(&self) -> &ModuleHeader {
        &self.header
    }

    /// Number of global variable slots.
    pub const fn num_globals(&self) -> usize {
        self.header.num_globals
    }

    /// Number of entities.
    pub const fn num_entities(&self) -> usize {
        self.header.num_entities
    }

    /// Number of properties per entity.
    pub const fn num_properties(&self) -> usize {
        self.header.num_properties
    }

    /// Initialization function identifier, or `-1` for none.
    pub const fn init_func(&self) -> Value {
        self.header.init_func
    }

    /// The run-time string table.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// The function table.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// The function with the given non-negative identifier.
    pub fn function(&self, id: Value) -> Option<&Function> {
        usize::try_from(id).ok().and_then(|id| self.functions.get(id))
    }

    /// The word table.
    pub const fn words(&self) -> &WordTable {
        &self.words
    }

    /// The grammar.
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The command table (first command set).
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Parse a module from its serialized form.
    ///
    /// All structure is validated before anything is returned; a
    /// malformed module yields an error and no partial data.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ModuleError> {
        let mut outer = ByteReader::new(data);
        let mut form = read_chunk(&mut outer, ChunkId::FORM)
            .map_err(|e| match e {
                ModuleError::UnexpectedChunk { .. } => ModuleError::BadSignature,
                other => other,
            })?;
        if !outer.is_empty() {
            return Err(ModuleError::TrailingBytes { context: "module" });
        }
        if ChunkId(form.read_tag()?) != ChunkId::ALI {
            return Err(ModuleError::BadSignature);
        }

        let header = read_header(&mut read_chunk(&mut form, ChunkId::MOD)?)?;
        let strings = read_string_table(&mut read_chunk(&mut form, ChunkId::STR)?, ChunkId::STR)?;
        let functions = read_function_table(&mut read_chunk(&mut form, ChunkId::FUN)?)?;
        let raw_words = read_string_table(&mut read_chunk(&mut form, ChunkId::WRD)?, ChunkId::WRD)?;
        let words = WordTable::new(raw_words)?;
        let grammar = read_grammar_table(&mut read_chunk(&mut form, ChunkId::GRM)?, words.len())?;
        let commands = read_command_table(
            &mut read_chunk(&mut form, ChunkId::CMD)?,
            words.len(),
            grammar.len(),
        )?;
        if !form.is_empty() {
            return Err(ModuleError::TrailingBytes { context: "form" });
        }

        tracing::debug!(
            strings = strings.len(),
            functions = functions.len(),
            words = words.len(),
            rule_sets = grammar.len(),
            commands = commands.len(),
            "loaded module"
        );

        Module::new(header, strings, functions, words, grammar, commands)
    }

    /// Serialize the module. The output loads back to an equal module,
    /// and loading then serializing reproduces the input bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mod_payload = self.write_header();
        let str_payload = write_string_table(&self.strings);
        let fun_payload = self.write_function_table();
        let wrd_payload = write_string_table(self.words.words());
        let grm_payload = self.write_grammar_table();
        let cmd_payload = self.write_command_table();

        let form_size = 4
            + padded_size(mod_payload.len())
            + padded_size(str_payload.len())
            + padded_size(fun_payload.len())
            + padded_size(wrd_payload.len())
            + padded_size(grm_payload.len())
            + padded_size(cmd_payload.len());

        let mut w = ByteWriter::new();
        w.write_tag(ChunkId::FORM.0);
        w.write_u32(form_size as u32);
        w.write_tag(ChunkId::ALI.0);
        write_chunk(&mut w, ChunkId::MOD, &mod_payload);
        write_chunk(&mut w, ChunkId::STR, &str_payload);
        write_chunk(&mut w, ChunkId::FUN, &fun_payload);
        write_chunk(&mut w, ChunkId::WRD, &wrd_payload);
        write_chunk(&mut w, ChunkId::GRM, &grm_payload);
        write_chunk(&mut w, ChunkId::CMD, &cmd_payload);
        if form_size % 2 == 1 {
            w.write_u8(0);
        }
        w.into_bytes()
    }

    fn write_header(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_u16(FORMAT_VERSION);
        w.write_u16(0);
        w.write_i32(self.header.num_globals as i32);
        w.write_i32(self.header.num_entities as i32);
        w.write_i32(self.header.num_properties as i32);
        w.write_i32(self.header.init_func);
        w.into_bytes()
    }

    fn write_function_table(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_i32(self.functions.len() as i32);
        for function in &self.functions {
            w.write_u16(0);
            w.write_u8(function.nret());
            w.write_u8(function.nparam());
        }
        for function in &self.functions {
            for instruction in function.code() {
                w.write_bytes(&instruction.to_bytes());
            }
            w.write_bytes(&Instruction::TERMINATOR.to_bytes());
        }
        w.into_bytes()
    }

    fn write_grammar_table(&self) -> Vec<u8> {
        let sets = self.grammar.rule_sets();
        let total_rules: usize = sets.iter().map(|s| s.rules.len()).sum();
        let total_refs: usize = sets
            .iter()
            .flat_map(|s| &s.rules)
            .map(|r| r.refs.len())
            .sum();

        let mut w = ByteWriter::new();
        w.write_i32(sets.len() as i32);
        w.write_i32(total_rules as i32);
        w.write_i32(total_refs as i32);
        for set in sets {
            w.write_i32(set.rules.len() as i32);
            for rule in &set.rules {
                w.write_i32(rule.refs.len() as i32);
                for reference in &rule.refs {
                    w.write_i32(reference.encode());
                }
            }
        }
        w.into_bytes()
    }

    fn write_command_table(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_i32(1);
        w.write_i32(self.commands.len() as i32);
        for command in &self.commands {
            w.write_i32(command.symbol.encode());
            w.write_i32(command.guard);
            w.write_i32(command.function);
        }
        w.into_bytes()
    }
}

fn read_count(r: &mut ByteReader<'_>, id: ChunkId) -> Result<usize, ModuleError> {
    let count = r.read_i32()?;
    usize::try_from(count).map_err(|_| ModuleError::NegativeCount { id })
}

fn read_header(r: &mut ByteReader<'_>) -> Result<ModuleHeader, ModuleError> {
    let version = r.read_u16()?;
    if version & 0xff00 != FORMAT_VERSION & 0xff00 {
        return Err(ModuleError::UnsupportedVersion {
            major: (version >> 8) as u8,
            minor: version as u8,
        });
    }
    if r.read_u16()? != 0 {
        return Err(ModuleError::ReservedField { id: ChunkId::MOD });
    }
    let num_globals = read_count(r, ChunkId::MOD)?;
    let num_entities = read_count(r, ChunkId::MOD)?;
    let num_properties = read_count(r, ChunkId::MOD)?;
    let init_func = r.read_i32()?;
    if !r.is_empty() {
        return Err(ModuleError::TrailingBytes {
            context: "module header",
        });
    }
    Ok(ModuleHeader {
        num_globals,
        num_entities,
        num_properties,
        init_func,
    })
}

fn read_string_table(r: &mut ByteReader<'_>, id: ChunkId) -> Result<Vec<String>, ModuleError> {
    let count = read_count(r, id)?;
    let mut strings = Vec::with_capacity(count.min(1024));
    for index in 0..count {
        let bytes = r
            .read_cstr()
            .map_err(|_| ModuleError::UnterminatedString { index })?;
        let string = std::str::from_utf8(bytes)
            .map_err(|_| ModuleError::InvalidUtf8 { index })?
            .to_owned();
        strings.push(string);
    }
    if !r.is_empty() {
        return Err(ModuleError::TrailingBytes {
            context: "string table",
        });
    }
    Ok(strings)
}

fn write_string_table(strings: &[String]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_i32(strings.len() as i32);
    for string in strings {
        w.write_cstr(string);
    }
    w.into_bytes()
}

fn read_function_table(r: &mut ByteReader<'_>) -> Result<Vec<Function>, ModuleError> {
    let count = read_count(r, ChunkId::FUN)?;

    let mut headers = Vec::with_capacity(count.min(1024));
    for index in 0..count {
        if r.read_u16()? != 0 {
            return Err(ModuleError::ReservedField { id: ChunkId::FUN });
        }
        let nret = r.read_u8()?;
        if nret > 1 {
            return Err(ModuleError::InvalidResultCount { index, nret });
        }
        let nparam = r.read_u8()?;
        headers.push((nret, nparam));
    }

    // Function bodies are delimited by (0, 0) terminators, in order.
    if r.remaining() % Instruction::LEN != 0 {
        return Err(ModuleError::MalformedCode);
    }
    let mut bodies = Vec::with_capacity(count.min(1024));
    let mut current = Vec::new();
    while !r.is_empty() {
        let bytes = r.take(Instruction::LEN)?;
        let instruction = Instruction::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if instruction.is_terminator() {
            bodies.push(std::mem::take(&mut current));
        } else {
            current.push(instruction);
        }
    }
    if !current.is_empty() || bodies.len() != count {
        return Err(ModuleError::MalformedCode);
    }

    headers
        .into_iter()
        .zip(bodies)
        .map(|((nret, nparam), code)| Function::new(nret, nparam, code))
        .collect()
}

fn read_grammar_table(r: &mut ByteReader<'_>, num_words: usize) -> Result<Grammar, ModuleError> {
    let num_nonterm = read_count(r, ChunkId::GRM)?;
    let declared_rules = read_count(r, ChunkId::GRM)?;
    let declared_refs = read_count(r, ChunkId::GRM)?;

    let mut total_rules = 0usize;
    let mut total_refs = 0usize;
    let mut sets = Vec::with_capacity(num_nonterm.min(1024));
    for _ in 0..num_nonterm {
        let num_rules = read_count(r, ChunkId::GRM)?;
        total_rules += num_rules;
        let mut rules = Vec::with_capacity(num_rules.min(1024));
        for _ in 0..num_rules {
            let num_refs = read_count(r, ChunkId::GRM)?;
            total_refs += num_refs;
            let mut refs = Vec::with_capacity(num_refs.min(1024));
            for _ in 0..num_refs {
                refs.push(SymbolRef::decode(r.read_i32()?));
            }
            rules.push(Rule::new(refs));
        }
        sets.push(RuleSet::new(rules));
    }
    if total_rules != declared_rules || total_refs != declared_refs {
        return Err(ModuleError::CountMismatch);
    }
    if !r.is_empty() {
        return Err(ModuleError::TrailingBytes {
            context: "grammar table",
        });
    }

    Grammar::new(sets, num_words)
}

fn read_command_table(
    r: &mut ByteReader<'_>,
    num_words: usize,
    num_nonterm: usize,
) -> Result<Vec<Command>, ModuleError> {
    let command_sets = r.read_i32()?;
    if command_sets < 1 {
        return Err(ModuleError::NoCommandSets);
    }

    let count = read_count(r, ChunkId::CMD)?;
    let mut commands = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let raw = r.read_i32()?;
        let symbol = SymbolRef::decode(raw);
        let in_range = match symbol {
            SymbolRef::None => true,
            SymbolRef::Terminal(w) => w < num_words,
            SymbolRef::NonTerminal(nt) => nt < num_nonterm,
        };
        if !in_range {
            return Err(ModuleError::SymbolOutOfRange { reference: raw });
        }
        let guard = r.read_i32()?;
        let function = r.read_i32()?;
        commands.push(Command::new(symbol, guard, function));
    }

    // Further command sets are currently ignored, but their framing must
    // still be intact.
    for _ in 1..command_sets {
        let skipped = read_count(r, ChunkId::CMD)?;
        for _ in 0..skipped {
            r.read_i32()?;
            r.read_i32()?;
            r.read_i32()?;
        }
    }
    if !r.is_empty() {
        return Err(ModuleError::TrailingBytes {
            context: "command table",
        });
    }
    if command_sets > 1 {
        tracing::warn!(command_sets, "module contains extra command sets; only the first is used");
    }

    Ok(commands)
}
