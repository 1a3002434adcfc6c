//! The module inspector: print a compiled module chunk by chunk.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;

use ali_cli::init_tracing;
use ali_module::{Module, SymbolRef};

#[derive(Parser)]
#[command(name = "alidump", about = "Inspect a compiled Ali story module.")]
struct Args {
    /// Module file to inspect.
    #[arg(default_value = "module.alo")]
    module: PathBuf,

    /// Print the module header.
    #[arg(long)]
    header: bool,

    /// Print the string table.
    #[arg(long)]
    strings: bool,

    /// Print the function table with disassembled instructions.
    #[arg(long)]
    functions: bool,

    /// Print the word table.
    #[arg(long)]
    words: bool,

    /// Print the grammar rule sets.
    #[arg(long)]
    grammar: bool,

    /// Print the command table.
    #[arg(long)]
    commands: bool,
}

impl Args {
    /// With no selector given, print everything.
    fn select_all(&self) -> bool {
        !(self.header || self.strings || self.functions || self.words || self.grammar || self.commands)
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let bytes = std::fs::read(&args.module)
        .with_context(|| format!("unable to open \"{}\" for reading", args.module.display()))?;
    let module = Module::from_bytes(&bytes)
        .with_context(|| format!("invalid module file \"{}\"", args.module.display()))?;

    let all = args.select_all();
    if all || args.header {
        dump_header(&module);
    }
    if all || args.strings {
        dump_strings(&module);
    }
    if all || args.functions {
        dump_functions(&module);
    }
    if all || args.words {
        dump_words(&module);
    }
    if all || args.grammar {
        dump_grammar(&module);
    }
    if all || args.commands {
        dump_commands(&module);
    }
    Ok(())
}

fn dump_header(module: &Module) {
    println!("--- header ---");
    println!("Number of global variables:  {:6}", module.num_globals());
    println!("Number of entities:          {:6}", module.num_entities());
    println!("Number of entity properties: {:6}", module.num_properties());
    println!("Entry point:                 {:6}", module.init_func());
}

fn dump_strings(module: &Module) {
    println!("\n--- string table ({} entries) ---", module.strings().len());
    for (index, string) in module.strings().iter().enumerate() {
        println!("{index:6}: {string:?}");
    }
}

fn dump_functions(module: &Module) {
    println!("\n--- function table ({} entries) ---", module.functions().len());
    for (id, function) in module.functions().iter().enumerate() {
        println!(
            "\nFunction {id}: {} parameter(s), {} result(s)",
            function.nparam(),
            function.nret()
        );
        for (pc, instruction) in function.code().iter().enumerate() {
            println!("{pc:6}: {instruction}");
        }
    }
}

fn dump_words(module: &Module) {
    println!("\n--- word table ({} entries) ---", module.words().len());
    for (index, word) in module.words().words().iter().enumerate() {
        println!("{index:6}: {word:?}");
    }
}

fn dump_grammar(module: &Module) {
    let grammar = module.grammar();
    println!("\n--- grammar table ({} rule sets) ---", grammar.len());
    for (index, set) in grammar.rule_sets().iter().enumerate() {
        let nullable = if grammar.is_nullable(index) {
            " (nullable)"
        } else {
            ""
        };
        println!("<{index}>{nullable}:");
        for rule in &set.rules {
            if rule.refs.is_empty() {
                println!("        ::= <empty>");
            } else {
                let refs = rule.refs.iter().map(|r| symbol(module, *r)).join(" ");
                println!("        ::= {refs}");
            }
        }
    }
}

fn dump_commands(module: &Module) {
    println!("\n--- command table ({} entries) ---", module.commands().len());
    for (index, command) in module.commands().iter().enumerate() {
        println!(
            "{index:6}: {} guard={} function={}",
            symbol(module, command.symbol),
            command.guard,
            command.function
        );
    }
}

fn symbol(module: &Module, reference: SymbolRef) -> String {
    match reference {
        SymbolRef::None => "-".to_owned(),
        SymbolRef::Terminal(word) => match module.words().get(word) {
            Some(text) => format!("{text:?}"),
            None => format!("word#{word}"),
        },
        SymbolRef::NonTerminal(index) => format!("<{index}>"),
    }
}
