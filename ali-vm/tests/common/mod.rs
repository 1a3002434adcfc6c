//! Shared fixtures: hand-assembled modules and interpreter construction.

use ali_vm::prelude::*;
use ali_vm::RuntimeParams;

use ali_module::{Function, Grammar, RuleSet, WordTable};

pub fn instr(op: Opcode, arg: i32) -> Instruction {
    Instruction::new(op, arg).expect("argument in range")
}

pub fn function(nret: u8, nparam: u8, code: Vec<Instruction>) -> Function {
    Function::new(nret, nparam, code).expect("valid function")
}

pub fn words(names: &[&str]) -> WordTable {
    WordTable::new(names.iter().map(|n| n.to_string()).collect()).expect("canonical words")
}

pub struct ModuleSpec {
    pub header: ModuleHeader,
    pub strings: Vec<String>,
    pub functions: Vec<Function>,
    pub words: WordTable,
    pub rule_sets: Vec<RuleSet>,
    pub commands: Vec<ali_module::Command>,
}

impl Default for ModuleSpec {
    fn default() -> Self {
        ModuleSpec {
            header: ModuleHeader {
                num_globals: 8,
                num_entities: 0,
                num_properties: 0,
                init_func: -1,
            },
            strings: Vec::new(),
            functions: Vec::new(),
            words: words(&[]),
            rule_sets: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl ModuleSpec {
    pub fn build(self) -> Module {
        let num_words = self.words.len();
        let grammar = Grammar::new(self.rule_sets, num_words).expect("valid grammar");
        Module::new(
            self.header,
            self.strings,
            self.functions,
            self.words,
            grammar,
            self.commands,
        )
        .expect("valid module")
    }
}

pub fn interpreter(module: Module) -> Interpreter<RecordingHost> {
    Interpreter::new(module, RuntimeParams::unwrapped(), RecordingHost::default())
}
