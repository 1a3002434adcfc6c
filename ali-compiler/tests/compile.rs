//! Compile a small story through the event API, then load and play it.

use ali_asm::Opcode;
use ali_compiler::CompilerContext;
use ali_module::Module;
use ali_vm::prelude::*;
use ali_vm::RuntimeParams;

/// A story with a title, an initializer, vocabulary with an optional
/// article, a guarded command and an always-active command pair.
fn compile_story() -> Module {
    let mut ctx = CompilerContext::new();

    // verb LOOK | EXAMINE
    ctx.begin_verb();
    ctx.pattern_fragment("look").unwrap();
    ctx.add_synonyms().unwrap();
    ctx.pattern_fragment("examine").unwrap();
    ctx.add_synonyms().unwrap();

    // verb SLEEP
    ctx.begin_verb();
    ctx.pattern_fragment("sleep").unwrap();
    ctx.add_synonyms().unwrap();

    // entity [THE] LAMP
    ctx.begin_entity();
    ctx.pattern_fragment("the").unwrap();
    ctx.pattern_opt().unwrap();
    ctx.pattern_fragment("lamp").unwrap();
    ctx.pattern_seq().unwrap();
    ctx.add_synonyms().unwrap();
    ctx.bind_symbol("lamp").unwrap();

    // initialize: title := "Ali demo"; write a banner.
    ctx.begin_function(Some("initialize"), false).unwrap();
    let title = ctx.intern_string("Ali demo") as i32;
    let title_var = ctx.resolve_global("title") as i32;
    ctx.emit(Opcode::LLI, title).unwrap();
    ctx.emit(Opcode::STG, title_var).unwrap();
    ctx.emit_write_literal("You are in a dark room.").unwrap();
    ctx.end_function().unwrap();

    // "look lamp": plain command.
    ctx.begin_command("look lamp").unwrap();
    ctx.begin_function(None, false).unwrap();
    ctx.emit_write_literal("A dusty brass lamp.").unwrap();
    ctx.end_command().unwrap();

    // "sleep": guard declines for now.
    ctx.begin_command("sleep").unwrap();
    ctx.begin_function(None, false).unwrap();
    ctx.emit(Opcode::LLI, 0).unwrap();
    ctx.end_guard().unwrap();
    ctx.begin_function(None, false).unwrap();
    ctx.emit_write_literal("You doze off.").unwrap();
    ctx.end_command().unwrap();

    ctx.finish().expect("story compiles")
}

fn play(module: Module) -> Interpreter<RecordingHost> {
    let mut vm = Interpreter::new(module, RuntimeParams::unwrapped(), RecordingHost::default());
    vm.reinitialize().expect("initialization succeeds");
    vm
}

#[test]
fn compiled_module_round_trips_bit_exactly() {
    let module = compile_story();
    let bytes = module.to_bytes();
    let loaded = Module::from_bytes(&bytes).expect("compiled module loads");
    assert_eq!(loaded, module);
    assert_eq!(loaded.to_bytes(), bytes);
}

#[test]
fn header_counts_reflect_the_declarations() {
    let module = compile_story();
    // Eight reserved globals, one entity, no properties declared.
    assert_eq!(module.num_globals(), 8);
    assert_eq!(module.num_entities(), 1);
    assert_eq!(module.num_properties(), 0);
    assert!(module.init_func() >= 0);
}

#[test]
fn initialization_writes_the_banner_and_title() {
    let mut vm = play(compile_story());
    assert_eq!(vm.take_output(), "You are in a dark room.\n\n");
    // Global 0 is the title; the initializer stored a string index.
    let title = vm.variables().get(0).unwrap();
    assert_eq!(
        vm.module().strings()[title as usize],
        "Ali demo"
    );
}

#[test]
fn commands_play_through_the_grammar() {
    let mut vm = play(compile_story());
    vm.take_output();

    assert_eq!(vm.perform_command("look lamp").unwrap(), CommandOutcome::Executed);
    assert_eq!(vm.take_output(), "A dusty brass lamp.\n\n");

    // The optional article and the synonym verb both derive.
    assert_eq!(
        vm.perform_command("examine the lamp").unwrap(),
        CommandOutcome::Executed
    );
    assert_eq!(vm.take_output(), "A dusty brass lamp.\n\n");

    // The guarded command matches but stays inactive.
    assert_eq!(vm.perform_command("sleep").unwrap(), CommandOutcome::Inactive);
    assert_eq!(vm.take_output(), "That's not possible right now.\n\n");

    // Unknown vocabulary is refused at tokenization.
    assert_eq!(
        vm.perform_command("look table").unwrap(),
        CommandOutcome::UnknownWord
    );
    assert!(vm.take_output().starts_with("Unknown word: table"));

    // A known word with no matching command form.
    assert_eq!(
        vm.perform_command("lamp look").unwrap(),
        CommandOutcome::NoMatch
    );
    assert_eq!(vm.take_output(), "You can't do that in this game.\n\n");
}

#[test]
fn loaded_copy_behaves_like_the_original() {
    let module = compile_story();
    let loaded = Module::from_bytes(&module.to_bytes()).unwrap();

    let mut vm = play(loaded);
    vm.take_output();
    assert_eq!(vm.perform_command("look lamp").unwrap(), CommandOutcome::Executed);
    assert_eq!(vm.take_output(), "A dusty brass lamp.\n\n");
}
