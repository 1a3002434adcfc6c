//! Assemble a tiny playable story through the back-end API and write it
//! to `module.alo`, ready for the `ali` runner.

use ali_asm::Opcode;
use ali_compiler::{CompileError, CompilerContext};

fn build() -> Result<Vec<u8>, CompileError> {
    let mut ctx = CompilerContext::new();

    ctx.begin_verb();
    ctx.pattern_fragment("look")?;
    ctx.add_synonyms()?;
    ctx.pattern_fragment("look around")?;
    ctx.add_synonyms()?;

    ctx.begin_verb();
    ctx.pattern_fragment("take")?;
    ctx.add_synonyms()?;
    ctx.pattern_fragment("pick up")?;
    ctx.add_synonyms()?;

    ctx.begin_entity();
    ctx.pattern_fragment("the")?;
    ctx.pattern_opt()?;
    ctx.pattern_fragment("lantern")?;
    ctx.pattern_seq()?;
    ctx.add_synonyms()?;
    ctx.bind_symbol("lantern")?;

    // @carrying tracks whether the lantern has been taken.
    let carrying = ctx.resolve_global("carrying") as i32;

    ctx.begin_function(Some("initialize"), false)?;
    let title = ctx.intern_string("The Cellar") as i32;
    let title_var = ctx.resolve_global("title") as i32;
    ctx.emit(Opcode::LLI, title)?;
    ctx.emit(Opcode::STG, title_var)?;
    ctx.emit_write_literal("A cold cellar. A lantern hangs from a hook.")?;
    ctx.end_function()?;

    ctx.begin_command("look")?;
    ctx.begin_function(None, false)?;
    ctx.emit_write_literal("Stone walls, a dirt floor, and that lantern.")?;
    ctx.end_command()?;

    // "take lantern" works once.
    ctx.begin_command("take lantern")?;
    ctx.begin_function(None, false)?;
    ctx.emit(Opcode::LDG, carrying)?;
    ctx.emit(Opcode::OP1, 1)?;
    ctx.end_guard()?;
    ctx.begin_function(None, false)?;
    ctx.emit(Opcode::LLI, 1)?;
    ctx.emit(Opcode::STG, carrying)?;
    ctx.emit_write_literal("You unhook the lantern.")?;
    ctx.end_command()?;

    Ok(ctx.finish()?.to_bytes())
}

fn main() {
    match build() {
        Ok(bytes) => {
            if let Err(err) = std::fs::write("module.alo", &bytes) {
                eprintln!("unable to write module.alo: {err}");
                std::process::exit(1);
            }
            println!("wrote module.alo ({} bytes)", bytes.len());
        }
        Err(err) => {
            eprintln!("compilation failed: {err}");
            std::process::exit(1);
        }
    }
}
