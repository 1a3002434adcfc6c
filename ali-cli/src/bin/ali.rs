//! The story runner: load a module, restore or start a session, and
//! dispatch command lines until end of input or `quit`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ali_cli::host::TerminalHost;
use ali_cli::{init_tracing, session};
use ali_module::Module;
use ali_vm::{Interpreter, RuntimeParams};

#[derive(Parser)]
#[command(name = "ali", about = "Run a compiled Ali story module.")]
struct Args {
    /// Module file to run.
    #[arg(default_value = "module.alo")]
    module: PathBuf,

    /// Session slot; each slot keeps its own saved variables and
    /// transcript.
    #[arg(short, long, default_value_t = 0)]
    session: u32,

    /// Visible line width used for output wrapping.
    #[arg(short, long, default_value_t = 80)]
    width: usize,

    /// Disable output wrapping.
    #[arg(long)]
    no_wrap: bool,

    /// Discard any saved game and restart the story.
    #[arg(long)]
    restart: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let bytes = std::fs::read(&args.module)
        .with_context(|| format!("unable to open \"{}\" for reading", args.module.display()))?;
    let module = Module::from_bytes(&bytes)
        .with_context(|| format!("invalid module file \"{}\"", args.module.display()))?;

    let params = RuntimeParams {
        line_width: (!args.no_wrap).then_some(args.width),
    };
    let host = TerminalHost::new(session::open_transcript(args.session).ok());
    let mut vm = Interpreter::new(module, params, host);

    if args.restart {
        let path = session::save_path(args.session);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("unable to remove {}", path.display()))?;
        }
    }
    session::restore_or_initialize(&mut vm, args.session)?;
    vm.flush_to_host();
    session::persist(&vm, args.session)?;

    command_loop(&mut vm, args.session)
}

fn command_loop(vm: &mut Interpreter<TerminalHost>, slot: u32) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            // End of input; the session stays saved.
            println!();
            return Ok(());
        };
        let line = line.context("failed to read command line")?;
        println!();

        // Everything the host sees goes to the transcript too.
        vm.host_mut().log_input(&line);
        vm.perform_command(&line).context("fatal interpreter error")?;
        vm.flush_to_host();
        session::persist(vm, slot)?;
    }
}
