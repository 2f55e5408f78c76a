use anyhow::{bail, Context, Result};
use tama::{bytecode::VmSettings, prelude::*};

#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn help_string() -> String {
    format!(
        "{version}

USAGE:
    tama [FLAGS] [script]

FLAGS:
    -e, --eval         Evaluate the script as a string instead of loading it from disk
    -b, --bytecode     Run the script with the bytecode back end
    -d, --disassemble  Show the script's compiled bytecode without running it
    -t, --trace        Trace executed bytecode instructions (implies --bytecode)
    -v, --version      Prints version information
    -h, --help         Prints help information

ARGS:
    <script>    The tama script to run, as a file path, or as a string when --eval is set
",
        version = version_string()
    )
}

fn version_string() -> String {
    format!("Tama {}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Default)]
struct TamaArgs {
    help: bool,
    version: bool,
    eval_script: bool,
    bytecode: bool,
    disassemble: bool,
    trace: bool,
    script: Option<String>,
}

fn parse_arguments() -> Result<TamaArgs> {
    let mut args = pico_args::Arguments::from_env();

    let eval_script = args.contains(["-e", "--eval"]);
    let bytecode = args.contains(["-b", "--bytecode"]);
    let disassemble = args.contains(["-d", "--disassemble"]);
    let trace = args.contains(["-t", "--trace"]);
    let help = args.contains(["-h", "--help"]);
    let version = args.contains(["-v", "--version"]);

    let script = args.subcommand()?;

    let remaining = args.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {remaining:?}");
    }

    Ok(TamaArgs {
        help,
        version,
        eval_script,
        bytecode,
        disassemble,
        trace,
        script,
    })
}

fn main() -> Result<()> {
    let args = match parse_arguments() {
        Ok(args) => args,
        Err(error) => {
            println!("{}\n\n{error}", help_string());
            return Ok(());
        }
    };

    if args.help {
        println!("{}", help_string());
        return Ok(());
    }
    if args.version {
        println!("{}", version_string());
        return Ok(());
    }

    let Some(script) = args.script.clone() else {
        println!("{}", help_string());
        return Ok(());
    };

    let source = if args.eval_script {
        script
    } else {
        std::fs::read_to_string(&script)
            .with_context(|| format!("Unable to load script '{script}'"))?
    };

    let mut env = ScriptEnvironment::default();

    if args.disassemble {
        let program = env.compile(&source)?;
        print!("{program}");
        return Ok(());
    }

    let result = if args.bytecode || args.trace {
        env.eval_bytecode_with_settings(
            &source,
            VmSettings {
                trace: args.trace,
                ..Default::default()
            },
        )?
    } else {
        env.eval(&source)?
    };

    println!("{}", result.to_formatted_string());
    Ok(())
}
