//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes rutas de ejecución y
//! compilación, y expone una CLI.

use anyhow::{self, bail, Context};
use clap::{self, crate_version, Arg, Command};
use log::{info, Level};
use welt::{Console, Diagnostics, Event, Memory};

use std::{
    fs::{self, File},
    io::{self, BufRead, Write},
};

/// Consola de terminal: entradas desde stdin, salidas a stdout.
struct Terminal {
    stdin: io::Stdin,
}

impl Console for Terminal {
    fn output(&mut self, text: &str) {
        println!("{}", text);
    }

    fn input(&mut self) -> io::Result<String> {
        io::stdout().flush()?;

        let mut line = String::new();
        self.stdin.lock().read_line(&mut line)?;

        let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed);

        Ok(line)
    }

    fn event(&mut self, event: Event) {
        info!("{:?}", event);
    }
}

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("welt")
        .version(crate_version!())
        .about("WELT interpreter and GRUND toolchain")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .required(true)
                .help("Source file"),
        )
        .arg(
            Arg::new("asm")
                .short('S')
                .help("Compile to GRUND assembly instead of running"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .takes_value(true)
                .value_name("FILE")
                .default_value("-")
                .help("Output file for -S ('-' for stdout)"),
        )
        .arg(
            Arg::new("grund")
                .long("grund")
                .conflicts_with_all(&["asm", "compiled"])
                .help("Run FILE as GRUND assembly"),
        )
        .arg(
            Arg::new("compiled")
                .long("compiled")
                .conflicts_with("asm")
                .help("Run through the compiler and the DAS-8 machine"),
        )
        .arg(
            Arg::new("memory")
                .short('m')
                .takes_value(true)
                .value_name("FILE")
                .help("Boot initial memory from a WELT program"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Raise log verbosity"),
        )
        .get_matches();

    let level = match args.occurrences_of("verbose") {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };

    simple_logger::init_with_level(level).context("Failed to initialize logger")?;

    // Se extraen argumentos necesarios
    let path = args.value_of("file").context("Missing source file")?;
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read source: {}", path))?;

    let memory = match args.value_of("memory") {
        None => None,
        Some(boot) => Some(boot_memory(boot)?),
    };

    let console = Terminal { stdin: io::stdin() };

    if args.is_present("asm") {
        let listing = match welt::compile_welt(&source, Some(path)) {
            Ok(listing) => listing,
            Err(error) => bail!("{}", render(error, path, &source)),
        };

        match args.value_of("output").unwrap_or("-") {
            "-" => io::stdout()
                .write_all(listing.as_bytes())
                .context("Failed to emit to stdout")?,

            output => {
                let mut file = File::create(output)
                    .with_context(|| format!("Failed to open for writing: {}", output))?;

                file.write_all(listing.as_bytes())
                    .with_context(|| format!("Failed to emit to file: {}", output))?;
            }
        }

        return Ok(());
    }

    let result = if args.is_present("grund") {
        welt::run_grund(&source, console, memory)
    } else if args.is_present("compiled") {
        welt::run_compiled(&source, console, memory)
    } else {
        welt::run_welt(&source, console, memory)
    };

    if let Err(error) = result {
        bail!("{}", render(error, path, &source));
    }

    Ok(())
}

fn boot_memory(path: &str) -> anyhow::Result<Memory> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read boot program: {}", path))?;

    match welt::boot_memory(&source) {
        Ok(memory) => Ok(memory),
        Err(error) => bail!("Failed to boot memory\n{}", render(error, path, &source)),
    }
}

fn render(error: welt::Error, path: &str, source: &str) -> String {
    let diagnostics = Diagnostics::from(error).origin(path, source);
    diagnostics.to_string().trim_end().to_owned()
}
