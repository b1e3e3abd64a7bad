use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tm2sublime::{Diagnostic, DiagnosticSink, Error, LogSink, RawGrammar, convert_with};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// A `.sublime-syntax` file
    Yaml,
    Json,
}

/// Converts a TextMate JSON grammar into a sublime-syntax grammar
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TextMate grammar (JSON)
    input: PathBuf,

    /// Where to write the converted grammar, stdout if not given
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Refuse grammars nesting begin/end rules deeper than this
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Exit with an error if the conversion reported any warning
    #[arg(long)]
    strict: bool,
}

/// Logs every diagnostic and counts them.
#[derive(Debug, Default)]
struct CountingSink {
    count: usize,
}

impl DiagnosticSink for CountingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        LogSink.report(diagnostic);
    }
}

fn run(cli: &Cli) -> Result<usize, Error> {
    log::info!("Converting {}", cli.input.display());
    let raw = RawGrammar::load_from_file(&cli.input)?;

    let depth = raw.nesting_depth();
    if depth > cli.max_depth {
        return Err(Error::NestingTooDeep {
            depth,
            limit: cli.max_depth,
        });
    }

    let mut sink = CountingSink::default();
    let syntax = convert_with(&raw, &mut sink);
    log::info!(
        "Converted {} into {} contexts",
        syntax.scope,
        syntax.contexts.len()
    );

    let out = match cli.format {
        Format::Yaml => syntax.to_yaml()?,
        Format::Json => syntax.to_json()?,
    };
    match &cli.output {
        Some(path) => fs::write(path, out)?,
        None => print!("{out}"),
    }

    Ok(sink.count)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(warnings) if cli.strict => {
            log::error!("{warnings} warning(s) reported in strict mode");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
