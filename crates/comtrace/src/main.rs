mod cmd;
mod csv;
mod exit;
mod logging;
mod output;

use clap::error::ErrorKind;
use clap::Parser;

use crate::cmd::ConvertArgs;
use crate::exit::USAGE;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "comtrace",
    version,
    about = "Convert serial-line monitor captures into timed protocol frames"
)]
struct Cli {
    #[command(flatten)]
    convert: ConvertArgs,

    /// Run summary format (stdout).
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr). Overridden by COMTRACE_LOG.
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: LogLevel,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
            ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument => {
                println!("{}", exit::USAGE_LINE);
                std::process::exit(USAGE);
            }
            _ => {
                let _ = err.print();
                std::process::exit(USAGE);
            }
        },
    };
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.convert, format) {
        Ok(code) => std::process::exit(code),
        Err(err) if err.is_usage_line() => {
            println!("{err}");
            std::process::exit(err.code);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
