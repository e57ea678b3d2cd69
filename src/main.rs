mod card;
mod dispatch;
mod ftdi_port;
mod port;
mod relay_bits;
mod relay_types;
mod selection;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use clap::error::ErrorKind;
use clap::ArgAction;
use clap::CommandFactory;
use clap::Parser;
use log::debug;

use dispatch::CommandError;
use dispatch::Intent;
use dispatch::Request;
use ftdi_port::FtdiPort;
use relay_types::MAX_RELAYS;

#[derive(Debug, Parser)]
#[command(name = "ftdi-relay", version, disable_help_flag = true)]
#[command(about = "Switch and query the relays of an FTDI bitbang USB relay card")]
struct Cli {
    /// Switch relays on: a number, a comma separated list or 'all'
    #[arg(short = 'o', long, value_name = "RELAYS")]
    on: Option<String>,

    /// Switch relays off: a number, a comma separated list or 'all'
    #[arg(short = 'f', long, value_name = "RELAYS")]
    off: Option<String>,

    /// Print relay state: a number or 'all'
    #[arg(short = 's', long, value_name = "RELAY")]
    status: Option<String>,

    /// List all FTDI devices connected to the system
    #[arg(short = 'a', long)]
    findall: bool,

    /// Number of relays on the card (4 or 8)
    #[arg(short = 'c', long, default_value_t = 4, value_parser = parse_channels)]
    channels: usize,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Silence all log output
    #[arg(short, long)]
    quiet: bool,

    /// Print this help
    #[arg(short, long, action = ArgAction::SetTrue)]
    help: bool,
}

fn parse_channels(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(4) => Ok(4),
        Ok(MAX_RELAYS) => Ok(MAX_RELAYS),
        _ => Err(format!("'{}' is not a supported card, use 4 or 8", s)),
    }
}

impl Cli {
    fn intent(&self) -> Result<Intent, CommandError> {
        if self.help {
            return Ok(Intent::Help(Cli::command().render_help().to_string()));
        }
        Request {
            on: self.on.as_deref(),
            off: self.off.as_deref(),
            status: self.status.as_deref(),
            findall: self.findall,
        }
        .into_intent()
    }
}

fn usage() -> String {
    Cli::command().render_usage().to_string()
}

fn check_permission() {
    // SAFETY: geteuid has no preconditions and cannot fail
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        eprintln!("\nWarning:\n this program is currently not running with root privileges !");
        eprintln!("Therefore it might not be able to access your relay cards communication port.");
        eprintln!("Consider invoking the program from the root account or use \"sudo ...\"");
    }
}

fn run() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            e.print().context("failed to print version")?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            e.print().context("failed to print usage")?;
            return Ok(ExitCode::FAILURE);
        }
    };

    stderrlog::new()
        .module(module_path!())
        .quiet(cli.quiet)
        .verbosity(cli.verbose as usize + 1)
        .init()
        .context("failed to initialize logging")?;

    let intent = match cli.intent() {
        Ok(intent) => intent,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_argument() {
                eprintln!("\n{}", usage());
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!("Running {:?}", intent);

    let mut port = FtdiPort::new(cli.channels);
    let mut out = io::stdout().lock();

    match dispatch::run(&intent, &mut port, &mut out) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", e);
            if e.is_detection() {
                check_permission();
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
