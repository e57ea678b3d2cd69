use std::io::Write;

use log::debug;
use log::info;
use thiserror::Error;

use crate::card::CardError;
use crate::card::RelayCard;
use crate::port::DeviceError;
use crate::port::RelayPort;
use crate::relay_types::RelayState;
use crate::selection::parse_selection;
use crate::selection::parse_status_target;
use crate::selection::Selection;
use crate::selection::SelectionError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Mutate {
        on: Option<Selection>,
        off: Option<Selection>,
    },
    Status(Selection),
    Enumerate,
    Help(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Argument(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("No compatible device detected: {0}")]
    Detection(#[source] DeviceError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Relays switched but reading back their state failed: {0}")]
    Confirmation(#[source] DeviceError),

    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl CommandError {
    pub fn is_detection(&self) -> bool {
        matches!(self, CommandError::Detection(_))
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, CommandError::Argument(_))
    }
}

impl From<CardError> for CommandError {
    fn from(e: CardError) -> Self {
        match e {
            CardError::Selection(e) => CommandError::Selection(e),
            CardError::Device(e) => CommandError::Device(e),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Request<'a> {
    pub on: Option<&'a str>,
    pub off: Option<&'a str>,
    pub status: Option<&'a str>,
    pub findall: bool,
}

impl<'a> Request<'a> {
    pub fn into_intent(self) -> Result<Intent, CommandError> {
        if self.findall {
            return Ok(Intent::Enumerate);
        }

        if let Some(status) = self.status {
            if self.on.is_some() || self.off.is_some() {
                return Err(CommandError::Argument(
                    "--status cannot be combined with --on or --off".to_string(),
                ));
            }
            return parse_status_target(status)
                .map(Intent::Status)
                .map_err(|e| match e {
                    SelectionError::InvalidRelayNumber(_) | SelectionError::ListNotAllowed(_) => {
                        CommandError::Argument(format!(
                            "invalid value '{}' is set to --status argument",
                            status
                        ))
                    }
                    e => CommandError::Selection(e),
                });
        }

        if self.on.is_none() && self.off.is_none() {
            return Err(CommandError::Argument("too few arguments!".to_string()));
        }

        let on = self.on.map(parse_selection).transpose()?;
        let off = self.off.map(parse_selection).transpose()?;

        let all_twice = matches!((&on, &off), (Some(on), Some(off)) if on.is_all() && off.is_all());
        if all_twice {
            return Err(CommandError::Argument(
                "invalid arguments. 'all' value is already set to --off argument".to_string(),
            ));
        }

        Ok(Intent::Mutate { on, off })
    }
}

pub fn run<P: RelayPort, W: Write>(
    intent: &Intent,
    port: &mut P,
    out: &mut W,
) -> Result<(), CommandError> {
    match intent {
        Intent::Help(text) => {
            write!(out, "{}", text)?;
            Ok(())
        }
        Intent::Enumerate => enumerate(port, out),
        Intent::Status(target) => {
            let mut card = detect(port)?;
            status(&mut card, target, out)
        }
        Intent::Mutate { on, off } => {
            let mut card = detect(port)?;
            mutate(&mut card, on.as_ref(), off.as_ref(), out)
        }
    }
}

fn detect<P: RelayPort>(port: &mut P) -> Result<RelayCard<'_, P>, CommandError> {
    let card = RelayCard::detect(port).map_err(CommandError::Detection)?;
    debug!("Using {}", card.info().chip_id);
    Ok(card)
}

fn enumerate<P: RelayPort, W: Write>(port: &mut P, out: &mut W) -> Result<(), CommandError> {
    let listings = port.enumerate()?;
    writeln!(out, "Number of FTDI devices found: {}", listings.len())?;
    for (i, listing) in listings.iter().enumerate() {
        writeln!(out, "Checking device: {}", i)?;
        writeln!(
            out,
            "Manufacturer: {}, Description: {}",
            listing.manufacturer, listing.description
        )?;
    }
    Ok(())
}

fn status<P: RelayPort, W: Write>(
    card: &mut RelayCard<'_, P>,
    target: &Selection,
    out: &mut W,
) -> Result<(), CommandError> {
    match target {
        Selection::Single(relay) => {
            let state = card.read_state(*relay)?;
            writeln!(out, "{}: {}", relay, state)?;
        }
        _ => report(&card.read_states()?, out)?,
    }
    Ok(())
}

fn mutate<P: RelayPort, W: Write>(
    card: &mut RelayCard<'_, P>,
    on: Option<&Selection>,
    off: Option<&Selection>,
    out: &mut W,
) -> Result<(), CommandError> {
    if let Some(on) = on {
        card.check(on)?;
    }
    if let Some(off) = off {
        card.check(off)?;
    }

    card.apply(on, off)?;

    let states = card.read_states().map_err(CommandError::Confirmation)?;
    info!("Relay card now reports {} relays", states.len());
    report(&states, out)
}

fn report<W: Write>(states: &[RelayState], out: &mut W) -> Result<(), CommandError> {
    for (i, state) in states.iter().enumerate() {
        writeln!(out, "{}: {}", i + 1, state)?;
    }
    Ok(())
}
