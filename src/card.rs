use log::info;
use thiserror::Error;

use crate::port::read_register_once;
use crate::port::write_register_once;
use crate::port::DeviceError;
use crate::port::RelayPort;
use crate::relay_bits;
use crate::relay_types::CardInfo;
use crate::relay_types::RelayState;
use crate::relay_types::FIRST_RELAY;
use crate::selection::validate;
use crate::selection::Selection;
use crate::selection::SelectionError;

#[derive(Debug, Error)]
pub enum CardError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub struct RelayCard<'a, P: RelayPort> {
    port: &'a mut P,
    info: CardInfo,
}

impl<'a, P: RelayPort> RelayCard<'a, P> {
    pub fn detect(port: &'a mut P) -> Result<RelayCard<'a, P>, DeviceError> {
        let info = port.detect()?;
        Ok(RelayCard { port, info })
    }

    pub fn info(&self) -> &CardInfo {
        &self.info
    }

    pub fn relay_count(&self) -> usize {
        self.info.relay_count
    }

    pub fn check(&self, selection: &Selection) -> Result<(), SelectionError> {
        validate(selection, FIRST_RELAY, self.relay_count())
    }

    pub fn read_states(&mut self) -> Result<Vec<RelayState>, DeviceError> {
        let register = read_register_once(self.port)?;
        Ok(relay_bits::decode(register, self.relay_count()))
    }

    pub fn read_state(&mut self, relay: u32) -> Result<RelayState, CardError> {
        validate(&Selection::Single(relay), FIRST_RELAY, self.relay_count())?;
        let register = read_register_once(self.port)?;
        let index = (relay - FIRST_RELAY) as usize;
        Ok(relay_bits::decode(register, index + 1)[index])
    }

    pub fn apply(
        &mut self,
        on: Option<&Selection>,
        off: Option<&Selection>,
    ) -> Result<u8, DeviceError> {
        let current = read_register_once(self.port)?;
        let register = apply_to_register(current, on, off, self.relay_count());
        info!("Switching relays {:02X} -> {:02X}", current, register);
        write_register_once(self.port, register)?;
        Ok(register)
    }
}

pub fn apply_to_register(
    register: u8,
    on: Option<&Selection>,
    off: Option<&Selection>,
    count: usize,
) -> u8 {
    let mut register = register;
    if let Some(on) = on {
        register = match on {
            Selection::All => relay_bits::all_on(register, count),
            _ => on.indices(FIRST_RELAY, count).into_iter().fold(register, |r, i| {
                relay_bits::set_bit(r, i, RelayState::On)
            }),
        };
    }
    if let Some(off) = off {
        register = match off {
            Selection::All => relay_bits::all_off(register, count),
            _ => off.indices(FIRST_RELAY, count).into_iter().fold(register, |r, i| {
                relay_bits::set_bit(r, i, RelayState::Off)
            }),
        };
    }
    register
}
