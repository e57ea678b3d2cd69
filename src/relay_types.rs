use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

pub const VENDOR_ID: u16 = 0x0403;
pub const PRODUCT_ID: u16 = 0x6001;

pub const FIRST_RELAY: u32 = 1;
pub const MAX_RELAYS: usize = 8;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelayState {
    On,
    Off,
}

impl From<bool> for RelayState {
    fn from(on: bool) -> Self {
        match on {
            true => RelayState::On,
            false => RelayState::Off,
        }
    }
}

impl Display for RelayState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RelayState::On => write!(f, "ON"),
            RelayState::Off => write!(f, "OFF"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardInfo {
    pub chip_id: String,
    pub relay_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsbListing {
    pub manufacturer: String,
    pub description: String,
}
