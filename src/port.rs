use log::debug;
use thiserror::Error;

use crate::relay_types::CardInfo;
use crate::relay_types::UsbListing;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("No compatible relay card found")]
    NotFound,

    #[error("Unable to open device: {0}")]
    Open(String),

    #[error("Device I/O failed: {0}")]
    Io(String),

    #[error("Unsupported chip (bcdDevice {0:#06x}), not an R-type chip")]
    UnsupportedChip(u16),

    #[error("USB error: {0}")]
    Usb(String),
}

// one handle per transaction, see read_register_once / write_register_once
pub trait RelayPort {
    type Handle;

    fn open(&mut self) -> Result<Self::Handle, DeviceError>;

    fn read_register(&mut self, handle: &mut Self::Handle) -> Result<u8, DeviceError>;

    fn write_register(&mut self, handle: &mut Self::Handle, value: u8) -> Result<(), DeviceError>;

    fn close(&mut self, handle: Self::Handle);

    fn enumerate(&mut self) -> Result<Vec<UsbListing>, DeviceError>;

    fn detect(&mut self) -> Result<CardInfo, DeviceError>;
}

pub fn read_register_once<P: RelayPort>(port: &mut P) -> Result<u8, DeviceError> {
    let mut handle = port.open()?;
    let result = port.read_register(&mut handle);
    port.close(handle);
    if let Ok(value) = &result {
        debug!("Read GPIO bits {:02X}", value);
    }
    result
}

pub fn write_register_once<P: RelayPort>(port: &mut P, value: u8) -> Result<(), DeviceError> {
    let mut handle = port.open()?;
    debug!("Writing GPIO bits {:02X}", value);
    let result = port.write_register(&mut handle, value);
    port.close(handle);
    result
}
