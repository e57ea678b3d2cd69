// SainSmart relay boards drive their relays from the GPIO byte of an FT245RL in bitbang mode.

use log::debug;
use log::info;
use nusb::MaybeFuture;
use rs_ftdi::BitMode;
use rs_ftdi::FtdiDevice;

use crate::port::DeviceError;
use crate::port::RelayPort;
use crate::relay_types::CardInfo;
use crate::relay_types::UsbListing;
use crate::relay_types::PRODUCT_ID;
use crate::relay_types::VENDOR_ID;

// bcdDevice reported by FT232R / FT245R chips
const R_TYPE_RELEASE: u16 = 0x0600;

// all eight pins are outputs
const BITBANG_MASK: u8 = 0xFF;

const FTDI_PRODUCT_IDS: &[u16] = &[0x6001, 0x6010, 0x6011, 0x6014, 0x6015];

pub struct FtdiPort {
    relay_count: usize,
}

impl FtdiPort {
    pub fn new(relay_count: usize) -> FtdiPort {
        FtdiPort { relay_count }
    }
}

fn list_usb_devices() -> Result<Vec<nusb::DeviceInfo>, DeviceError> {
    let devices = nusb::list_devices()
        .wait()
        .map_err(|e| DeviceError::Usb(e.to_string()))?;
    Ok(devices.collect())
}

impl RelayPort for FtdiPort {
    type Handle = FtdiDevice;

    fn open(&mut self) -> Result<FtdiDevice, DeviceError> {
        debug!(
            "Opening FTDI device VID={:04X} PID={:04X}",
            VENDOR_ID, PRODUCT_ID
        );
        let mut device = FtdiDevice::open(VENDOR_ID, PRODUCT_ID)
            .map_err(|e| DeviceError::Open(e.to_string()))?;
        device
            .set_bitmode(BITBANG_MASK, BitMode::BitBang)
            .map_err(|e| DeviceError::Open(format!("unable to set bitbang mode: {}", e)))?;
        Ok(device)
    }

    fn read_register(&mut self, handle: &mut FtdiDevice) -> Result<u8, DeviceError> {
        handle
            .read_pins()
            .map_err(|e| DeviceError::Io(format!("read failed: {}", e)))
    }

    fn write_register(&mut self, handle: &mut FtdiDevice, value: u8) -> Result<(), DeviceError> {
        handle
            .write_data(&[value])
            .map(|_| ())
            .map_err(|e| DeviceError::Io(format!("write of {:#04x} failed: {}", value, e)))
    }

    fn close(&mut self, handle: FtdiDevice) {
        drop(handle);
        debug!("Closed FTDI device");
    }

    fn enumerate(&mut self) -> Result<Vec<UsbListing>, DeviceError> {
        let listings = list_usb_devices()?
            .into_iter()
            .filter(|dev| {
                dev.vendor_id() == VENDOR_ID && FTDI_PRODUCT_IDS.contains(&dev.product_id())
            })
            .map(|dev| UsbListing {
                manufacturer: dev.manufacturer_string().unwrap_or_default().to_string(),
                description: dev.product_string().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(listings)
    }

    fn detect(&mut self) -> Result<CardInfo, DeviceError> {
        let dev = list_usb_devices()?
            .into_iter()
            .find(|dev| dev.vendor_id() == VENDOR_ID && dev.product_id() == PRODUCT_ID)
            .ok_or(DeviceError::NotFound)?;

        let release = dev.device_version();
        if release != R_TYPE_RELEASE {
            return Err(DeviceError::UnsupportedChip(release));
        }

        let chip_id = match dev.serial_number() {
            Some(serial) => format!("FTDI serial {}", serial),
            None => format!(
                "FTDI bus {} address {}",
                dev.busnum(),
                dev.device_address()
            ),
        };

        let handle = self.open()?;
        self.close(handle);

        info!("Detected relay card {} ({} relays)", chip_id, self.relay_count);
        Ok(CardInfo {
            chip_id,
            relay_count: self.relay_count,
        })
    }
}
