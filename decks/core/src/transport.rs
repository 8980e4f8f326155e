//! Raw report transport used by deck drivers.
//!
//! Drivers only speak to hardware through this trait, so protocol logic can run
//! against an in-memory fake in tests. Opening and enumerating devices is left
//! to the caller.

use hidapi::HidDevice;

use crate::Result;

/// Byte-level access to a HID-class device
pub trait Transport {
    /// Write one output report. The first byte is the report id.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read one input report into `buf`. Returns 0 when nothing is available.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// USB serial number string
    fn serial_number(&mut self) -> Result<Option<String>>;

    /// Request an input report by id. `buf[0]` is overwritten with the id.
    fn read_input_report(&mut self, report_id: u8, buf: &mut [u8]) -> Result<usize>;
}

impl Transport for HidDevice {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(HidDevice::write(self, data)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(HidDevice::read(self, buf)?)
    }

    fn serial_number(&mut self) -> Result<Option<String>> {
        Ok(self.get_serial_number_string()?)
    }

    fn read_input_report(&mut self, report_id: u8, buf: &mut [u8]) -> Result<usize> {
        if let Some(first) = buf.first_mut() {
            *first = report_id;
        }
        Ok(self.get_input_report(buf)?)
    }
}
