//! evdev touchscreen source
//!
//! The kernel interface blocks on read, so a dedicated reader thread
//! drains events and forwards assembled samples over a channel; `poll`
//! on the render loop side is a non-blocking `try_recv`.

use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use evdev::{AbsoluteAxisType, Device, InputEventKind, Key};

use crate::input::TouchSample;

use super::{DeviceError, TouchSource};

/// Touch panel read through the Linux input subsystem
pub struct EvdevTouch {
    rx: Receiver<TouchSample>,
}

impl EvdevTouch {
    /// Find the touch panel among the input devices
    ///
    /// Matches by device name (ADS7846-class SPI panels and the usual
    /// USB touchscreen names).
    pub fn discover() -> Result<Self, DeviceError> {
        for (path, device) in evdev::enumerate() {
            let name = device.name().unwrap_or("").to_lowercase();
            if name.contains("touch") || name.contains("ads7846") || name.contains("waveshare") {
                tracing::info!(path = %path.display(), name = %name, "touch device found");
                return Ok(Self::from_device(device));
            }
        }
        Err(DeviceError::NotFound("touchscreen".into()))
    }

    /// Wrap an already-open device
    pub fn from_device(mut device: Device) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let mut raw_x = 0;
            let mut raw_y = 0;
            let mut touching = false;

            loop {
                match device.fetch_events() {
                    Ok(events) => {
                        let mut dirty = false;
                        for ev in events {
                            match ev.kind() {
                                InputEventKind::AbsAxis(AbsoluteAxisType::ABS_X) => {
                                    raw_x = ev.value();
                                    dirty = true;
                                }
                                InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Y) => {
                                    raw_y = ev.value();
                                    dirty = true;
                                }
                                InputEventKind::Key(Key::BTN_TOUCH) => {
                                    touching = ev.value() != 0;
                                    dirty = true;
                                }
                                _ => {}
                            }
                        }
                        if dirty {
                            let sample = TouchSample {
                                x: raw_x,
                                y: raw_y,
                                touching,
                            };
                            if tx.send(sample).is_err() {
                                // Consumer gone, stop reading
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "touch read failed, retrying");
                        std::thread::sleep(Duration::from_secs(1));
                    }
                }
            }
        });

        Self { rx }
    }
}

impl TouchSource for EvdevTouch {
    fn poll(&mut self) -> Result<Option<TouchSample>, DeviceError> {
        match self.rx.try_recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(DeviceError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "touch reader thread exited",
            ))),
        }
    }
}
