#![allow(dead_code)]

use std::collections::BTreeMap;

use stack_light::OutputDriver;

/// Output driver that remembers everything written to it
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub configured: Vec<u8>,
    pub writes: Vec<(u8, u8)>,
    pub duty: BTreeMap<u8, u8>,
}

impl RecordingDriver {
    pub fn duty(&self, pin: u8) -> Option<u8> {
        self.duty.get(&pin).copied()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl OutputDriver for RecordingDriver {
    type Channel = u8;

    fn configure(&mut self, channel: u8) {
        self.configured.push(channel);
    }

    fn write(&mut self, channel: u8, duty: u8) {
        self.writes.push((channel, duty));
        self.duty.insert(channel, duty);
    }
}

/// Reference gamma curve
pub fn gamma(raw: u8) -> u8 {
    let corrected = (f64::from(raw) / 255.0).powf(2.5) * 255.0;
    corrected.round() as u8
}
