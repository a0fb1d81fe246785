//! Control Identifiers and Values
//!
//! Defines the tunable camera parameters and the tagged values that carry them.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset applied to a control id to name its automatic-mode switch
const AUTO_MODIFIER: u32 = 0x100;

/// Tunable camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Control {
    /// Brightness
    Brightness = 1,
    /// Contrast
    Contrast = 2,
    /// Colour saturation
    Saturation = 3,
    /// Hue
    Hue = 4,
    /// Sharpness
    Sharpness = 5,
    /// Gamma
    Gamma = 6,
    /// White balance colour temperature
    WhiteBalanceTemp = 7,
    /// Sensor gain
    Gain = 8,
    /// Absolute exposure time
    ExposureAbsolute = 9,
    /// Binning mode index
    Binning = 10,
    /// Horizontal flip
    HFlip = 11,
    /// Vertical flip
    VFlip = 12,
    /// USB transfer speed
    Speed = 13,
    /// Red channel balance
    RedBalance = 14,
    /// Blue channel balance
    BlueBalance = 15,
    /// Green channel balance
    GreenBalance = 16,
    /// Status LED mode
    LedState = 17,
    /// Manual white balance
    WhiteBalance = 19,
    /// Automatic white balance temperature
    AutoWhiteBalanceTemp = 20,
    /// Whether auto exposure may vary the frame rate
    AutoExposurePriority = 21,
    /// Automatic white balance switch
    AutoWhiteBalance = AUTO_MODIFIER | 19,
    /// Automatic hue switch
    AutoHue = AUTO_MODIFIER | 4,
    /// Auto exposure mode
    AutoExposure = AUTO_MODIFIER | 9,
}

impl Control {
    /// Every control this crate knows about
    pub const ALL: [Control; 23] = [
        Control::Brightness,
        Control::Contrast,
        Control::Saturation,
        Control::Hue,
        Control::Sharpness,
        Control::Gamma,
        Control::WhiteBalanceTemp,
        Control::Gain,
        Control::ExposureAbsolute,
        Control::Binning,
        Control::HFlip,
        Control::VFlip,
        Control::Speed,
        Control::RedBalance,
        Control::BlueBalance,
        Control::GreenBalance,
        Control::LedState,
        Control::WhiteBalance,
        Control::AutoWhiteBalanceTemp,
        Control::AutoExposurePriority,
        Control::AutoWhiteBalance,
        Control::AutoHue,
        Control::AutoExposure,
    ];

    /// Get the numeric control id
    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Get a short human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Control::Brightness => "brightness",
            Control::Contrast => "contrast",
            Control::Saturation => "saturation",
            Control::Hue => "hue",
            Control::Sharpness => "sharpness",
            Control::Gamma => "gamma",
            Control::WhiteBalanceTemp => "white balance temperature",
            Control::Gain => "gain",
            Control::ExposureAbsolute => "exposure",
            Control::Binning => "binning",
            Control::HFlip => "horizontal flip",
            Control::VFlip => "vertical flip",
            Control::Speed => "speed",
            Control::RedBalance => "red balance",
            Control::BlueBalance => "blue balance",
            Control::GreenBalance => "green balance",
            Control::LedState => "LED state",
            Control::WhiteBalance => "white balance",
            Control::AutoWhiteBalanceTemp => "auto white balance temperature",
            Control::AutoExposurePriority => "auto exposure priority",
            Control::AutoWhiteBalance => "auto white balance",
            Control::AutoHue => "auto hue",
            Control::AutoExposure => "auto exposure",
        }
    }
}

impl TryFrom<u32> for Control {
    type Error = ControlError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Control::ALL
            .iter()
            .copied()
            .find(|c| c.id() == id)
            .ok_or(ControlError::InvalidControl(id))
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Value type a control is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// On/off switch
    Boolean,
    /// Index into a discrete set
    Discrete,
}

/// A tagged control value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ControlValue {
    Int32(i32),
    Int64(i64),
    Boolean(bool),
    Discrete(i32),
}

impl ControlValue {
    /// Get the tag of this value
    pub fn kind(&self) -> ControlType {
        match self {
            ControlValue::Int32(_) => ControlType::Int32,
            ControlValue::Int64(_) => ControlType::Int64,
            ControlValue::Boolean(_) => ControlType::Boolean,
            ControlValue::Discrete(_) => ControlType::Discrete,
        }
    }

    /// Widen the payload to i64 (booleans become 0 or 1)
    pub fn as_i64(&self) -> i64 {
        match *self {
            ControlValue::Int32(v) | ControlValue::Discrete(v) => i64::from(v),
            ControlValue::Int64(v) => v,
            ControlValue::Boolean(v) => i64::from(v),
        }
    }

    /// Build a value of the given type from an i64 payload
    ///
    /// Returns `None` when the payload does not fit the type.
    pub fn from_i64(kind: ControlType, raw: i64) -> Option<Self> {
        match kind {
            ControlType::Int32 => i32::try_from(raw).ok().map(ControlValue::Int32),
            ControlType::Int64 => Some(ControlValue::Int64(raw)),
            ControlType::Boolean => match raw {
                0 => Some(ControlValue::Boolean(false)),
                1 => Some(ControlValue::Boolean(true)),
                _ => None,
            },
            ControlType::Discrete => i32::try_from(raw).ok().map(ControlValue::Discrete),
        }
    }
}
