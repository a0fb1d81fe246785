//! Per-Session Control Limits
//!
//! Limits are filled in once when a camera is opened and never change for
//! the lifetime of that session.

use crate::control::{Control, ControlType};
use crate::error::ControlError;
use crate::MAX_BINNING;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared type and numeric bounds of one control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Declared value type
    pub kind: ControlType,
    /// Smallest accepted value
    pub min: i64,
    /// Largest accepted value
    pub max: i64,
    /// Distance between accepted values, counted from `min`
    pub step: i64,
    /// Value applied when the camera is opened
    pub default: i64,
}

impl ControlLimits {
    /// Create limits, rejecting `min > max` and `step < 1`
    pub fn new(
        kind: ControlType,
        min: i64,
        max: i64,
        step: i64,
        default: i64,
    ) -> Result<Self, ControlError> {
        if min > max || step < 1 {
            return Err(ControlError::InvalidLimits { min, max, step });
        }
        Ok(Self {
            kind,
            min,
            max,
            step,
            default: default.clamp(min, max),
        })
    }

    /// Create unit-step limits
    pub fn range(kind: ControlType, min: i64, max: i64, default: i64) -> Result<Self, ControlError> {
        Self::new(kind, min, max, 1, default)
    }

    /// Create limits for an on/off control
    pub fn boolean(default: bool) -> Self {
        Self {
            kind: ControlType::Boolean,
            min: 0,
            max: 1,
            step: 1,
            default: i64::from(default),
        }
    }

    /// Whether `value` lies within `[min, max]`
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `value` sits on a step boundary counted from `min`
    pub fn is_aligned(&self, value: i64) -> bool {
        (i128::from(value) - i128::from(self.min)) % i128::from(self.step) == 0
    }

    /// Whether `value` is both in range and aligned
    pub fn accepts(&self, value: i64) -> bool {
        self.contains(value) && self.is_aligned(value)
    }
}

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub x: u32,
    pub y: u32,
}

/// Supported frame sizes for each binning mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSizes {
    sizes: [Vec<FrameSize>; MAX_BINNING + 1],
}

impl FrameSizes {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame size for a binning mode
    ///
    /// Modes above `MAX_BINNING` are ignored.
    pub fn add(&mut self, binning: usize, size: FrameSize) -> &mut Self {
        if let Some(list) = self.sizes.get_mut(binning) {
            if !list.contains(&size) {
                list.push(size);
            }
        }
        self
    }

    /// Frame sizes available at a binning mode (empty for unknown modes)
    pub fn for_binning(&self, binning: usize) -> &[FrameSize] {
        self.sizes.get(binning).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of frame sizes available at a binning mode
    pub fn count(&self, binning: usize) -> usize {
        self.for_binning(binning).len()
    }
}

/// Everything a camera session knows about its controls
#[derive(Debug, Clone, Default)]
pub struct ControlSet {
    limits: HashMap<Control, ControlLimits>,
    frame_sizes: FrameSizes,
}

impl ControlSet {
    /// Create an empty control set
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a control with its limits, replacing any earlier entry
    pub fn insert(&mut self, control: Control, limits: ControlLimits) -> &mut Self {
        self.limits.insert(control, limits);
        self
    }

    /// Builder form of `insert`
    pub fn with(mut self, control: Control, limits: ControlLimits) -> Self {
        self.insert(control, limits);
        self
    }

    /// Replace the binning frame-size table
    pub fn with_frame_sizes(mut self, frame_sizes: FrameSizes) -> Self {
        self.frame_sizes = frame_sizes;
        self
    }

    /// Limits of a control, `None` if the camera does not support it
    pub fn get(&self, control: Control) -> Option<&ControlLimits> {
        self.limits.get(&control)
    }

    /// Declared type of a control, `None` if unsupported
    pub fn declared_type(&self, control: Control) -> Option<ControlType> {
        self.get(control).map(|l| l.kind)
    }

    /// Whether the camera supports a control
    pub fn supports(&self, control: Control) -> bool {
        self.limits.contains_key(&control)
    }

    /// Binning frame-size table
    pub fn frame_sizes(&self) -> &FrameSizes {
        &self.frame_sizes
    }

    /// Supported controls
    pub fn controls(&self) -> impl Iterator<Item = Control> + '_ {
        self.limits.keys().copied()
    }
}
