//! Binary attachment descriptors.
//!
//! A descriptor declares how many values an attachment holds and the order
//! of its axes, slowest varying first. The axis list is the recipe for
//! de-linearizing the flat array.

use crate::enums::{AxisName, CorrelatorType};
use std::fmt;

/// The six kinds of binary attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachmentKind {
    /// Flags (`u32`).
    Flags,
    /// Actual times (`i64`).
    ActualTimes,
    /// Actual durations (`i64`).
    ActualDurations,
    /// Cross correlation data (`i16`, `i32` or `f32`).
    CrossData,
    /// Auto correlation data (`f32`).
    AutoData,
    /// Zero lags (`f32`).
    ZeroLags,
}

impl AttachmentKind {
    /// All kinds, in document order.
    pub const ALL: [Self; 6] = [
        Self::Flags,
        Self::ActualTimes,
        Self::ActualDurations,
        Self::CrossData,
        Self::AutoData,
        Self::ZeroLags,
    ];

    /// Element name used in XML and in attachment file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Flags => "flags",
            Self::ActualTimes => "actualTimes",
            Self::ActualDurations => "actualDurations",
            Self::CrossData => "crossData",
            Self::AutoData => "autoData",
            Self::ZeroLags => "zeroLags",
        }
    }

    /// Looks up a kind by element name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Name of the attachment file relative to a project path.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.bin", self.name())
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Size and axes of one binary attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryPart {
    size: u32,
    axes: Vec<AxisName>,
}

impl BinaryPart {
    /// Creates a descriptor. `size` counts values, not bytes.
    #[must_use]
    pub fn new(size: u32, axes: Vec<AxisName>) -> Self {
        Self { size, axes }
    }

    /// Number of values.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Axes, slowest varying first.
    #[must_use]
    pub fn axes(&self) -> &[AxisName] {
        &self.axes
    }

    /// Returns `true` if the attachment is declared.
    #[must_use]
    pub const fn is_declared(&self) -> bool {
        self.size != 0
    }
}

/// Descriptor of the autoData attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoDataBinaryPart {
    part: BinaryPart,
    normalized: bool,
}

impl AutoDataBinaryPart {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(size: u32, axes: Vec<AxisName>, normalized: bool) -> Self {
        Self {
            part: BinaryPart::new(size, axes),
            normalized,
        }
    }

    /// Generic part.
    #[must_use]
    pub const fn part(&self) -> &BinaryPart {
        &self.part
    }

    /// Number of values.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.part.size
    }

    /// Axes, slowest varying first.
    #[must_use]
    pub fn axes(&self) -> &[AxisName] {
        &self.part.axes
    }

    /// Whether the values are normalized.
    #[must_use]
    pub const fn normalized(&self) -> bool {
        self.normalized
    }
}

/// Descriptor of the zeroLags attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroLagsBinaryPart {
    part: BinaryPart,
    correlator_type: CorrelatorType,
}

impl Default for ZeroLagsBinaryPart {
    fn default() -> Self {
        Self {
            part: BinaryPart::default(),
            correlator_type: CorrelatorType::Xf,
        }
    }
}

impl ZeroLagsBinaryPart {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(size: u32, axes: Vec<AxisName>, correlator_type: CorrelatorType) -> Self {
        Self {
            part: BinaryPart::new(size, axes),
            correlator_type,
        }
    }

    /// Generic part.
    #[must_use]
    pub const fn part(&self) -> &BinaryPart {
        &self.part
    }

    /// Number of values.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.part.size
    }

    /// Axes, slowest varying first.
    #[must_use]
    pub fn axes(&self) -> &[AxisName] {
        &self.part.axes
    }

    /// Correlator architecture.
    #[must_use]
    pub const fn correlator_type(&self) -> CorrelatorType {
        self.correlator_type
    }
}
