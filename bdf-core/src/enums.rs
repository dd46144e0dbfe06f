//! Enumerated fields of BDF headers.

use crate::literal::literal_enum;

literal_enum! {
    /// Name of an axis of a binary attachment.
    AxisName => "AxisName" {
        /// Time.
        Tim => "TIM",
        /// Baseline.
        Bal => "BAL",
        /// Antenna.
        Ant => "ANT",
        /// Baseband.
        Bab => "BAB",
        /// Spectral window.
        Spw => "SPW",
        /// Sideband.
        Sib => "SIB",
        /// Subscan.
        Sub => "SUB",
        /// Bin.
        Bin => "BIN",
        /// Atmospheric phase correction.
        Apc => "APC",
        /// Spectral point.
        Spp => "SPP",
        /// Polarization.
        Pol => "POL",
        /// Stokes parameter.
        Sto => "STO",
        /// Holography.
        Hol => "HOL",
    }
}

literal_enum! {
    /// Polarization product.
    StokesParameter => "StokesParameter" {
        I => "I",
        Q => "Q",
        U => "U",
        V => "V",
        Rr => "RR",
        Rl => "RL",
        Lr => "LR",
        Ll => "LL",
        Xx => "XX",
        Xy => "XY",
        Yx => "YX",
        Yy => "YY",
        Rx => "RX",
        Ry => "RY",
        Lx => "LX",
        Ly => "LY",
        Xr => "XR",
        Xl => "XL",
        Yr => "YR",
        Yl => "YL",
        Pp => "PP",
        Pq => "PQ",
        Qp => "QP",
        Qq => "QQ",
        RCircular => "RCIRCULAR",
        LCircular => "LCIRCULAR",
        Linear => "LINEAR",
        PTotal => "PTOTAL",
        PLinear => "PLINEAR",
        PCircular => "PCIRCULAR",
        PAngle => "PANGLE",
    }
}

literal_enum! {
    /// Which correlation products a document carries.
    CorrelationMode => "CorrelationMode" {
        /// Cross correlations only.
        CrossOnly => "CROSS_ONLY",
        /// Auto correlations only.
        AutoOnly => "AUTO_ONLY",
        /// Both cross and auto correlations.
        CrossAndAuto => "CROSS_AND_AUTO",
    }
}

impl CorrelationMode {
    /// Returns `true` if cross correlations are present.
    #[must_use]
    pub const fn has_cross(self) -> bool {
        !matches!(self, Self::AutoOnly)
    }

    /// Returns `true` if auto correlations are present.
    #[must_use]
    pub const fn has_auto(self) -> bool {
        !matches!(self, Self::CrossOnly)
    }
}

literal_enum! {
    /// Spectral resolution of the data.
    SpectralResolutionType => "SpectralResolutionType" {
        /// Channel averaged correlator data.
        ChannelAverage => "CHANNEL_AVERAGE",
        /// Baseband wide (total power) data.
        BasebandWide => "BASEBAND_WIDE",
        /// Full resolution correlator data.
        FullResolution => "FULL_RESOLUTION",
    }
}

literal_enum! {
    /// Kind of processor that produced the data.
    ProcessorType => "ProcessorType" {
        Correlator => "CORRELATOR",
        Radiometer => "RADIOMETER",
        Spectrometer => "SPECTROMETER",
    }
}

literal_enum! {
    /// Correlator architecture.
    CorrelatorType => "CorrelatorType" {
        Fx => "FX",
        Xf => "XF",
        Fxf => "FXF",
    }
}

literal_enum! {
    /// Net sideband of a spectral window.
    NetSideband => "NetSideband" {
        Nosb => "NOSB",
        Lsb => "LSB",
        Usb => "USB",
        Dsb => "DSB",
    }
}

literal_enum! {
    /// Baseband identifier.
    BasebandName => "BasebandName" {
        Nobb => "NOBB",
        Bb1 => "BB_1",
        Bb2 => "BB_2",
        Bb3 => "BB_3",
        Bb4 => "BB_4",
        Bb5 => "BB_5",
        Bb6 => "BB_6",
        Bb7 => "BB_7",
        Bb8 => "BB_8",
        BbAll => "BB_ALL",
    }
}

literal_enum! {
    /// Atmospheric phase correction state.
    AtmPhaseCorrection => "AtmPhaseCorrection" {
        ApUncorrected => "AP_UNCORRECTED",
        ApCorrected => "AP_CORRECTED",
        ApMixed => "AP_MIXED",
    }
}

literal_enum! {
    /// Numeric type of cross correlation values.
    CrossDataType => "PrimitiveDataType" {
        Int16 => "INT16_TYPE",
        Int32 => "INT32_TYPE",
        Float32 => "FLOAT32_TYPE",
    }
}

impl CrossDataType {
    /// Size of one value in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 | Self::Float32 => 4,
        }
    }
}

literal_enum! {
    /// Byte order of binary attachments.
    ByteOrder => "ByteOrder" {
        LittleEndian => "Little_Endian",
        BigEndian => "Big_Endian",
    }
}

impl ByteOrder {
    /// Byte order of the host.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::BigEndian
        } else {
            Self::LittleEndian
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;

    #[test]
    fn test_correlation_mode_products() {
        assert!(CorrelationMode::CrossOnly.has_cross());
        assert!(!CorrelationMode::CrossOnly.has_auto());
        assert!(!CorrelationMode::AutoOnly.has_cross());
        assert!(CorrelationMode::AutoOnly.has_auto());
        assert!(CorrelationMode::CrossAndAuto.has_cross());
        assert!(CorrelationMode::CrossAndAuto.has_auto());
    }

    #[test]
    fn test_cross_data_type_size() {
        assert_eq!(CrossDataType::Int16.size(), 2);
        assert_eq!(CrossDataType::Int32.size(), 4);
        assert_eq!(CrossDataType::Float32.size(), 4);
    }

    #[test]
    fn test_display_uses_literal() {
        assert_eq!(BasebandName::Bb3.to_string(), "BB_3");
        assert_eq!(ByteOrder::LittleEndian.to_string(), "Little_Endian");
        assert_eq!(
            SpectralResolutionType::from_literal("BASEBAND_WIDE"),
            Some(SpectralResolutionType::BasebandWide)
        );
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(AxisName::all().len(), 13);
        assert_eq!(StokesParameter::all().len(), 31);
        assert_eq!(BasebandName::all().len(), 10);
    }
}
