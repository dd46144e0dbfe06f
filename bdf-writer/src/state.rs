//! Writer call-sequence states.
//!
//! Four sequences are legal:
//! 1. `tp_data` → `done`
//! 2. `tp_data_header` → `add_tp_subscan` → `done`
//! 3. `wvr_data` → `done`
//! 4. `corr_data_header` → (`add_integration`+ | `add_subintegration`+) → `done`
//!
//! `abort_integration` counts as `add_integration`.

use std::fmt;

/// State of a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriterState {
    /// Nothing written yet.
    Start,
    /// A one-shot total power document was written.
    TpData,
    /// A total power header was written.
    TpDataHeader,
    /// The total power subscan was written.
    AddTpSubscan,
    /// A one-shot WVR document was written.
    WvrData,
    /// A correlator header was written.
    CorrDataHeader,
    /// At least one integration was written.
    AddIntegration,
    /// At least one subintegration was written.
    AddSubintegration,
    /// The document is closed.
    End,
}

impl WriterState {
    /// Returns the state reached by `operation`, or `None` if the call is illegal.
    #[must_use]
    pub const fn next(self, operation: Operation) -> Option<Self> {
        use Operation as Op;
        use WriterState as S;
        match (self, operation) {
            (S::Start, Op::TpData) => Some(S::TpData),
            (S::Start, Op::TpDataHeader) => Some(S::TpDataHeader),
            (S::TpDataHeader, Op::AddTpSubscan) => Some(S::AddTpSubscan),
            (S::Start, Op::WvrData) => Some(S::WvrData),
            (S::Start, Op::CorrDataHeader) => Some(S::CorrDataHeader),
            (S::CorrDataHeader | S::AddIntegration, Op::AddIntegration | Op::AbortIntegration) => {
                Some(S::AddIntegration)
            }
            (S::CorrDataHeader | S::AddSubintegration, Op::AddSubintegration) => {
                Some(S::AddSubintegration)
            }
            (
                S::TpData | S::AddTpSubscan | S::WvrData | S::AddIntegration | S::AddSubintegration,
                Op::Done,
            ) => Some(S::End),
            _ => None,
        }
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "S_NO_STATE",
            Self::TpData => "S_TPDATA",
            Self::TpDataHeader => "S_TPDATAHEADER",
            Self::AddTpSubscan => "S_ADDTPSUBSCAN",
            Self::WvrData => "S_WVRDATA",
            Self::CorrDataHeader => "S_CORRDATAHEADER",
            Self::AddIntegration => "S_ADDINTEGRATION",
            Self::AddSubintegration => "S_ADDSUBINTEGRATION",
            Self::End => "S_END",
        };
        f.write_str(name)
    }
}

/// Public writer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// One-shot total power document.
    TpData,
    /// Global header of a total power document.
    TpDataHeader,
    /// Data of a total power subscan.
    AddTpSubscan,
    /// One-shot WVR document.
    WvrData,
    /// Global header of a correlator document.
    CorrDataHeader,
    /// One FULL_RESOLUTION integration.
    AddIntegration,
    /// One CHANNEL_AVERAGE subintegration.
    AddSubintegration,
    /// An aborted integration.
    AbortIntegration,
    /// End of the document.
    Done,
}

impl Operation {
    /// All operations.
    pub const ALL: [Self; 9] = [
        Self::TpData,
        Self::TpDataHeader,
        Self::AddTpSubscan,
        Self::WvrData,
        Self::CorrDataHeader,
        Self::AddIntegration,
        Self::AddSubintegration,
        Self::AbortIntegration,
        Self::Done,
    ];

    /// Name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TpData => "tpData",
            Self::TpDataHeader => "tpDataHeader",
            Self::AddTpSubscan => "addTPSubscan",
            Self::WvrData => "wvrData",
            Self::CorrDataHeader => "corrDataHeader",
            Self::AddIntegration => "addIntegration",
            Self::AddSubintegration => "addSubintegration",
            Self::AbortIntegration => "abortIntegration",
            Self::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(operations: &[Operation]) -> Option<WriterState> {
        operations
            .iter()
            .try_fold(WriterState::Start, |state, op| state.next(*op))
    }

    #[test]
    fn test_legal_sequences() {
        use Operation as Op;
        let legal: [&[Operation]; 6] = [
            &[Op::TpData, Op::Done],
            &[Op::TpDataHeader, Op::AddTpSubscan, Op::Done],
            &[Op::WvrData, Op::Done],
            &[Op::CorrDataHeader, Op::AddIntegration, Op::Done],
            &[Op::CorrDataHeader, Op::AddIntegration, Op::AbortIntegration, Op::AddIntegration, Op::Done],
            &[Op::CorrDataHeader, Op::AddSubintegration, Op::AddSubintegration, Op::Done],
        ];
        for sequence in legal {
            assert_eq!(run(sequence), Some(WriterState::End), "{sequence:?}");
        }
    }

    #[test]
    fn test_illegal_sequences() {
        use Operation as Op;
        let illegal: [&[Operation]; 8] = [
            &[Op::AddIntegration],
            &[Op::Done],
            &[Op::CorrDataHeader, Op::Done],
            &[Op::CorrDataHeader, Op::AddIntegration, Op::AddSubintegration],
            &[Op::CorrDataHeader, Op::AddSubintegration, Op::AddIntegration],
            &[Op::TpDataHeader, Op::AddTpSubscan, Op::AddTpSubscan],
            &[Op::TpDataHeader, Op::Done],
            &[Op::TpData, Op::TpData],
        ];
        for sequence in illegal {
            assert_eq!(run(sequence), None, "{sequence:?}");
        }
    }

    #[test]
    fn test_end_is_terminal() {
        for op in Operation::ALL {
            assert_eq!(WriterState::End.next(op), None);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(WriterState::CorrDataHeader.to_string(), "S_CORRDATAHEADER");
        assert_eq!(Operation::AddTpSubscan.name(), "addTPSubscan");
    }
}
