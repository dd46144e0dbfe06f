//! The `projectPath` addressing grammar.
//!
//! A project path is 3, 4 or 5 decimal numbers, each terminated by a
//! slash: `execBlock/scan/subscan/[integration/[subintegration/]]`.

use std::fmt;
use thiserror::Error;

/// Why a string is not a project path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectPathError {
    /// Not a sequence of slash-terminated decimal numbers.
    #[error("not a sequence of slash-terminated numbers")]
    Malformed,

    /// Well formed, but with a number of components other than expected.
    #[error("{found} components, expected {expected}")]
    WrongArity {
        /// Expected number of components.
        expected: usize,
        /// Number of components found.
        found: usize,
    },

    /// A component does not fit in 32 bits.
    #[error("component '{component}' does not fit in 32 bits")]
    ComponentOverflow {
        /// Offending component.
        component: String,
    },
}

/// Parsed project path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectPath {
    exec_block_num: u32,
    scan_num: u32,
    subscan_num: u32,
    integration_num: Option<u32>,
    subintegration_num: Option<u32>,
}

impl ProjectPath {
    /// Creates a subscan level path (3 components).
    #[must_use]
    pub const fn subscan(exec_block_num: u32, scan_num: u32, subscan_num: u32) -> Self {
        Self {
            exec_block_num,
            scan_num,
            subscan_num,
            integration_num: None,
            subintegration_num: None,
        }
    }

    /// Creates an integration level path (4 components).
    #[must_use]
    pub const fn integration(
        exec_block_num: u32,
        scan_num: u32,
        subscan_num: u32,
        integration_num: u32,
    ) -> Self {
        Self {
            exec_block_num,
            scan_num,
            subscan_num,
            integration_num: Some(integration_num),
            subintegration_num: None,
        }
    }

    /// Creates a subintegration level path (5 components).
    #[must_use]
    pub const fn subintegration(
        exec_block_num: u32,
        scan_num: u32,
        subscan_num: u32,
        integration_num: u32,
        subintegration_num: u32,
    ) -> Self {
        Self {
            exec_block_num,
            scan_num,
            subscan_num,
            integration_num: Some(integration_num),
            subintegration_num: Some(subintegration_num),
        }
    }

    /// Parses a path with any legal number of components (3 to 5).
    ///
    /// # Errors
    /// Fails if `raw` is malformed, has fewer than 3 or more than 5
    /// components, or holds a component that does not fit in a `u32`.
    pub fn parse_any(raw: &str) -> Result<Self, ProjectPathError> {
        let components = split_components(raw)?;
        Self::from_components(&components).ok_or(ProjectPathError::Malformed)
    }

    /// Parses a path that must have exactly `arity` components.
    ///
    /// # Errors
    /// Same as [`Self::parse_any`], and
    /// [`ProjectPathError::WrongArity`] on any other number of components.
    pub fn parse(raw: &str, arity: usize) -> Result<Self, ProjectPathError> {
        let components = split_components(raw)?;
        if components.len() != arity {
            return Err(ProjectPathError::WrongArity {
                expected: arity,
                found: components.len(),
            });
        }
        Self::from_components(&components).ok_or(ProjectPathError::Malformed)
    }

    fn from_components(components: &[u32]) -> Option<Self> {
        match *components {
            [eb, scan, subscan] => Some(Self::subscan(eb, scan, subscan)),
            [eb, scan, subscan, int] => Some(Self::integration(eb, scan, subscan, int)),
            [eb, scan, subscan, int, sub] => {
                Some(Self::subintegration(eb, scan, subscan, int, sub))
            }
            _ => None,
        }
    }

    /// Number of components.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match (self.integration_num, self.subintegration_num) {
            (None, _) => 3,
            (Some(_), None) => 4,
            (Some(_), Some(_)) => 5,
        }
    }

    /// Execution block number.
    #[must_use]
    pub const fn exec_block_num(&self) -> u32 {
        self.exec_block_num
    }

    /// Scan number.
    #[must_use]
    pub const fn scan_num(&self) -> u32 {
        self.scan_num
    }

    /// Subscan number.
    #[must_use]
    pub const fn subscan_num(&self) -> u32 {
        self.subscan_num
    }

    /// Integration number, if present.
    #[must_use]
    pub const fn integration_num(&self) -> Option<u32> {
        self.integration_num
    }

    /// Subintegration number, if present.
    #[must_use]
    pub const fn subintegration_num(&self) -> Option<u32> {
        self.subintegration_num
    }

    /// Returns `true` if both paths address the same subscan.
    #[must_use]
    pub const fn same_subscan(&self, other: &Self) -> bool {
        self.exec_block_num == other.exec_block_num
            && self.scan_num == other.scan_num
            && self.subscan_num == other.subscan_num
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/",
            self.exec_block_num, self.scan_num, self.subscan_num
        )?;
        if let Some(integration) = self.integration_num {
            write!(f, "{integration}/")?;
        }
        if let Some(subintegration) = self.subintegration_num {
            write!(f, "{subintegration}/")?;
        }
        Ok(())
    }
}

/// Splits `N/N/.../` into numbers. Every component must be non-empty digits
/// and the path must end with a slash.
fn split_components(raw: &str) -> Result<Vec<u32>, ProjectPathError> {
    let body = raw.strip_suffix('/').ok_or(ProjectPathError::Malformed)?;
    body.split('/')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ProjectPathError::Malformed);
            }
            part.parse().map_err(|_| ProjectPathError::ComponentOverflow {
                component: part.to_string(),
            })
        })
        .collect()
}
