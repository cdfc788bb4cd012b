//! Strong type definitions for invoice records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RecordError;

/// The closed set of line item categories.
///
/// Encoded on the wire as the authority's integer codes (`0` is reserved for
/// "invalid" and never produced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum LineItemType {
    Labor = 1,
    Expense = 2,
    Misc = 3,
}

/// Lookup table from lowercase text to line item type.
const LINE_ITEM_TYPES: [(&str, LineItemType); 3] = [
    ("labor", LineItemType::Labor),
    ("expense", LineItemType::Expense),
    ("misc", LineItemType::Misc),
];

impl LineItemType {
    /// Map free text onto the closed set, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        LINE_ITEM_TYPES
            .iter()
            .find(|(key, _)| *key == lower)
            .map(|(_, t)| *t)
    }

    /// The canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Labor => "labor",
            Self::Expense => "expense",
            Self::Misc => "misc",
        }
    }

    /// Wire code.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from the wire code.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Labor),
            2 => Some(Self::Expense),
            3 => Some(Self::Misc),
            _ => None,
        }
    }
}

impl fmt::Display for LineItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<LineItemType> for u8 {
    fn from(t: LineItemType) -> Self {
        t.to_u8()
    }
}

impl TryFrom<u8> for LineItemType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| format!("invalid line item type code {value}"))
    }
}

/// The billing month an invoice covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoicePeriod {
    pub month: u16,
    pub year: u16,
}

impl InvoicePeriod {
    /// Create a period, rejecting months outside 1..=12 and year zero.
    pub fn new(month: u16, year: u16) -> Result<Self, RecordError> {
        if !(1..=12).contains(&month) || year == 0 {
            return Err(RecordError::InvalidPeriod { month, year });
        }
        Ok(Self { month, year })
    }
}

impl fmt::Display for InvoicePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
