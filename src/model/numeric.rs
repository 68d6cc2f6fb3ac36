//! Fixed-width scalar decoding of a byte selection.

use std::fmt;

/// Byte order used when decoding a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    pub fn toggle(self) -> Self {
        match self {
            Self::Little => Self::Big,
            Self::Big => Self::Little,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Little => "Little Endian",
            Self::Big => "Big Endian",
        }
    }
}

/// Whether the decoded integer is two's-complement signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signedness {
    #[default]
    Unsigned,
    Signed,
}

impl Signedness {
    pub fn toggle(self) -> Self {
        match self {
            Self::Unsigned => Self::Signed,
            Self::Signed => Self::Unsigned,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unsigned => "Unsigned",
            Self::Signed => "Signed",
        }
    }
}

/// Outcome of interpreting a selection.
///
/// Every variant displays as a human-readable message; interpretation never
/// fails in a way that could halt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericValue {
    /// Decoded decimal representation.
    Decoded(String),
    /// Empty selection.
    NoSelection,
    /// At least one byte of the selection is not resident yet.
    NotFullyLoaded,
    /// Selection length is not 1, 2, 4 or 8.
    UnsupportedLength(usize),
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decoded(value) => f.write_str(value),
            Self::NoSelection => f.write_str("No selection"),
            Self::NotFullyLoaded => f.write_str("Selection not fully loaded"),
            Self::UnsupportedLength(_) => {
                f.write_str("Select 1, 2, 4, or 8 bytes for numeric interpretation")
            }
        }
    }
}

/// Decode `bytes` as an integer of the slice's width.
///
/// `bytes` is the selection in stored order; `None` marks a byte whose page
/// has not been loaded.
pub fn interpret(
    bytes: &[Option<u8>],
    endianness: Endianness,
    signedness: Signedness,
) -> NumericValue {
    if bytes.is_empty() {
        return NumericValue::NoSelection;
    }
    let Some(resolved) = bytes.iter().copied().collect::<Option<Vec<u8>>>() else {
        return NumericValue::NotFullyLoaded;
    };

    let decoded = match resolved.len() {
        1 => decode::<1>(&resolved, endianness, signedness),
        2 => decode::<2>(&resolved, endianness, signedness),
        4 => decode::<4>(&resolved, endianness, signedness),
        8 => decode::<8>(&resolved, endianness, signedness),
        n => return NumericValue::UnsupportedLength(n),
    };
    NumericValue::Decoded(decoded)
}

fn decode<const N: usize>(bytes: &[u8], endianness: Endianness, signedness: Signedness) -> String {
    let mut buf = [0u8; 8];
    // Normalize to big-endian order, then sign- or zero-extend into 8 bytes.
    let mut ordered = [0u8; N];
    ordered.copy_from_slice(&bytes[..N]);
    if endianness == Endianness::Little {
        ordered.reverse();
    }
    let negative = signedness == Signedness::Signed && ordered[0] & 0x80 != 0;
    if negative {
        buf[..8 - N].fill(0xFF);
    }
    buf[8 - N..].copy_from_slice(&ordered);

    match signedness {
        Signedness::Unsigned => u64::from_be_bytes(buf).to_string(),
        Signedness::Signed => i64::from_be_bytes(buf).to_string(),
    }
}
