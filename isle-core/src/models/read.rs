use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::ReadParseError;

/// Strand a read aligned to.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = ReadParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(ReadParseError::InvalidStrand(s.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// Read struct, one aligned read reduced to the coordinate of its 5' end.
///
/// The position is signed so that malformed input (negative coordinates)
/// survives ingestion and can be counted and dropped downstream instead of
/// failing the parse.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Read {
    pub chr: String,
    pub position: i64,
    pub strand: Strand,
}

impl Read {
    pub fn new(chr: impl Into<String>, position: i64, strand: Strand) -> Self {
        Read {
            chr: chr.into(),
            position,
            strand,
        }
    }

    ///
    /// Position of the center of the sequenced fragment, i.e. the 5' end
    /// shifted by half the fragment size in the direction of the read.
    ///
    /// The result is not clamped; callers decide what to do with shifts
    /// that run past a chromosome boundary.
    ///
    pub fn fragment_center(&self, fragment_size: u32) -> i64 {
        let shift = (fragment_size / 2) as i64;
        match self.strand {
            Strand::Forward => self.position + shift,
            Strand::Reverse => self.position - shift,
        }
    }

    ///
    /// Get BED-like string of the read: `chr  5'-end  5'-end+1  strand`
    ///
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.chr,
            self.position,
            self.position + 1,
            self.strand
        )
    }
}

impl Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("+", Strand::Forward)]
    #[case("-", Strand::Reverse)]
    fn test_strand_from_str(#[case] s: &str, #[case] expected: Strand) {
        assert_eq!(s.parse::<Strand>().unwrap(), expected);
        assert_eq!(expected.to_string(), s);
    }

    #[rstest]
    fn test_strand_rejects_unknown() {
        assert!(".".parse::<Strand>().is_err());
    }

    #[rstest]
    #[case(Strand::Forward, 1000, 150, 1075)]
    #[case(Strand::Reverse, 1000, 150, 925)]
    #[case(Strand::Reverse, 10, 150, -65)]
    #[case(Strand::Forward, 1000, 0, 1000)]
    fn test_fragment_center(
        #[case] strand: Strand,
        #[case] position: i64,
        #[case] fragment_size: u32,
        #[case] expected: i64,
    ) {
        let read = Read::new("chr1", position, strand);
        assert_eq!(read.fragment_center(fragment_size), expected);
    }

    #[rstest]
    fn test_read_display() {
        let read = Read::new("chr2", 42, Strand::Reverse);
        assert_eq!(read.to_string(), "chr2\t42\t43\t-");
    }
}
