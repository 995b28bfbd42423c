//! Sector-chain sentinels shared by the FAT, MiniFAT, DIFAT and
//! directory-entry sibling links.
//!
//! https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-cfb/0afa4e43-b18f-432a-9917-4f276eca7a73

use binrw::{binrw, BinWrite};
use std::fmt::{Display, Formatter};

pub const SECTOR_SIZE: usize = 512;
pub const MINI_SECTOR_SIZE: usize = 64;
pub const MINI_STREAM_CUTOFF: usize = 0x0000_1000;
pub const DIRECTORY_ENTRY_LEN: usize = 128;
pub const MAX_DIFAT_ENTRIES_IN_HEADER: usize = 109;
pub const FAT_ENTRIES_PER_SECTOR: usize = SECTOR_SIZE / 4;

pub const MAX_REG_SECT: u32 = 0xFFFFFFFA;
pub const DIF_SECT: u32 = 0xFFFFFFFC;
pub const FAT_SECT: u32 = 0xFFFFFFFD;
pub const END_OF_CHAIN: u32 = 0xFFFFFFFE;
pub const FREE_SECT: u32 = 0xFFFFFFFF;
pub const NOSTREAM: u32 = 0xFFFFFFFF;

/// A single 32-bit slot in the FAT, MiniFAT or DIFAT: either a regular
/// sector id or one of the reserved sentinel values.
///
/// REGSECT 0x00000000 - 0xFFFFFFF9 Regular sector number.
///
/// MAXREGSECT 0xFFFFFFFA Maximum regular sector number.
///
/// DIFSECT 0xFFFFFFFC Specifies a DIFAT sector in the FAT.
///
/// FATSECT 0xFFFFFFFD Specifies a FAT sector in the FAT.
///
/// ENDOFCHAIN 0xFFFFFFFE End of a linked chain of sectors.
///
/// FREESECT 0xFFFFFFFF Specifies an unallocated sector in the FAT, Mini FAT, or DIFAT.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectorType {
    #[brw(magic(0xFFFFFFFCu32))]
    DifSect,
    #[brw(magic(0xFFFFFFFDu32))]
    FatSect,
    #[default]
    #[brw(magic(0xFFFFFFFEu32))]
    EndOfChain,
    #[brw(magic(0xFFFFFFFFu32))]
    FreeSect,
    RegularSect(u32),
}

impl SectorType {
    pub fn regular(sector: u32) -> Self {
        debug_assert!(sector <= MAX_REG_SECT);
        SectorType::RegularSect(sector)
    }

    pub fn to_u32(self) -> u32 {
        match self {
            SectorType::DifSect => DIF_SECT,
            SectorType::FatSect => FAT_SECT,
            SectorType::EndOfChain => END_OF_CHAIN,
            SectorType::FreeSect => FREE_SECT,
            SectorType::RegularSect(v) => v,
        }
    }
}

impl From<u32> for SectorType {
    fn from(value: u32) -> Self {
        match value {
            DIF_SECT => SectorType::DifSect,
            FAT_SECT => SectorType::FatSect,
            END_OF_CHAIN => SectorType::EndOfChain,
            FREE_SECT => SectorType::FreeSect,
            v => SectorType::RegularSect(v),
        }
    }
}

impl Display for SectorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SectorType::DifSect => write!(f, "DifatSect"),
            SectorType::FatSect => write!(f, "FatSect"),
            SectorType::EndOfChain => write!(f, "EndOfChain"),
            SectorType::FreeSect => write!(f, "FreeSect"),
            SectorType::RegularSect(v) => write!(f, "{}", v),
        }
    }
}

/// Writes `count` sector-id slots as little-endian `u32`s, one per
/// `SectorType`, padding any entries beyond `entries.len()` with `FreeSect`.
/// Used for the header's inline DIFAT array and for padding the FAT /
/// MiniFAT images out to a whole number of sectors.
pub fn write_padded_sector_array<W: std::io::Write + std::io::Seek>(
    writer: &mut W,
    entries: &[u32],
    count: usize,
) -> binrw::BinResult<()> {
    for i in 0..count {
        let sector = entries.get(i).copied().unwrap_or(FREE_SECT);
        SectorType::from(sector).write_le(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u32() {
        for &v in &[DIF_SECT, FAT_SECT, END_OF_CHAIN, FREE_SECT, 0u32, 41u32] {
            assert_eq!(SectorType::from(v).to_u32(), v);
        }
    }

    #[test]
    fn regular_sector_displays_as_number() {
        assert_eq!(SectorType::regular(7).to_string(), "7");
        assert_eq!(SectorType::EndOfChain.to_string(), "EndOfChain");
    }
}
