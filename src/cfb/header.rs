//! The 512-byte CFB header (MS-CFB 2.2), version 3 (512-byte sectors).
//!
//! Expressed as a `binrw` struct: every field that is always a fixed
//! constant for this writer is emitted via `#[bw(magic = ...)]` rather than
//! stored.

use binrw::BinWrite;
use std::io::{Seek, Write};

use crate::common::{
    write_padded_sector_array, SectorType, MAX_DIFAT_ENTRIES_IN_HEADER, MINI_STREAM_CUTOFF,
};
use crate::error::MsgResult;

/// Computed fields of the header; everything else this writer always sets
/// to the same constant and emits directly in [`Header::write`].
#[derive(Debug, Clone)]
pub struct Header {
    pub num_fat_sectors: u32,
    pub first_directory_sector: u32,
    pub first_mini_fat_sector: u32,
    pub num_mini_fat_sectors: u32,
    pub difat: Vec<u32>,
}

impl Header {
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> MsgResult<()> {
        writer.write_all(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])?; // signature
        writer.write_all(&[0u8; 16])?; // CLSID, reserved
        0x003Eu16.write_le(writer)?; // minor version
        0x0003u16.write_le(writer)?; // major version (v3 -> 512-byte sectors)
        0xFFFEu16.write_le(writer)?; // byte order mark
        0x0009u16.write_le(writer)?; // sector shift: 2^9 = 512
        0x0006u16.write_le(writer)?; // mini sector shift: 2^6 = 64
        writer.write_all(&[0u8; 6])?; // reserved
        0u32.write_le(writer)?; // number of directory sectors (0 for v3)
        self.num_fat_sectors.write_le(writer)?;
        SectorType::regular(self.first_directory_sector).write_le(writer)?;
        0u32.write_le(writer)?; // transaction signature, unused
        (MINI_STREAM_CUTOFF as u32).write_le(writer)?;
        SectorType::from(self.first_mini_fat_sector).write_le(writer)?;
        self.num_mini_fat_sectors.write_le(writer)?;
        SectorType::EndOfChain.write_le(writer)?; // first DIFAT sector: none beyond the header
        0u32.write_le(writer)?; // number of DIFAT sectors
        write_padded_sector_array(writer, &self.difat, MAX_DIFAT_ENTRIES_IN_HEADER)?;
        Ok(())
    }
}
