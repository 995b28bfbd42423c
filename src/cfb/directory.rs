//! The 128-byte CFB directory entry (MS-CFB 2.6).
//!
//! https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-cfb/a94d7445-c4be-49cd-b6b9-2f4abc663817

use binrw::{binrw, BinWrite};
use std::io::{Seek, Write};

use crate::common::{SectorType, DIRECTORY_ENTRY_LEN, END_OF_CHAIN, NOSTREAM};
use crate::error::{MsgError, MsgResult};

const MAX_NAME_UTF16_UNITS: usize = 31;

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    #[brw(magic(0x00u8))]
    Empty,
    #[brw(magic(0x01u8))]
    Storage,
    #[brw(magic(0x02u8))]
    Stream,
    #[brw(magic(0x05u8))]
    Root,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    #[brw(magic(0x01u8))]
    Black,
}

/// The on-disk 128-byte record. Siblings are kept as a degenerate
/// right-leaning chain rather than a balanced red-black tree: every entry
/// is colored black and `left_sibling` is always `NOSTREAM`. MS-CFB
/// requires a real red-black tree ordered by UTF-16-length-then-ordinal
/// comparison, but Outlook and the common third-party readers walk the
/// child/right-sibling chain without checking balance or color.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub object_type: ObjectType,
    pub left_sibling: u32,
    pub right_sibling: u32,
    pub child: u32,
    pub clsid: [u8; 16],
    pub state_bits: u32,
    pub creation_time: u64,
    pub modified_time: u64,
    pub starting_sector: u32,
    pub stream_size: u64,
}

impl DirEntry {
    pub fn root() -> Self {
        DirEntry {
            name: "Root Entry".to_string(),
            object_type: ObjectType::Root,
            left_sibling: NOSTREAM,
            right_sibling: NOSTREAM,
            child: NOSTREAM,
            clsid: [0u8; 16],
            state_bits: 0,
            creation_time: 0,
            modified_time: 0,
            starting_sector: END_OF_CHAIN,
            stream_size: 0,
        }
    }

    pub fn storage(name: String) -> MsgResult<Self> {
        Ok(DirEntry {
            name: truncate_name(name)?,
            object_type: ObjectType::Storage,
            left_sibling: NOSTREAM,
            right_sibling: NOSTREAM,
            child: NOSTREAM,
            clsid: [0u8; 16],
            state_bits: 0,
            creation_time: 0,
            modified_time: 0,
            starting_sector: 0,
            stream_size: 0,
        })
    }

    pub fn stream(name: String) -> MsgResult<Self> {
        Ok(DirEntry {
            name: truncate_name(name)?,
            object_type: ObjectType::Stream,
            left_sibling: NOSTREAM,
            right_sibling: NOSTREAM,
            child: NOSTREAM,
            clsid: [0u8; 16],
            state_bits: 0,
            creation_time: 0,
            modified_time: 0,
            starting_sector: END_OF_CHAIN,
            stream_size: 0,
        })
    }

    pub fn name_utf16_len(&self) -> usize {
        self.name.encode_utf16().count()
    }

    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> MsgResult<()> {
        let name_utf16: Vec<u16> = self.name.encode_utf16().collect();
        debug_assert!(name_utf16.len() <= MAX_NAME_UTF16_UNITS);

        let mut name_field = [0u8; 64];
        for (i, unit) in name_utf16.iter().enumerate() {
            name_field[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let name_length = (name_utf16.len() as u16 + 1) * 2;

        name_field.write_le(writer)?;
        name_length.write_le(writer)?;
        self.object_type.write_le(writer)?;
        Color::Black.write_le(writer)?;
        SectorType::from(self.left_sibling).write_le(writer)?;
        SectorType::from(self.right_sibling).write_le(writer)?;
        SectorType::from(self.child).write_le(writer)?;
        self.clsid.write_le(writer)?;
        self.state_bits.write_le(writer)?;
        self.creation_time.write_le(writer)?;
        self.modified_time.write_le(writer)?;
        SectorType::from(self.starting_sector).write_le(writer)?;
        self.stream_size.write_le(writer)?;
        Ok(())
    }
}

fn truncate_name(name: String) -> MsgResult<String> {
    let units: Vec<u16> = name.encode_utf16().take(MAX_NAME_UTF16_UNITS).collect();
    String::from_utf16(&units)
        .map_err(|e| MsgError::InternalInvariantViolation(format!("non-UTF-16 name: {e}")))
}

/// Writes an `EMPTY` placeholder entry, used to pad the directory stream
/// out to a whole number of sectors.
pub fn write_empty_entry<W: Write + Seek>(writer: &mut W) -> MsgResult<()> {
    writer.write_all(&[0xFFu8; DIRECTORY_ENTRY_LEN])?;
    Ok(())
}
