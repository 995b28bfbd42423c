//! Accepts named storages and streams in a parent/child tree and, at
//! `finalize`, allocates sectors, builds the FAT/MiniFAT/DIFAT and
//! directory entries, and emits one sequential CFB byte image.
//!
//! This is the hard, error-prone part of the format: every sector index
//! must chain correctly, every directory entry must serialize to exactly
//! 128 bytes, and the mini-stream cutoff rule must partition small streams
//! from large ones.

use std::io::{Seek, SeekFrom, Write};

use log::debug;

use crate::cfb::directory::{write_empty_entry, DirEntry};
use crate::cfb::header::Header;
use crate::common::{
    DIRECTORY_ENTRY_LEN, END_OF_CHAIN, FAT_ENTRIES_PER_SECTOR, FAT_SECT, FREE_SECT,
    MAX_DIFAT_ENTRIES_IN_HEADER, MINI_SECTOR_SIZE, MINI_STREAM_CUTOFF, NOSTREAM, SECTOR_SIZE,
};
use crate::error::{MsgError, MsgResult};

pub const ROOT_DID: u32 = 0;

pub struct CfbBuilder {
    entries: Vec<DirEntry>,
    /// Stream payloads in insertion order, keyed by the DID they belong to.
    streams: Vec<(u32, Vec<u8>)>,
    fat: Vec<u32>,
    mini_fat: Vec<u32>,
    mini_stream_data: Vec<u8>,
}

impl Default for CfbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CfbBuilder {
    pub fn new() -> Self {
        CfbBuilder {
            entries: vec![DirEntry::root()],
            streams: Vec::new(),
            fat: Vec::new(),
            mini_fat: Vec::new(),
            mini_stream_data: Vec::new(),
        }
    }

    pub fn add_storage(&mut self, name: &str, parent: u32) -> MsgResult<u32> {
        let entry = DirEntry::storage(name.to_string())?;
        self.insert(entry, parent, name)
    }

    pub fn add_stream(&mut self, name: &str, data: Vec<u8>, parent: u32) -> MsgResult<u32> {
        let mut entry = DirEntry::stream(name.to_string())?;
        entry.stream_size = data.len() as u64;
        let did = self.insert(entry, parent, name)?;
        self.streams.push((did, data));
        Ok(did)
    }

    fn insert(&mut self, entry: DirEntry, parent: u32, name: &str) -> MsgResult<u32> {
        self.check_unique_name(parent, name)?;
        let did = self.entries.len() as u32;
        self.entries.push(entry);
        self.link_child(parent, did);
        Ok(did)
    }

    /// Children hang off `child` and chain through `right_sibling`; a
    /// degenerate right-leaning list rather than a balanced tree (see
    /// [`DirEntry`]'s doc comment).
    fn link_child(&mut self, parent: u32, did: u32) {
        let parent_entry = &mut self.entries[parent as usize];
        if parent_entry.child == NOSTREAM {
            parent_entry.child = did;
            return;
        }
        let mut cursor = parent_entry.child;
        loop {
            let next = self.entries[cursor as usize].right_sibling;
            if next == NOSTREAM {
                break;
            }
            cursor = next;
        }
        self.entries[cursor as usize].right_sibling = did;
    }

    fn check_unique_name(&self, parent: u32, name: &str) -> MsgResult<()> {
        let mut cursor = self.entries[parent as usize].child;
        while cursor != NOSTREAM {
            let sibling = &self.entries[cursor as usize];
            if sibling.name == name {
                return Err(MsgError::Validation(format!(
                    "duplicate name {name:?} under parent DID {parent}"
                )));
            }
            cursor = sibling.right_sibling;
        }
        Ok(())
    }

    fn allocate_regular_sectors(&mut self, data: &[u8]) -> Vec<u32> {
        if data.is_empty() {
            return Vec::new();
        }
        let sectors_needed = data.len().div_ceil(SECTOR_SIZE);
        let mut chain = Vec::with_capacity(sectors_needed);
        for i in 0..sectors_needed {
            let sector_id = self.fat.len() as u32;
            chain.push(sector_id);
            if i + 1 < sectors_needed {
                self.fat.push(sector_id + 1);
            } else {
                self.fat.push(END_OF_CHAIN);
            }
        }
        chain
    }

    fn allocate_mini_sectors(&mut self, data: &[u8]) -> u32 {
        debug_assert!(!data.is_empty());
        let sectors_needed = data.len().div_ceil(MINI_SECTOR_SIZE);
        let first = self.mini_fat.len() as u32;
        for i in 0..sectors_needed {
            let sector_id = self.mini_fat.len() as u32;
            if i + 1 < sectors_needed {
                self.mini_fat.push(sector_id + 1);
            } else {
                self.mini_fat.push(END_OF_CHAIN);
            }
            let start = i * MINI_SECTOR_SIZE;
            let end = (start + MINI_SECTOR_SIZE).min(data.len());
            self.mini_stream_data.extend_from_slice(&data[start..end]);
            self.mini_stream_data
                .resize(self.mini_stream_data.len() + (MINI_SECTOR_SIZE - (end - start)), 0);
        }
        first
    }

    /// FAT sectors carry entries for themselves, so the count is the fixed
    /// point of `f = ceil((n + f) / entries_per_sector)`.
    fn fixed_point_fat_sector_count(current_len: usize) -> usize {
        let mut f = 0usize;
        loop {
            let needed = (current_len + f).div_ceil(FAT_ENTRIES_PER_SECTOR);
            if needed == f {
                return f;
            }
            f = needed;
        }
    }

    pub fn finalize<W: Write + Seek>(mut self, sink: &mut W) -> MsgResult<()> {
        let mut blocks: Vec<(Vec<u8>, Vec<u32>)> = Vec::new();

        let streams = std::mem::take(&mut self.streams);
        for (did, data) in &streams {
            if data.is_empty() {
                self.entries[*did as usize].starting_sector = END_OF_CHAIN;
                continue;
            }
            if data.len() < MINI_STREAM_CUTOFF {
                let first_mini = self.allocate_mini_sectors(data);
                self.entries[*did as usize].starting_sector = first_mini;
            } else {
                let chain = self.allocate_regular_sectors(data);
                self.entries[*did as usize].starting_sector = chain[0];
                blocks.push((data.clone(), chain));
            }
        }

        if !self.mini_stream_data.is_empty() {
            let mini_stream_bytes = self.mini_stream_data.clone();
            let chain = self.allocate_regular_sectors(&mini_stream_bytes);
            self.entries[ROOT_DID as usize].starting_sector = chain[0];
            self.entries[ROOT_DID as usize].stream_size = mini_stream_bytes.len() as u64;
            blocks.push((mini_stream_bytes, chain));
        }

        let dir_data = self.serialize_directory()?;
        let dir_chain = self.allocate_regular_sectors(&dir_data);
        let first_directory_sector = dir_chain[0];
        blocks.push((dir_data, dir_chain));

        let (first_mini_fat_sector, num_mini_fat_sectors) = if self.mini_fat.is_empty() {
            (END_OF_CHAIN, 0)
        } else {
            let mini_fat_data = pad_u32_sector_array(&self.mini_fat, FREE_SECT);
            let chain = self.allocate_regular_sectors(&mini_fat_data);
            let first = chain[0];
            let count = chain.len() as u32;
            blocks.push((mini_fat_data, chain));
            (first, count)
        };

        let num_fat_sectors = Self::fixed_point_fat_sector_count(self.fat.len());
        let mut fat_sector_ids = Vec::with_capacity(num_fat_sectors);
        for _ in 0..num_fat_sectors {
            fat_sector_ids.push(self.fat.len() as u32);
            self.fat.push(FAT_SECT);
        }

        if fat_sector_ids.len() > MAX_DIFAT_ENTRIES_IN_HEADER {
            return Err(MsgError::FileTooLarge {
                fat_sectors: fat_sector_ids.len(),
                limit: MAX_DIFAT_ENTRIES_IN_HEADER,
            });
        }

        let fat_data = pad_u32_sector_array(&self.fat, FREE_SECT);
        debug!(
            "finalizing CFB image: {} directory entries, {} FAT sectors, {} mini-FAT sectors",
            self.entries.len(),
            num_fat_sectors,
            num_mini_fat_sectors
        );

        let total_sectors = self.fat.len();
        let mut sector_payloads: Vec<Option<Vec<u8>>> = vec![None; total_sectors];
        for (data, chain) in &blocks {
            place_in_sectors(&mut sector_payloads, data, chain);
        }
        for (i, &sector_id) in fat_sector_ids.iter().enumerate() {
            let start = i * SECTOR_SIZE;
            let end = start + SECTOR_SIZE;
            sector_payloads[sector_id as usize] = Some(fat_data[start..end].to_vec());
        }

        let header = Header {
            num_fat_sectors: num_fat_sectors as u32,
            first_directory_sector,
            first_mini_fat_sector,
            num_mini_fat_sectors,
            difat: fat_sector_ids,
        };
        header.write(sink)?;

        for payload in sector_payloads {
            let payload = payload.ok_or_else(|| {
                MsgError::InternalInvariantViolation("unallocated sector in final image".into())
            })?;
            if payload.len() != SECTOR_SIZE {
                return Err(MsgError::InternalInvariantViolation(format!(
                    "sector payload was {} bytes, expected {SECTOR_SIZE}",
                    payload.len()
                )));
            }
            sink.write_all(&payload)?;
        }

        Ok(())
    }

    fn serialize_directory(&self) -> MsgResult<Vec<u8>> {
        let mut buf = std::io::Cursor::new(Vec::with_capacity(self.entries.len() * DIRECTORY_ENTRY_LEN));
        for entry in &self.entries {
            entry.write(&mut buf)?;
        }
        let mut bytes = buf.into_inner();
        if bytes.len() != self.entries.len() * DIRECTORY_ENTRY_LEN {
            return Err(MsgError::InternalInvariantViolation(
                "directory entry did not serialize to 128 bytes".into(),
            ));
        }
        let padding = (SECTOR_SIZE - (bytes.len() % SECTOR_SIZE)) % SECTOR_SIZE;
        let entries_per_pad_sector = padding / DIRECTORY_ENTRY_LEN;
        for _ in 0..entries_per_pad_sector {
            let mut cursor = std::io::Cursor::new(Vec::new());
            write_empty_entry(&mut cursor)?;
            bytes.extend_from_slice(&cursor.into_inner());
        }
        Ok(bytes)
    }
}

fn place_in_sectors(sector_payloads: &mut [Option<Vec<u8>>], data: &[u8], chain: &[u32]) {
    for (i, &sector_id) in chain.iter().enumerate() {
        let start = i * SECTOR_SIZE;
        let end = (start + SECTOR_SIZE).min(data.len());
        let mut chunk = data[start..end].to_vec();
        chunk.resize(SECTOR_SIZE, 0);
        sector_payloads[sector_id as usize] = Some(chunk);
    }
}

fn pad_u32_sector_array(entries: &[u32], pad_with: u32) -> Vec<u8> {
    let entries_per_sector = FAT_ENTRIES_PER_SECTOR;
    let total_entries = entries.len().div_ceil(entries_per_sector) * entries_per_sector;
    let mut bytes = Vec::with_capacity(total_entries * 4);
    for i in 0..total_entries {
        let v = entries.get(i).copied().unwrap_or(pad_with);
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}
