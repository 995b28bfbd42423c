//! Integration tests driving `Message`/`Attachment`/`Recipient` end-to-end
//! and asserting on the resulting CFB byte image: signature, sector
//! multiple, FAT-chain round trips, and the derived-property scenarios
//! (S1-S6).
//!
//! The read-back walk (`MsgFile`) below is a minimal CFB reader: parse the
//! header, build the FAT/MiniFAT from the inline DIFAT, parse directory
//! entries, and walk the child/right-sibling chain by name. This crate
//! itself never reads `.msg` files; this reader exists only so the test
//! suite can verify what the writer produced.

use msgcfb::clock::{FixedClock, FixedIdSource};
use msgcfb::{Attachment, Message, Recipient, RecipientType};

use chrono::{TimeZone, Utc};

const SECTOR_SIZE: usize = 512;
const MINI_SECTOR_SIZE: usize = 64;
const MINI_STREAM_CUTOFF: u64 = 4096;
const FREE_SECT: u32 = 0xFFFFFFFF;
const END_OF_CHAIN: u32 = 0xFFFFFFFE;
const FAT_SECT: u32 = 0xFFFFFFFD;

fn fixed_message() -> Message {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    Message::with_clock_and_id_source(Box::new(clock), Box::new(FixedIdSource(0x11)))
}

struct DirEntry {
    name: String,
    object_type: u8,
    left_sibling: u32,
    right_sibling: u32,
    child: u32,
    starting_sector: u32,
    stream_size: u64,
}

struct MsgFile {
    fat: Vec<u32>,
    mini_fat: Vec<u32>,
    sectors: Vec<Vec<u8>>,
    entries: Vec<DirEntry>,
    mini_stream: Vec<u8>,
}

fn u32_at(b: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(b[off..off + 4].try_into().unwrap())
}
fn u64_at(b: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(b[off..off + 8].try_into().unwrap())
}
fn u16_at(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(b[off..off + 2].try_into().unwrap())
}

impl MsgFile {
    fn parse(bytes: &[u8]) -> Self {
        assert_eq!(&bytes[0..8], &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
        assert_eq!(bytes.len() % SECTOR_SIZE, 0);

        let num_fat_sectors = u32_at(bytes, 44);
        let first_directory_sector = u32_at(bytes, 48);
        let first_mini_fat_sector = u32_at(bytes, 60);
        let num_mini_fat_sectors = u32_at(bytes, 64);

        let body = &bytes[SECTOR_SIZE..];
        let total_sectors = body.len() / SECTOR_SIZE;
        let sectors: Vec<Vec<u8>> = (0..total_sectors)
            .map(|i| body[i * SECTOR_SIZE..(i + 1) * SECTOR_SIZE].to_vec())
            .collect();

        // DIFAT: first 109 entries live inline at header offset 76.
        let mut fat_sector_ids = Vec::new();
        for i in 0..109usize {
            let v = u32_at(bytes, 76 + i * 4);
            if v != FREE_SECT {
                fat_sector_ids.push(v);
            }
        }
        assert_eq!(fat_sector_ids.len(), num_fat_sectors as usize);

        let mut fat = Vec::new();
        for &sid in &fat_sector_ids {
            let sector = &sectors[sid as usize];
            for chunk in sector.chunks(4) {
                fat.push(u32::from_le_bytes(chunk.try_into().unwrap()));
            }
        }
        for &sid in &fat_sector_ids {
            assert_eq!(fat[sid as usize], FAT_SECT);
        }

        let mut mini_fat = Vec::new();
        if num_mini_fat_sectors > 0 {
            let mut cur = first_mini_fat_sector;
            while cur != END_OF_CHAIN {
                let sector = &sectors[cur as usize];
                for chunk in sector.chunks(4) {
                    mini_fat.push(u32::from_le_bytes(chunk.try_into().unwrap()));
                }
                cur = fat[cur as usize];
            }
        }

        // Directory entries: walk the FAT chain from first_directory_sector.
        let mut dir_bytes = Vec::new();
        let mut cur = first_directory_sector;
        while cur != END_OF_CHAIN {
            dir_bytes.extend_from_slice(&sectors[cur as usize]);
            cur = fat[cur as usize];
        }

        let mut entries = Vec::new();
        for chunk in dir_bytes.chunks(128) {
            let name_length = u16_at(chunk, 64) as usize;
            let name_units = name_length.saturating_sub(2) / 2;
            let mut units = Vec::with_capacity(name_units);
            for i in 0..name_units {
                units.push(u16_at(chunk, i * 2));
            }
            let name = String::from_utf16(&units).unwrap_or_default();
            entries.push(DirEntry {
                name,
                object_type: chunk[66],
                left_sibling: u32_at(chunk, 68),
                right_sibling: u32_at(chunk, 72),
                child: u32_at(chunk, 76),
                starting_sector: u32_at(chunk, 116),
                stream_size: u64_at(chunk, 120),
            });
        }

        // Root entry describes the mini-stream container in regular sectors.
        let root = &entries[0];
        let mut mini_stream = Vec::new();
        if root.stream_size > 0 {
            let mut cur = root.starting_sector;
            while cur != END_OF_CHAIN {
                mini_stream.extend_from_slice(&sectors[cur as usize]);
                cur = fat[cur as usize];
            }
        }

        MsgFile { fat, mini_fat, sectors, entries, mini_stream }
    }

    fn child_did(&self, parent: u32, name: &str) -> Option<u32> {
        let mut cur = self.entries[parent as usize].child;
        while cur != FREE_SECT {
            if self.entries[cur as usize].name == name {
                return Some(cur);
            }
            cur = self.entries[cur as usize].right_sibling;
        }
        None
    }

    fn children_named_like(&self, parent: u32, prefix: &str) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cur = self.entries[parent as usize].child;
        while cur != FREE_SECT {
            if self.entries[cur as usize].name.starts_with(prefix) {
                out.push(cur);
            }
            cur = self.entries[cur as usize].right_sibling;
        }
        out.sort_by_key(|&did| self.entries[did as usize].name.clone());
        out
    }

    fn read_stream(&self, did: u32) -> Vec<u8> {
        let entry = &self.entries[did as usize];
        let size = entry.stream_size as usize;
        if size == 0 {
            return Vec::new();
        }
        if entry.stream_size < MINI_STREAM_CUTOFF {
            let mut data = Vec::new();
            let mut cur = entry.starting_sector;
            while cur != END_OF_CHAIN {
                let start = cur as usize * MINI_SECTOR_SIZE;
                data.extend_from_slice(&self.mini_stream[start..start + MINI_SECTOR_SIZE]);
                cur = self.mini_fat[cur as usize];
            }
            data.truncate(size);
            data
        } else {
            let mut data = Vec::new();
            let mut cur = entry.starting_sector;
            while cur != END_OF_CHAIN {
                data.extend_from_slice(&self.sectors[cur as usize]);
                cur = self.fat[cur as usize];
            }
            data.truncate(size);
            data
        }
    }

    /// Returns `(tag, type, value_slot)` for every property entry in a
    /// `__properties_version1.0` stream, skipping the leading
    /// reserved/count header (24 bytes for the top-level object, 8 bytes
    /// for recipient/attachment sub-objects).
    fn parse_properties(&self, stream: &[u8], header_len: usize) -> Vec<(u16, u16, [u8; 8])> {
        let mut out = Vec::new();
        let mut off = header_len;
        while off + 16 <= stream.len() {
            let combined = u32_at(stream, off);
            let tag = (combined & 0xFFFF) as u16;
            let ptype = (combined >> 16) as u16;
            let mut slot = [0u8; 8];
            slot.copy_from_slice(&stream[off + 8..off + 16]);
            out.push((tag, ptype, slot));
            off += 16;
        }
        out
    }

    fn unicode_value(&self, parent: u32, tag: u16) -> Option<String> {
        let stream_name = format!("__substg1.0_{:04X}001F", tag);
        let did = self.child_did(parent, &stream_name)?;
        let bytes = self.read_stream(did);
        let units: Vec<u16> = bytes
            .chunks(2)
            .take_while(|c| c.len() == 2 && (c[0] != 0 || c[1] != 0))
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Some(String::from_utf16(&units).unwrap())
    }

    fn long_value(&self, entries: &[(u16, u16, [u8; 8])], tag: u16) -> Option<i32> {
        entries
            .iter()
            .find(|(t, ty, _)| *t == tag && *ty == 0x0003)
            .map(|(_, _, slot)| i32::from_le_bytes(slot[0..4].try_into().unwrap()))
    }

    fn bool_value(&self, entries: &[(u16, u16, [u8; 8])], tag: u16) -> Option<bool> {
        entries
            .iter()
            .find(|(t, ty, _)| *t == tag && *ty == 0x000B)
            .map(|(_, _, slot)| u16::from_le_bytes([slot[0], slot[1]]) != 0)
    }
}

#[test]
fn s1_basic_message_has_expected_display_to_and_no_attach() {
    let mut msg = fixed_message();
    msg.set_subject("Hello");
    msg.set_body("Hi");
    msg.set_sender("a@x.com", "A", "SMTP").unwrap();
    msg.add_recipient(Recipient::new("b@x.com", "B", RecipientType::To)).unwrap();

    let bytes = msg.to_bytes().unwrap();
    assert!(bytes.len() >= 512 * 4, "expect header plus at least 3 sectors");

    let file = MsgFile::parse(&bytes);
    let props_did = file.child_did(0, "__properties_version1.0").unwrap();
    let props = file.parse_properties(&file.read_stream(props_did), 24);

    assert_eq!(file.bool_value(&props, 0x0E1B), Some(false)); // PR_HASATTACH
    assert_eq!(file.unicode_value(0, 0x0E04).as_deref(), Some("B")); // PR_DISPLAY_TO
}

#[test]
fn s2_re_prefixed_subject_yields_stripped_conversation_topic() {
    let mut msg = fixed_message();
    msg.set_subject("RE: Project");

    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);
    assert_eq!(file.unicode_value(0, 0x0070).as_deref(), Some("Project")); // PR_CONVERSATION_TOPIC
}

#[test]
fn s3_attachment_sets_size_extension_and_hasattach_flag() {
    let mut msg = fixed_message();
    msg.set_subject("With attachment");
    let mut att = Attachment::new("t.txt", b"abc".to_vec());
    att.mime_type = "text/plain".to_string();
    msg.add_attachment(att);

    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);

    let props_did = file.child_did(0, "__properties_version1.0").unwrap();
    let props = file.parse_properties(&file.read_stream(props_did), 24);
    assert_eq!(file.bool_value(&props, 0x0E1B), Some(true)); // PR_HASATTACH
    assert_eq!(file.long_value(&props, 0x0E07).unwrap() & 0x10, 0x10); // MSGFLAG_HASATTACH

    let attach_storages = file.children_named_like(0, "__attach_version1.0_");
    assert_eq!(attach_storages.len(), 1);
    let attach_props_did = file.child_did(attach_storages[0], "__properties_version1.0").unwrap();
    let attach_props = file.parse_properties(&file.read_stream(attach_props_did), 8);
    assert_eq!(file.long_value(&attach_props, 0x0E20), Some(3)); // PR_ATTACH_SIZE
    assert_eq!(file.unicode_value(attach_storages[0], 0x3703).as_deref(), Some(".txt")); // PR_ATTACH_EXTENSION
}

#[test]
fn s4_inline_attachment_sets_hidden_and_rendering_position() {
    let mut msg = fixed_message();
    let mut att = Attachment::new("logo.png", vec![0u8; 4]);
    att.content_id = Some("logo".to_string());
    att.inline = true;
    msg.add_attachment(att);

    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);
    let attach_storages = file.children_named_like(0, "__attach_version1.0_");
    let did = attach_storages[0];
    let props_did = file.child_did(did, "__properties_version1.0").unwrap();
    let props = file.parse_properties(&file.read_stream(props_did), 8);

    assert_eq!(file.long_value(&props, 0x370B), Some(-1)); // PR_RENDERING_POSITION
    assert_eq!(file.unicode_value(did, 0x3712).as_deref(), Some("logo")); // PR_ATTACH_CONTENT_ID

    let hidden_entry = props.iter().find(|(t, ty, _)| *t == 0x7FFE && *ty == 0x000B).unwrap();
    assert_eq!(u16::from_le_bytes([hidden_entry.2[0], hidden_entry.2[1]]), 1);
}

#[test]
fn s5_four_recipients_produce_four_ordered_recip_storages_and_display_lists() {
    let mut msg = fixed_message();
    msg.add_recipient(Recipient::new("to1@x.com", "ToOne", RecipientType::To)).unwrap();
    msg.add_recipient(Recipient::new("to2@x.com", "ToTwo", RecipientType::To)).unwrap();
    msg.add_recipient(Recipient::new("cc@x.com", "CcOne", RecipientType::Cc)).unwrap();
    msg.add_recipient(Recipient::new("bcc@x.com", "BccOne", RecipientType::Bcc)).unwrap();

    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);

    let recip_storages = file.children_named_like(0, "__recip_version1.0_#");
    assert_eq!(recip_storages.len(), 4);

    assert_eq!(file.unicode_value(0, 0x0E04).as_deref(), Some("ToOne; ToTwo")); // PR_DISPLAY_TO
    assert_eq!(file.unicode_value(0, 0x0E03).as_deref(), Some("CcOne")); // PR_DISPLAY_CC
    assert_eq!(file.unicode_value(0, 0x0E02).as_deref(), Some("BccOne")); // PR_DISPLAY_BCC
}

#[test]
fn s6_streams_straddle_the_mini_stream_cutoff_boundary() {
    let mut msg = fixed_message();
    msg.add_attachment(Attachment::new("big.bin", vec![7u8; 4096]));
    msg.add_attachment(Attachment::new("small.bin", vec![9u8; 4095]));

    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);
    let attach_storages = file.children_named_like(0, "__attach_version1.0_");
    assert_eq!(attach_storages.len(), 2);

    for did in attach_storages {
        // PR_ATTACH_DATA_BIN is BINARY (type 0x0102).
        let data_did = file.child_did(did, "__substg1.0_37010102").unwrap();
        let data = file.read_stream(data_did);
        assert!(data.len() == 4096 || data.len() == 4095);
    }
}

#[test]
fn round_trip_every_declared_stream_byte_length_matches_its_chain() {
    let mut msg = fixed_message();
    msg.set_subject("Round trip check");
    msg.set_body("Body text that is definitely longer than sixty-four bytes so it forces several mini-sectors to chain together end to end.");
    msg.set_sender("a@x.com", "A", "SMTP").unwrap();
    msg.add_recipient(Recipient::new("b@x.com", "B", RecipientType::To)).unwrap();
    msg.add_attachment(Attachment::new("t.txt", b"abc".to_vec()));

    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);

    let body_did = file.child_did(0, "__substg1.0_1000001F").unwrap();
    let body_bytes = file.read_stream(body_did);
    assert_eq!(body_bytes.len() as u64, file.entries[body_did as usize].stream_size);
}

#[test]
fn named_property_skeleton_storage_is_present_with_its_two_streams() {
    let msg = fixed_message();
    let bytes = msg.to_bytes().unwrap();
    let file = MsgFile::parse(&bytes);

    let nameid_did = file.child_did(0, "__nameid_version1.0").unwrap();
    let guid_slot = file.child_did(nameid_did, "__substg1.0_00020102").unwrap();
    assert_eq!(file.read_stream(guid_slot), vec![0u8; 16]);

    let entry_slot = file.child_did(nameid_did, "__substg1.0_00030102").unwrap();
    assert_eq!(file.read_stream(entry_slot).len(), 8);
}

#[test]
fn file_length_is_always_a_positive_multiple_of_512() {
    let msg = fixed_message();
    let bytes = msg.to_bytes().unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(bytes.len() % 512, 0);
}

#[test]
fn empty_sender_email_is_rejected_before_save() {
    let mut msg = fixed_message();
    assert!(msg.set_sender("", "Nobody", "SMTP").is_err());
}

#[test]
fn save_to_path_writes_a_well_formed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ok.msg");
    let msg = fixed_message();
    msg.save_to_path(&path).unwrap();
    assert!(path.exists());
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len() % 512, 0);
}
