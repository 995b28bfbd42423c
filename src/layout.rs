//! Walks the message model once and emits the property streams,
//! recipient/attachment sub-storages, and named-property skeleton into a
//! [`CfbBuilder`].
//!
//! Each recipient and attachment gets its own numbered sub-storage
//! (`__recip_version1.0_#` / `__attach_version1.0_#`) with its own
//! `__properties_version1.0` stream and variable-length `__substg1.0_*`
//! streams, mirroring how the top-level message stores its properties.

use std::collections::BTreeMap;

use crate::cfb::{CfbBuilder, ROOT_DID};
use crate::error::MsgResult;
use crate::message::{Attachment, Recipient, RecipientType};
use crate::property::tag::*;
use crate::property::{PropertyRecord, PropertyValue};

const PROPERTIES_STREAM_NAME: &str = "__properties_version1.0";
const NAMED_PROPERTY_STORAGE: &str = "__nameid_version1.0";

pub fn write_message(
    builder: &mut CfbBuilder,
    properties: &BTreeMap<u16, PropertyRecord>,
    recipients: &[Recipient],
    attachments: &[Attachment],
) -> MsgResult<()> {
    write_message_properties_stream(builder, properties, recipients.len(), attachments.len())?;
    write_variable_streams(builder, properties, ROOT_DID)?;

    for (i, recipient) in recipients.iter().enumerate() {
        let storage_name = format!("__recip_version1.0_#{i:08X}");
        let did = builder.add_storage(&storage_name, ROOT_DID)?;
        let recipient_props = recipient_properties(recipient)?;
        write_object_properties_stream(builder, &recipient_props, did)?;
        write_variable_streams(builder, &recipient_props, did)?;
    }

    for (i, attachment) in attachments.iter().enumerate() {
        let storage_name = format!("__attach_version1.0_#{i:08X}");
        let did = builder.add_storage(&storage_name, ROOT_DID)?;
        let attachment_props = attachment_properties(attachment, i);
        write_object_properties_stream(builder, &attachment_props, did)?;
        write_variable_streams(builder, &attachment_props, did)?;
    }

    write_named_property_skeleton(builder)?;
    Ok(())
}

fn recipient_properties(recipient: &Recipient) -> MsgResult<BTreeMap<u16, PropertyRecord>> {
    let mut props = BTreeMap::new();
    let mut insert = |tag: u16, value: PropertyValue| {
        props.insert(tag, PropertyRecord::new(tag, value));
    };
    insert(PR_RECIPIENT_TYPE, PropertyValue::Long(recipient.recipient_type as i32));
    insert(PR_DISPLAY_NAME, PropertyValue::Unicode(recipient.display_name.clone()));
    insert(PR_EMAIL_ADDRESS, PropertyValue::Unicode(recipient.email.clone()));
    insert(PR_ADDRTYPE, PropertyValue::Unicode(recipient.addr_type.clone()));
    insert(PR_SMTP_ADDRESS, PropertyValue::Unicode(recipient.email.clone()));
    let search_key = crate::message::create_search_key(&recipient.addr_type, &recipient.email)?;
    insert(PR_SEARCH_KEY, PropertyValue::Binary(search_key));
    let entryid = crate::message::create_entryid(
        &recipient.addr_type,
        &recipient.email,
        &recipient.display_name,
    )?;
    insert(PR_ENTRYID, PropertyValue::Binary(entryid));
    Ok(props)
}

fn attachment_properties(attachment: &Attachment, index: usize) -> BTreeMap<u16, PropertyRecord> {
    let mut props = BTreeMap::new();
    let mut insert = |tag: u16, value: PropertyValue| {
        props.insert(tag, PropertyRecord::new(tag, value));
    };
    insert(PR_ATTACH_METHOD, PropertyValue::Long(attachment.method as i32));
    insert(PR_ATTACH_SIZE, PropertyValue::Long(attachment.data.len() as i32));
    insert(PR_ATTACH_LONG_FILENAME, PropertyValue::Unicode(attachment.filename.clone()));
    insert(PR_ATTACH_FILENAME, PropertyValue::Unicode(attachment.filename.clone()));
    if let Some(ext) = attachment.extension() {
        insert(PR_ATTACH_EXTENSION, PropertyValue::Unicode(ext));
    }
    insert(PR_ATTACH_MIME_TAG, PropertyValue::Unicode(attachment.mime_type.clone()));
    insert(PR_ATTACH_DATA_BIN, PropertyValue::Binary(attachment.data.clone()));
    insert(PR_ATTACH_NUM, PropertyValue::Long(index as i32));
    if let Some(content_id) = &attachment.content_id {
        insert(PR_ATTACH_CONTENT_ID, PropertyValue::Unicode(content_id.clone()));
    }
    if attachment.inline {
        insert(PR_RENDERING_POSITION, PropertyValue::Long(-1));
        insert(PR_ATTACHMENT_HIDDEN, PropertyValue::Boolean(true));
    }
    props
}

/// The message top-level `__properties_version1.0` stream: 8 bytes reserved
/// zero, `next_recipient_id`, `next_attachment_id`, `recipient_count`,
/// `attachment_count` (4 bytes each), then per-property 16-byte entries
/// sorted by tag ascending (`properties` is a `BTreeMap`, so insertion
/// order already matches).
fn write_message_properties_stream(
    builder: &mut CfbBuilder,
    properties: &BTreeMap<u16, PropertyRecord>,
    recipient_count: usize,
    attachment_count: usize,
) -> MsgResult<()> {
    let mut bytes = Vec::with_capacity(24 + properties.len() * 16);
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(&(recipient_count as u32).to_le_bytes());
    bytes.extend_from_slice(&(attachment_count as u32).to_le_bytes());
    bytes.extend_from_slice(&(recipient_count as u32).to_le_bytes());
    bytes.extend_from_slice(&(attachment_count as u32).to_le_bytes());
    append_fixed_entries(&mut bytes, properties)?;
    builder.add_stream(PROPERTIES_STREAM_NAME, bytes, ROOT_DID)?;
    Ok(())
}

/// The recipient/attachment `__properties_version1.0` stream: 8 bytes
/// reserved zero, then per-property entries sorted by tag ascending.
fn write_object_properties_stream(
    builder: &mut CfbBuilder,
    properties: &BTreeMap<u16, PropertyRecord>,
    parent: u32,
) -> MsgResult<()> {
    let mut bytes = Vec::with_capacity(8 + properties.len() * 16);
    bytes.extend_from_slice(&[0u8; 8]);
    append_fixed_entries(&mut bytes, properties)?;
    builder.add_stream(PROPERTIES_STREAM_NAME, bytes, parent)?;
    Ok(())
}

fn append_fixed_entries(bytes: &mut Vec<u8>, properties: &BTreeMap<u16, PropertyRecord>) -> MsgResult<()> {
    for record in properties.values() {
        bytes.extend_from_slice(&record.fixed_entry()?);
    }
    Ok(())
}

fn write_variable_streams(
    builder: &mut CfbBuilder,
    properties: &BTreeMap<u16, PropertyRecord>,
    parent: u32,
) -> MsgResult<()> {
    for record in properties.values() {
        if record.is_fixed() {
            continue;
        }
        let encoded = record.value.encode()?;
        builder.add_stream(&record.stream_name(), encoded, parent)?;
    }
    Ok(())
}

/// `__nameid_version1.0/` with the minimal placeholder streams: a 16-byte
/// zeroed GUID slot and an 8-byte entry describing no named properties.
/// The optional string stream (`__substg1.0_00040102`) is omitted.
fn write_named_property_skeleton(builder: &mut CfbBuilder) -> MsgResult<()> {
    let did = builder.add_storage(NAMED_PROPERTY_STORAGE, ROOT_DID)?;
    builder.add_stream("__substg1.0_00020102", vec![0u8; 16], did)?;
    let mut entry = Vec::with_capacity(8);
    entry.extend_from_slice(&0u32.to_le_bytes());
    entry.extend_from_slice(&0u16.to_le_bytes());
    entry.extend_from_slice(&0u16.to_le_bytes());
    builder.add_stream("__substg1.0_00030102", entry, did)?;
    Ok(())
}
