//! Typed property values and their canonical little-endian wire encodings
//! (MS-OXCDATA 2.11.2), including the Windows FILETIME conversion used for
//! `PT_SYSTIME` values.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{MsgError, MsgResult};
use crate::property::tag::PropertyType;

/// FILETIME epoch: 1601-01-01T00:00:00Z, as a Unix timestamp in seconds.
/// 1601 to 1970 is 11644473600 seconds across the Gregorian calendar.
const FILETIME_EPOCH_UNIX_SECONDS: i64 = -11_644_473_600;
const FILETIME_TICKS_PER_SECOND: i64 = 10_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Short(i16),
    Long(i32),
    Float(f32),
    Double(f64),
    Error(u32),
    Boolean(bool),
    LongLong(i64),
    String8(String),
    Unicode(String),
    SysTime(DateTime<Utc>),
    Binary(Vec<u8>),
}

impl PropertyValue {
    pub fn prop_type(&self) -> PropertyType {
        match self {
            PropertyValue::Short(_) => PropertyType::Short,
            PropertyValue::Long(_) => PropertyType::Long,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::Error(_) => PropertyType::Error,
            PropertyValue::Boolean(_) => PropertyType::Boolean,
            PropertyValue::LongLong(_) => PropertyType::LongLong,
            PropertyValue::String8(_) => PropertyType::String8,
            PropertyValue::Unicode(_) => PropertyType::Unicode,
            PropertyValue::SysTime(_) => PropertyType::SysTime,
            PropertyValue::Binary(_) => PropertyType::Binary,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.prop_type().is_fixed()
    }

    /// Encode to the canonical byte sequence for this value's type.
    pub fn encode(&self) -> MsgResult<Vec<u8>> {
        match self {
            PropertyValue::Short(v) => Ok(v.to_le_bytes().to_vec()),
            PropertyValue::Long(v) => Ok(v.to_le_bytes().to_vec()),
            PropertyValue::Float(v) => Ok(v.to_le_bytes().to_vec()),
            PropertyValue::Double(v) => Ok(v.to_le_bytes().to_vec()),
            PropertyValue::Error(v) => Ok(v.to_le_bytes().to_vec()),
            PropertyValue::Boolean(v) => {
                let word: u16 = if *v { 0x0001 } else { 0x0000 };
                Ok(word.to_le_bytes().to_vec())
            }
            PropertyValue::LongLong(v) => Ok(v.to_le_bytes().to_vec()),
            PropertyValue::Unicode(s) => {
                let mut bytes: Vec<u8> = s.encode_utf16().flat_map(u16::to_le_bytes).collect();
                bytes.extend_from_slice(&[0x00, 0x00]);
                Ok(bytes)
            }
            PropertyValue::String8(s) => encode_cp1252(s),
            PropertyValue::Binary(b) => Ok(b.clone()),
            PropertyValue::SysTime(dt) => Ok(datetime_to_filetime(*dt)?.to_le_bytes().to_vec()),
        }
    }
}

fn encode_cp1252(s: &str) -> MsgResult<Vec<u8>> {
    let (encoded, _, had_errors) = encoding_rs::WINDOWS_1252.encode(s);
    if had_errors {
        return Err(MsgError::Encoding(format!(
            "{:?} contains characters outside code page 1252",
            s
        )));
    }
    let mut bytes = encoded.into_owned();
    bytes.push(0x00);
    Ok(bytes)
}

/// Convert a UTC timestamp into a Windows FILETIME: 100-nanosecond ticks
/// since 1601-01-01T00:00:00Z. Rejects timestamps before the epoch.
pub fn datetime_to_filetime(dt: DateTime<Utc>) -> MsgResult<u64> {
    let unix_seconds = dt.timestamp();
    let unix_nanos = dt.timestamp_subsec_nanos() as i64;
    let seconds_since_epoch = unix_seconds - FILETIME_EPOCH_UNIX_SECONDS;
    if seconds_since_epoch < 0 {
        return Err(MsgError::Validation(format!(
            "{} predates the FILETIME epoch (1601-01-01T00:00:00Z)",
            dt
        )));
    }
    let ticks = seconds_since_epoch * FILETIME_TICKS_PER_SECOND + unix_nanos / 100;
    Ok(ticks as u64)
}

/// Inverse of [`datetime_to_filetime`], used only by tests to check the
/// round trip (the crate never reads `.msg` files back).
#[cfg(test)]
pub fn filetime_to_datetime(ticks: u64) -> DateTime<Utc> {
    let total_seconds = ticks as i64 / FILETIME_TICKS_PER_SECOND;
    let remainder_ticks = ticks as i64 % FILETIME_TICKS_PER_SECOND;
    let unix_seconds = total_seconds + FILETIME_EPOCH_UNIX_SECONDS;
    Utc.timestamp_opt(unix_seconds, (remainder_ticks * 100) as u32)
        .unwrap()
}
