//! MAPI property tags (`PidTag*`) and the property-type enumeration, per
//! MS-OXPROPS.

#![allow(non_upper_case_globals)]

/// MAPI property type identifiers (MS-OXCDATA 2.11.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum PropertyType {
    Short = 0x0002,
    Long = 0x0003,
    Float = 0x0004,
    Double = 0x0005,
    Error = 0x000A,
    Boolean = 0x000B,
    LongLong = 0x0014,
    String8 = 0x001E,
    Unicode = 0x001F,
    SysTime = 0x0040,
    Binary = 0x0102,
    /// Recognized but unused by this encoder: multi-valued variants.
    MvShort = 0x1002,
    MvLong = 0x1003,
    MvUnicode = 0x101F,
}

impl PropertyType {
    /// `SHORT, LONG, FLOAT, DOUBLE, BOOLEAN, LONGLONG, SYSTIME, ERROR` fit
    /// in the fixed 8-byte slot of a `__properties_version1.0` entry;
    /// everything else is stored in a `__substg1.0_*` stream.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            PropertyType::Short
                | PropertyType::Long
                | PropertyType::Float
                | PropertyType::Double
                | PropertyType::Boolean
                | PropertyType::LongLong
                | PropertyType::SysTime
                | PropertyType::Error
        )
    }
}

pub const PR_MESSAGE_CLASS: u16 = 0x001A;
pub const PR_SUBJECT: u16 = 0x0037;
pub const PR_CONVERSATION_TOPIC: u16 = 0x0070;
pub const PR_CONVERSATION_INDEX: u16 = 0x0071;
pub const PR_IMPORTANCE: u16 = 0x0017;
pub const PR_PRIORITY: u16 = 0x0026;
pub const PR_SENSITIVITY: u16 = 0x0036;
pub const PR_MESSAGE_FLAGS: u16 = 0x0E07;

pub const PR_CLIENT_SUBMIT_TIME: u16 = 0x0039;
pub const PR_MESSAGE_DELIVERY_TIME: u16 = 0x0E06;
pub const PR_CREATION_TIME: u16 = 0x3007;
pub const PR_LAST_MODIFICATION_TIME: u16 = 0x3008;

pub const PR_BODY: u16 = 0x1000;
pub const PR_HTML: u16 = 0x1013;

pub const PR_TRANSPORT_MESSAGE_HEADERS: u16 = 0x007D;
pub const PR_INTERNET_MESSAGE_ID: u16 = 0x1035;

pub const PR_SENDER_NAME: u16 = 0x0C1A;
pub const PR_SENDER_EMAIL_ADDRESS: u16 = 0x0C1F;
pub const PR_SENDER_ADDRTYPE: u16 = 0x0C1E;
pub const PR_SENDER_ENTRYID: u16 = 0x0C19;
pub const PR_SENDER_SEARCH_KEY: u16 = 0x0C1D;

pub const PR_SENT_REPRESENTING_NAME: u16 = 0x0042;
pub const PR_SENT_REPRESENTING_EMAIL_ADDRESS: u16 = 0x0065;
pub const PR_SENT_REPRESENTING_ADDRTYPE: u16 = 0x0064;
pub const PR_SENT_REPRESENTING_ENTRYID: u16 = 0x0041;
pub const PR_SENT_REPRESENTING_SEARCH_KEY: u16 = 0x003B;

pub const PR_RECIPIENT_TYPE: u16 = 0x0C15;
pub const PR_DISPLAY_NAME: u16 = 0x3001;
pub const PR_EMAIL_ADDRESS: u16 = 0x3003;
pub const PR_ADDRTYPE: u16 = 0x3002;
pub const PR_ENTRYID: u16 = 0x0FFF;
pub const PR_SEARCH_KEY: u16 = 0x300B;
pub const PR_SMTP_ADDRESS: u16 = 0x39FE;
/// `PR_OBJECT_TYPE_PROP` and `PR_OBJECT_TYPE` share tag 0x0FFE in MS-OXPROPS
/// as retrieved; treated as one constant here (spec open question).
pub const PR_OBJECT_TYPE: u16 = 0x0FFE;

pub const PR_DISPLAY_TO: u16 = 0x0E04;
pub const PR_DISPLAY_CC: u16 = 0x0E03;
pub const PR_DISPLAY_BCC: u16 = 0x0E02;

pub const PR_ATTACH_NUM: u16 = 0x0E21;
pub const PR_ATTACH_SIZE: u16 = 0x0E20;
pub const PR_ATTACH_FILENAME: u16 = 0x3704;
pub const PR_ATTACH_LONG_FILENAME: u16 = 0x3707;
pub const PR_ATTACH_EXTENSION: u16 = 0x3703;
pub const PR_ATTACH_METHOD: u16 = 0x3705;
pub const PR_ATTACH_DATA_BIN: u16 = 0x3701;
pub const PR_ATTACH_MIME_TAG: u16 = 0x370E;
pub const PR_ATTACH_CONTENT_ID: u16 = 0x3712;
pub const PR_RENDERING_POSITION: u16 = 0x370B;
pub const PR_ATTACHMENT_HIDDEN: u16 = 0x7FFE;

pub const PR_HASATTACH: u16 = 0x0E1B;
pub const PR_MESSAGE_CODEPAGE: u16 = 0x3FFD;
pub const PR_INTERNET_CPID: u16 = 0x3FDE;
pub const PR_MESSAGE_LOCALE_ID: u16 = 0x3FF1;

pub const PR_READ_RECEIPT_REQUESTED: u16 = 0x0029;
pub const PR_ORIGINATOR_DELIVERY_REPORT_REQUESTED: u16 = 0x0023;

pub const PR_MSG_STATUS: u16 = 0x0E17;

/// Not defined in the tag table as retrieved; MS-OXPROPS implementers
/// commonly assign 0x340D (spec open question). Unused by default
/// properties; kept for callers that want to set it explicitly.
pub const PR_STORE_SUPPORT_MASK: u16 = 0x340D;

pub const MSGFLAG_READ: i32 = 0x0000_0001;
pub const MSGFLAG_HASATTACH: i32 = 0x0000_0010;
