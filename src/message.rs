//! The in-memory message: property map, recipient list, attachment list,
//! default properties and the derivations `save` applies before handing
//! off to [`crate::layout`].

use std::collections::BTreeMap;
use std::path::Path;

use crate::cfb::CfbBuilder;
use crate::clock::{Clock, IdSource, OsIdSource, SystemClock};
use crate::error::{MsgError, MsgResult};
use crate::layout;
use crate::property::tag::*;
use crate::property::{PropertyRecord, PropertyValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientType {
    To = 1,
    Cc = 2,
    Bcc = 3,
}

#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub display_name: String,
    pub recipient_type: RecipientType,
    pub addr_type: String,
}

impl Recipient {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>, recipient_type: RecipientType) -> Self {
        Recipient {
            email: email.into(),
            display_name: display_name.into(),
            recipient_type,
            addr_type: "SMTP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachMethod {
    ByValue = 1,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
    pub content_id: Option<String>,
    pub mime_type: String,
    pub inline: bool,
    pub method: AttachMethod,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Attachment {
            filename: filename.into(),
            data,
            content_id: None,
            mime_type: "application/octet-stream".to_string(),
            inline: false,
            method: AttachMethod::ByValue,
        }
    }

    pub fn extension(&self) -> Option<String> {
        let dot = self.filename.rfind('.')?;
        if dot == 0 {
            return None;
        }
        Some(self.filename[dot..].to_string())
    }
}

/// An email ready to be serialized to a `.msg` byte stream.
///
/// Constructed with defaults pre-populated (message class, timestamps,
/// importance/priority/sensitivity, codepages); mutated through setters;
/// consumed once by [`Message::save`] or [`Message::save_to_path`].
pub struct Message {
    properties: BTreeMap<u16, PropertyRecord>,
    recipients: Vec<Recipient>,
    attachments: Vec<Attachment>,
    clock: Box<dyn Clock>,
    id_source: Box<dyn IdSource>,
    /// Computed once, at construction (root form) or by
    /// `set_parent_conversation_index` (reply form), so that reading it via
    /// `conversation_index()` and the bytes `save` writes always agree.
    conversation_index: Vec<u8>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("properties", &self.properties)
            .field("recipients", &self.recipients)
            .field("attachments", &self.attachments)
            .finish()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Message {
    pub fn new() -> Self {
        Self::with_clock_and_id_source(Box::new(SystemClock), Box::new(OsIdSource))
    }

    /// Construct with injected clock/RNG, for deterministic tests.
    pub fn with_clock_and_id_source(clock: Box<dyn Clock>, id_source: Box<dyn IdSource>) -> Self {
        let mut msg = Message {
            properties: BTreeMap::new(),
            recipients: Vec::new(),
            attachments: Vec::new(),
            clock,
            id_source,
            conversation_index: Vec::new(),
        };
        msg.apply_defaults();
        msg.conversation_index = msg.new_root_conversation_index();
        msg
    }

    fn apply_defaults(&mut self) {
        let now = self.clock.now();
        self.set_prop(PR_MESSAGE_CLASS, PropertyValue::Unicode("IPM.Note".to_string()));
        self.set_prop(PR_MESSAGE_FLAGS, PropertyValue::Long(0));
        self.set_prop(PR_CLIENT_SUBMIT_TIME, PropertyValue::SysTime(now));
        self.set_prop(PR_MESSAGE_DELIVERY_TIME, PropertyValue::SysTime(now));
        self.set_prop(PR_CREATION_TIME, PropertyValue::SysTime(now));
        self.set_prop(PR_LAST_MODIFICATION_TIME, PropertyValue::SysTime(now));
        self.set_prop(PR_IMPORTANCE, PropertyValue::Long(1));
        self.set_prop(PR_PRIORITY, PropertyValue::Long(0));
        self.set_prop(PR_SENSITIVITY, PropertyValue::Long(0));
        self.set_prop(PR_HASATTACH, PropertyValue::Boolean(false));
        self.set_prop(PR_MESSAGE_CODEPAGE, PropertyValue::Long(65001));
        self.set_prop(PR_INTERNET_CPID, PropertyValue::Long(65001));
        self.set_prop(PR_MESSAGE_LOCALE_ID, PropertyValue::Long(0x0409));
        self.set_prop(PR_MSG_STATUS, PropertyValue::Long(0));
        self.set_prop(PR_READ_RECEIPT_REQUESTED, PropertyValue::Boolean(false));
        self.set_prop(
            PR_ORIGINATOR_DELIVERY_REPORT_REQUESTED,
            PropertyValue::Boolean(false),
        );
    }

    fn set_prop(&mut self, tag: u16, value: PropertyValue) {
        self.properties.insert(tag, PropertyRecord::new(tag, value));
    }

    pub fn properties(&self) -> &BTreeMap<u16, PropertyRecord> {
        &self.properties
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Sets `PR_SUBJECT` and derives `PR_CONVERSATION_TOPIC` by stripping at
    /// most one leading `RE:`/`FW:` prefix (any case) and following
    /// whitespace.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        let subject = subject.into();
        let topic = strip_reply_prefix(&subject);
        self.set_prop(PR_SUBJECT, PropertyValue::Unicode(subject));
        self.set_prop(PR_CONVERSATION_TOPIC, PropertyValue::Unicode(topic));
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.set_prop(PR_BODY, PropertyValue::Unicode(body.into()));
    }

    pub fn set_html_body(&mut self, html: impl Into<String>) {
        self.set_prop(PR_HTML, PropertyValue::Binary(html.into().into_bytes()));
    }

    pub fn set_transport_headers(&mut self, headers: impl Into<String>) {
        self.set_prop(PR_TRANSPORT_MESSAGE_HEADERS, PropertyValue::Unicode(headers.into()));
    }

    pub fn set_internet_message_id(&mut self, message_id: impl Into<String>) {
        self.set_prop(PR_INTERNET_MESSAGE_ID, PropertyValue::Unicode(message_id.into()));
    }

    /// Sets both the `PR_SENDER_*` and `PR_SENT_REPRESENTING_*` families to
    /// the same identity. The core imposes no policy restricting this to an
    /// authenticated mailbox.
    pub fn set_sender(&mut self, email: impl Into<String>, name: impl Into<String>, addr_type: impl Into<String>) -> MsgResult<()> {
        let email = email.into();
        let name = name.into();
        let addr_type = addr_type.into();
        if email.trim().is_empty() {
            return Err(MsgError::Validation("sender email must not be empty".to_string()));
        }
        let search_key = create_search_key(&addr_type, &email)?;
        let entryid = create_entryid(&addr_type, &email, &name)?;

        self.set_prop(PR_SENDER_NAME, PropertyValue::Unicode(name.clone()));
        self.set_prop(PR_SENDER_EMAIL_ADDRESS, PropertyValue::Unicode(email.clone()));
        self.set_prop(PR_SENDER_ADDRTYPE, PropertyValue::Unicode(addr_type.clone()));
        self.set_prop(PR_SENDER_SEARCH_KEY, PropertyValue::Binary(search_key.clone()));
        self.set_prop(PR_SENDER_ENTRYID, PropertyValue::Binary(entryid.clone()));

        self.set_prop(PR_SENT_REPRESENTING_NAME, PropertyValue::Unicode(name));
        self.set_prop(PR_SENT_REPRESENTING_EMAIL_ADDRESS, PropertyValue::Unicode(email));
        self.set_prop(PR_SENT_REPRESENTING_ADDRTYPE, PropertyValue::Unicode(addr_type));
        self.set_prop(PR_SENT_REPRESENTING_SEARCH_KEY, PropertyValue::Binary(search_key));
        self.set_prop(PR_SENT_REPRESENTING_ENTRYID, PropertyValue::Binary(entryid));
        Ok(())
    }

    pub fn add_recipient(&mut self, recipient: Recipient) -> MsgResult<()> {
        if recipient.email.trim().is_empty() {
            return Err(MsgError::Validation("recipient email must not be empty".to_string()));
        }
        self.recipients.push(recipient);
        Ok(())
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// The conversation index this message will be saved with. Reading it
    /// off a sent message to pass into a reply's
    /// [`Message::set_parent_conversation_index`] is how threading chains
    /// are built (see `demos/email_thread.rs`).
    pub fn conversation_index(&self) -> &[u8] {
        &self.conversation_index
    }

    /// Marks this message as a reply/forward of `parent_conversation_index`,
    /// recomputing `PR_CONVERSATION_INDEX` as the reply form (parent bytes
    /// plus 5 fresh bytes) immediately.
    pub fn set_parent_conversation_index(&mut self, parent_conversation_index: Vec<u8>) {
        let mut index = parent_conversation_index;
        let mut delta = [0u8; 5];
        self.id_source.random_bytes(&mut delta);
        index.extend_from_slice(&delta);
        self.conversation_index = index;
    }

    /// Applies the `save`-time derivations (display lists, has-attach flag,
    /// message flags) and returns the finished CFB byte image. Consumes
    /// nothing — the message can be saved more than once.
    pub fn to_bytes(&self) -> MsgResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut out);
        self.save(&mut cursor)?;
        Ok(out)
    }

    /// Writes the finished CFB byte image to `sink`. The only caller this
    /// crate ships, [`Message::save_to_path`], owns the sink's lifecycle and
    /// cleans up on failure; a caller driving its own `impl Write` is
    /// responsible for that policy itself.
    pub fn save<W: std::io::Write + std::io::Seek>(&self, sink: &mut W) -> MsgResult<()> {
        let mut finalized = self.finalize_properties();
        finalized.insert(
            PR_CONVERSATION_INDEX,
            PropertyRecord::new(PR_CONVERSATION_INDEX, PropertyValue::Binary(self.conversation_index.clone())),
        );

        let mut builder = CfbBuilder::new();
        layout::write_message(&mut builder, &finalized, &self.recipients, &self.attachments)?;
        builder.finalize(sink)?;
        Ok(())
    }

    /// Opens `path`, writes the finished image, and removes the
    /// partially-written file if any step fails, so callers never observe a
    /// truncated `.msg` on disk.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> MsgResult<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        if let Err(err) = self.save(&mut writer) {
            drop(writer);
            let _ = std::fs::remove_file(path);
            return Err(err);
        }
        Ok(())
    }

    fn finalize_properties(&self) -> BTreeMap<u16, PropertyRecord> {
        let mut props = self.properties.clone();

        let has_attach = !self.attachments.is_empty();
        props.insert(
            PR_HASATTACH,
            PropertyRecord::new(PR_HASATTACH, PropertyValue::Boolean(has_attach)),
        );

        let mut flags = MSGFLAG_READ;
        if has_attach {
            flags |= MSGFLAG_HASATTACH;
        }
        props.insert(
            PR_MESSAGE_FLAGS,
            PropertyRecord::new(PR_MESSAGE_FLAGS, PropertyValue::Long(flags)),
        );

        for (tag, rtype) in [
            (PR_DISPLAY_TO, RecipientType::To),
            (PR_DISPLAY_CC, RecipientType::Cc),
            (PR_DISPLAY_BCC, RecipientType::Bcc),
        ] {
            let joined = self
                .recipients
                .iter()
                .filter(|r| r.recipient_type == rtype)
                .map(|r| r.display_name.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                props.insert(tag, PropertyRecord::new(tag, PropertyValue::Unicode(joined)));
            }
        }

        props
    }

    /// New-thread form: `0x01` + first 5 bytes of the current FILETIME + 16
    /// random bytes (22 bytes total).
    fn new_root_conversation_index(&self) -> Vec<u8> {
        let now = self.clock.now();
        let ticks = crate::property::value::datetime_to_filetime(now).unwrap_or(0);
        let ticks_bytes = ticks.to_le_bytes();
        let mut index = Vec::with_capacity(22);
        index.push(0x01);
        index.extend_from_slice(&ticks_bytes[0..5]);
        index.extend_from_slice(&self.id_source.random_guid());
        index
    }
}

fn ensure_ascii(field: &str, value: &str) -> MsgResult<()> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(MsgError::Validation(format!(
            "{field} must be ASCII, got {value:?}"
        )))
    }
}

/// `uppercase(addr_type) + ":" + uppercase(email)` + one NUL. Both fields
/// must be ASCII.
pub fn create_search_key(addr_type: &str, email: &str) -> MsgResult<Vec<u8>> {
    ensure_ascii("addr_type", addr_type)?;
    ensure_ascii("email", email)?;
    let mut s = format!("{}:{}", addr_type.to_uppercase(), email.to_uppercase());
    s.push('\0');
    Ok(s.into_bytes())
}

/// One-off simplified EntryID: zero flags, zero provider UID, zero version,
/// followed by NUL-terminated ASCII address type, email, and display name.
/// All three fields must be ASCII.
pub fn create_entryid(addr_type: &str, email: &str, display_name: &str) -> MsgResult<Vec<u8>> {
    ensure_ascii("addr_type", addr_type)?;
    ensure_ascii("email", email)?;
    ensure_ascii("display_name", display_name)?;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 16]);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(addr_type.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(email.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(display_name.as_bytes());
    bytes.push(0);
    Ok(bytes)
}

fn strip_reply_prefix(subject: &str) -> String {
    let trimmed = subject.trim_start();
    for prefix in ["RE:", "FW:"] {
        if trimmed
            .as_bytes()
            .get(..prefix.len())
            .is_some_and(|b| b.eq_ignore_ascii_case(prefix.as_bytes()))
        {
            return trimmed[prefix.len()..].trim_start().to_string();
        }
    }
    subject.to_string()
}
