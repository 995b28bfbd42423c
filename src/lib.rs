//! Writer for Outlook-compatible `.msg` files: a MAPI property set
//! serialized into an MS-CFB container.
//!
//! ```no_run
//! use msgcfb::{Attachment, Message, Recipient, RecipientType};
//!
//! let mut msg = Message::new();
//! msg.set_subject("Hello");
//! msg.set_body("Hi there");
//! msg.set_sender("a@example.com", "A", "SMTP").unwrap();
//! msg.add_recipient(Recipient::new("b@example.com", "B", RecipientType::To)).unwrap();
//! msg.save_to_path("hello.msg").unwrap();
//! ```

pub mod cfb;
pub mod clock;
pub mod common;
pub mod error;
pub mod layout;
pub mod message;
pub mod property;

pub use clock::{Clock, FixedClock, FixedIdSource, IdSource, OsIdSource, SystemClock};
pub use error::{MsgError, MsgResult};
pub use message::{Attachment, AttachMethod, Message, Recipient, RecipientType};
pub use property::{PropertyRecord, PropertyType, PropertyValue};
