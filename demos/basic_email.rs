//! A minimal message: subject, body, sender, one TO and one CC recipient.

use msgcfb::{Message, Recipient, RecipientType};

fn main() -> msgcfb::MsgResult<()> {
    let mut msg = Message::new();
    msg.set_subject("Hello from msgcfb");
    msg.set_body("This is a test email created with msgcfb!");
    msg.set_sender("sender@example.com", "John Doe", "SMTP")?;
    msg.add_recipient(Recipient::new("recipient1@example.com", "Jane Smith", RecipientType::To))?;
    msg.add_recipient(Recipient::new("recipient2@example.com", "Bob Johnson", RecipientType::To))?;
    msg.add_recipient(Recipient::new("cc@example.com", "CC Recipient", RecipientType::Cc))?;

    msg.save_to_path("basic_email.msg")?;
    println!("wrote basic_email.msg");
    Ok(())
}
