//! A root message and two replies sharing one conversation index chain.

use msgcfb::{Message, Recipient, RecipientType};

fn main() -> msgcfb::MsgResult<()> {
    let mut msg1 = Message::new();
    msg1.set_subject("Project Discussion");
    msg1.set_sender("alice@company.com", "Alice", "SMTP")?;
    msg1.add_recipient(Recipient::new("bob@company.com", "Bob", RecipientType::To))?;
    msg1.set_body("Hi Bob, what do you think about the new proposal?");
    msg1.save_to_path("thread_01.msg")?;
    println!("wrote thread_01.msg");

    let conversation_index = msg1.conversation_index().to_vec();

    let mut msg2 = Message::new();
    msg2.set_subject("RE: Project Discussion");
    msg2.set_sender("bob@company.com", "Bob", "SMTP")?;
    msg2.add_recipient(Recipient::new("alice@company.com", "Alice", RecipientType::To))?;
    msg2.set_body("I think it looks great! Let's move forward.");
    msg2.set_parent_conversation_index(conversation_index.clone());
    msg2.save_to_path("thread_02.msg")?;
    println!("wrote thread_02.msg (reply)");

    let mut msg3 = Message::new();
    msg3.set_subject("RE: Project Discussion");
    msg3.set_sender("alice@company.com", "Alice", "SMTP")?;
    msg3.add_recipient(Recipient::new("bob@company.com", "Bob", RecipientType::To))?;
    msg3.set_body("Perfect! I'll schedule a meeting.");
    msg3.set_parent_conversation_index(conversation_index);
    msg3.save_to_path("thread_03.msg")?;
    println!("wrote thread_03.msg (reply)");

    Ok(())
}
