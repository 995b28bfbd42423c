//! Drives the writer from a small in-memory recipient table instead of a
//! one-off call.

use msgcfb::{Message, Recipient, RecipientType};

struct Account {
    name: &'static str,
    email: &'static str,
    account_id: &'static str,
}

fn main() -> msgcfb::MsgResult<()> {
    let accounts = [
        Account { name: "John Doe", email: "john@example.com", account_id: "12345" },
        Account { name: "Jane Smith", email: "jane@example.com", account_id: "12346" },
        Account { name: "Bob Johnson", email: "bob@example.com", account_id: "12347" },
    ];

    for account in accounts {
        let mut msg = Message::new();
        msg.set_subject(format!("Account Statement for {}", account.name));
        msg.set_sender("noreply@company.com", "Customer Service", "SMTP")?;
        msg.add_recipient(Recipient::new(account.email, account.name, RecipientType::To))?;
        msg.set_body(format!(
            "Dear {},\n\nYour monthly account statement is ready.\n\nAccount ID: {}\n\nThank you for your business!\n\nBest regards,\nCustomer Service Team\n",
            account.name, account.account_id
        ));

        let filename = format!("statement_{}.msg", account.account_id);
        msg.save_to_path(&filename)?;
        println!("wrote {filename}");
    }

    Ok(())
}
