//! An HTML body with an inline attachment referenced by content-id, plus a
//! second, non-inline attachment.

use msgcfb::{Attachment, Message, Recipient, RecipientType};

fn main() -> msgcfb::MsgResult<()> {
    let mut msg = Message::new();
    msg.set_subject("HTML Newsletter");
    msg.set_sender("marketing@company.com", "Marketing Team", "SMTP")?;
    msg.add_recipient(Recipient::new("customer@example.com", "Valued Customer", RecipientType::To))?;

    let html_body = "<html><body><h1>Welcome to Our Newsletter!</h1>\
        <p>Check out our new logo:</p><img src=\"cid:company_logo\" alt=\"Company Logo\" />\
        <p>Best regards,<br>The Team</p></body></html>";
    msg.set_body("Welcome to Our Newsletter! (HTML-only content follows)");
    msg.set_html_body(html_body);

    let red_pixel_png: Vec<u8> = vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    ];
    let mut logo = Attachment::new("logo.png", red_pixel_png);
    logo.mime_type = "image/png".to_string();
    logo.content_id = Some("company_logo".to_string());
    logo.inline = true;
    msg.add_attachment(logo);

    let report = Attachment::new("report.txt", b"Q3 summary attached for reference.".to_vec());
    msg.add_attachment(report);

    msg.save_to_path("attachment_email.msg")?;
    println!("wrote attachment_email.msg");
    Ok(())
}
