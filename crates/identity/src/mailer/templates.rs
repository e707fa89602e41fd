//! HTML bodies for identity emails.

use chrono::{DateTime, Utc};

/// Subject and body of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

fn escape(value: &str) -> String {
    html_escape::encode_text(value).into_owned()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif;color:#1f2933\">\
         <h2>{title}</h2>{body}\
         <p style=\"color:#7b8794;font-size:12px\">If you did not request this, you can ignore this email.</p>\
         </body></html>"
    )
}

pub fn verification_email(first_name: &str, code: &str, expires_at: DateTime<Utc>) -> RenderedEmail {
    let body = format!(
        "<p>Hi {name},</p>\
         <p>Use this code to verify your email address:</p>\
         <p style=\"font-size:24px;letter-spacing:4px\"><code>{code}</code></p>\
         <p>The code expires at {expires}.</p>",
        name = escape(first_name),
        code = escape(code),
        expires = expires_at.format("%Y-%m-%d %H:%M UTC"),
    );

    RenderedEmail {
        subject: "Verify your Carebridge account".to_string(),
        html: layout("Verify your email", &body),
    }
}

pub fn password_reset_email(first_name: &str, code: &str, expires_at: DateTime<Utc>) -> RenderedEmail {
    let body = format!(
        "<p>Hi {name},</p>\
         <p>We received a request to reset your password. Enter this code to continue:</p>\
         <p><code>{code}</code></p>\
         <p>The code expires at {expires}.</p>",
        name = escape(first_name),
        code = escape(code),
        expires = expires_at.format("%Y-%m-%d %H:%M UTC"),
    );

    RenderedEmail {
        subject: "Reset your Carebridge password".to_string(),
        html: layout("Password reset", &body),
    }
}
