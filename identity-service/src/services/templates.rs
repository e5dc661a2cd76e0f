//! HTML bodies for the one-time-code emails.

use chrono::{DateTime, Datelike, Utc};

const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <style>
        body { font-family: Arial, sans-serif; background-color: #f4f4f4; margin: 0; padding: 0; }
        .email-container { background-color: #ffffff; max-width: 600px; margin: 40px auto; padding: 20px; border: 1px solid #dddddd; border-radius: 5px; }
        .otp { font-size: 24px; }
        p { font-size: 16px; color: #333333; line-height: 1.6; }
        .footer { margin-top: 40px; font-size: 14px; color: #777777; }
    </style>
</head>
<body>
    <div class="email-container">
        <p>Hello,</p>
        {{intro}}
        <p><strong class="otp">{{otp}}</strong></p>
        <p>Please note that this code will expire by {{expiry}}, please ensure to use it before that time.</p>
        <p>Thanks.<br>{{brand}}</p>
        <div class="footer">
            <p>&copy; {{year}}, {{brand}}. All rights reserved.</p>
        </div>
    </div>
</body>
</html>"#;

/// Which email a code is being sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpEmail {
    Verification,
    PasswordReset,
    PinReset,
}

impl OtpEmail {
    pub fn subject(&self, brand: &str) -> String {
        match self {
            OtpEmail::Verification => format!("Verify your {} account", brand),
            OtpEmail::PasswordReset => format!("{} password reset", brand),
            OtpEmail::PinReset => format!("{} PIN reset", brand),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            OtpEmail::Verification => "Onboarding Verification",
            OtpEmail::PasswordReset => "Password Reset",
            OtpEmail::PinReset => "PIN Reset",
        }
    }

    fn intro(&self, brand: &str) -> String {
        match self {
            OtpEmail::Verification => format!(
                "<p>Thank you for signing up to {}!</p>\
                 <p>To complete the signup process, please use the following One-Time-Pin.</p>",
                brand
            ),
            OtpEmail::PasswordReset => "<p>We received a request to reset your password.</p>\
                 <p>Use the following One-Time-Pin to choose a new password.</p>"
                .to_string(),
            OtpEmail::PinReset => "<p>We received a request to reset your PIN.</p>\
                 <p>Use the following One-Time-Pin to choose a new PIN.</p>"
                .to_string(),
        }
    }
}

/// Render the email for `code`, valid until `expires_at`.
pub fn render_otp_email(kind: OtpEmail, brand: &str, code: &str, expires_at: DateTime<Utc>) -> String {
    LAYOUT
        .replace("{{title}}", kind.title())
        .replace("{{intro}}", &kind.intro(brand))
        .replace("{{otp}}", code)
        .replace(
            "{{expiry}}",
            &expires_at.format("%a %d %b %Y, %I:%M:%S%p UTC").to_string(),
        )
        .replace("{{year}}", &expires_at.year().to_string())
        .replace("{{brand}}", brand)
}
