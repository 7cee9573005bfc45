//! Transactional email templates. Delivery belongs to an external provider;
//! this module renders messages and hands them to a [`Mailer`].

use crate::error::ApiError;
use crate::settings::AppSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Verification,
    Welcome,
    PasswordReset,
}

pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), ApiError>;
}

/// Logs each message instead of delivering it.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), ApiError> {
        log::info!("email to {} queued: {:?}", message.to, message.subject);
        log::debug!("email body:\n{}", message.text);
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(preview: &str, heading: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p style=\"color:#333;font-size:16px;line-height:26px\">{}</p>", p))
        .collect();
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{preview}</title></head>\
         <body style=\"background-color:#f6f9fc;font-family:sans-serif\">\
         <div style=\"background-color:#ffffff;margin:0 auto;padding:20px 0 48px;max-width:580px\">\
         <h1 style=\"color:#333;font-size:24px;text-align:center\">{heading}</h1>{body}\
         <p style=\"color:#8898aa;font-size:12px\">Best regards,<br>The Team</p>\
         </div></body></html>",
        preview = escape_html(preview),
        heading = escape_html(heading),
        body = body,
    )
}

fn button(url: &str, label: &str) -> String {
    format!(
        "<a href=\"{url}\" target=\"_blank\" style=\"background-color:#5469d4;border-radius:5px;\
         color:#fff;display:block;padding:12px;text-align:center;text-decoration:none\">{label}</a>",
        url = escape_html(url),
        label = escape_html(label),
    )
}

pub fn verification_email(app: &AppSettings, to: &str, verification_url: &str) -> EmailMessage {
    let subject = format!("Verify your email for {}", app.name);
    let html = layout(
        &subject,
        "Verify Your Email Address",
        &[
            "Hello there,".to_string(),
            "Thank you for signing up! Please verify your email address by clicking the button below:"
                .to_string(),
            button(verification_url, "Verify Email Address"),
            "Or copy and paste this URL into your browser:".to_string(),
            format!("<code>{}</code>", escape_html(verification_url)),
            "This verification link will expire in 24 hours.".to_string(),
            format!(
                "This message was sent to {}. If you didn't create an account, you can safely ignore this email.",
                escape_html(to)
            ),
        ],
    );
    let text = format!(
        "Hello there,\n\nThank you for signing up! Verify your email address here:\n{}\n\n\
         This verification link will expire in 24 hours.\n\
         If you didn't create an account, you can safely ignore this email.\n",
        verification_url
    );
    EmailMessage {
        from: app.email_from.clone(),
        to: to.to_string(),
        subject,
        html,
        text,
    }
}

pub fn welcome_email(app: &AppSettings, to: &str, user_name: &str) -> EmailMessage {
    let subject = format!("Welcome to {}!", app.name);
    let dashboard = format!("{}/dashboard", app.url.trim_end_matches('/'));
    let html = layout(
        &subject,
        &format!("Welcome to {}!", app.name),
        &[
            format!("Hi {},", escape_html(user_name)),
            "Your email is verified and your account is ready. Start browsing skins for your Tesla:"
                .to_string(),
            button(&dashboard, "Go to Dashboard"),
        ],
    );
    let text = format!(
        "Hi {},\n\nYour email is verified and your account is ready.\n{}\n",
        user_name, dashboard
    );
    EmailMessage {
        from: app.email_from.clone(),
        to: to.to_string(),
        subject,
        html,
        text,
    }
}

pub fn password_reset_email(app: &AppSettings, to: &str, reset_url: &str) -> EmailMessage {
    let subject = format!("Reset your password for {}", app.name);
    let html = layout(
        &subject,
        "Reset Your Password",
        &[
            format!(
                "We received a request to reset the password for {}.",
                escape_html(to)
            ),
            button(reset_url, "Reset Password"),
            "Or copy and paste this URL into your browser:".to_string(),
            format!("<code>{}</code>", escape_html(reset_url)),
            "This link will expire in 1 hour. If you didn't request a password reset, you can safely ignore this email."
                .to_string(),
        ],
    );
    let text = format!(
        "We received a request to reset the password for {}.\nReset it here:\n{}\n\n\
         This link will expire in 1 hour. If you didn't request a password reset, you can safely ignore this email.\n",
        to, reset_url
    );
    EmailMessage {
        from: app.email_from.clone(),
        to: to.to_string(),
        subject,
        html,
        text,
    }
}

/// Display name for greetings: the user's name, or the local part of the email.
pub fn display_name(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn app() -> AppSettings {
        AppSettings {
            name: "Tesla Skins".to_string(),
            ..Settings::default().app
        }
    }

    #[test]
    fn verification_email_links_and_subject() {
        let url = "http://localhost:3000/auth/verify-email?token=abc&x=1";
        let message = verification_email(&app(), "driver@example.com", url);
        assert_eq!(message.subject, "Verify your email for Tesla Skins");
        assert_eq!(message.from, "Acme <onboarding@resend.dev>");
        assert!(message.html.contains("token=abc&amp;x=1"));
        assert!(message.text.contains(url));
    }

    #[test]
    fn welcome_email_escapes_user_name() {
        let message = welcome_email(&app(), "a@b.c", "<script>");
        assert_eq!(message.subject, "Welcome to Tesla Skins!");
        assert!(message.html.contains("Hi &lt;script&gt;,"));
        assert!(!message.html.contains("<script>"));
        assert!(message.text.contains("http://localhost:3000/dashboard"));
    }

    #[test]
    fn reset_email_subject_uses_default_app_name() {
        let message = password_reset_email(&Settings::default().app, "a@b.c", "http://x/reset");
        assert_eq!(message.subject, "Reset your password for our app");
        assert!(message.html.contains("Reset Your Password"));
    }

    #[test]
    fn display_name_falls_back_to_local_part() {
        assert_eq!(display_name(Some("Ada"), "ada@example.com"), "Ada");
        assert_eq!(display_name(Some("  "), "ada@example.com"), "ada");
        assert_eq!(display_name(None, "ada@example.com"), "ada");
    }
}
