use std::time::Duration;

use async_trait::async_trait;
use shared_types::{AppError, BookingNotificationRequest};

use crate::store::Mailer;

// --- Environment helpers ---

fn mailgun_api_key() -> Result<String, String> {
    std::env::var("MAILGUN_API_KEY").map_err(|_| "MAILGUN_API_KEY is not configured".to_string())
}

fn mailgun_domain() -> Result<String, String> {
    std::env::var("MAILGUN_DOMAIN").map_err(|_| "MAILGUN_DOMAIN is not configured".to_string())
}

fn mailgun_from() -> Result<String, String> {
    match std::env::var("MAILGUN_FROM") {
        Ok(v) => Ok(v),
        Err(_) => Ok(format!("{} <noreply@{}>", app_name(), mailgun_domain()?)),
    }
}

pub fn app_base_url() -> String {
    std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

pub fn app_name() -> String {
    std::env::var("APP_NAME").unwrap_or_else(|_| "Stazy".to_string())
}

// --- Core email sending ---

/// Upper bound on a single Mailgun round trip.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[tracing::instrument(skip(html_body))]
pub async fn send_email(to: &str, subject: &str, html_body: &str) -> Result<(), String> {
    let domain = mailgun_domain()?;
    let url = format!("https://api.mailgun.net/v3/{}/messages", domain);

    let client = reqwest::Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
        .map_err(|e| format!("Mailgun client setup failed: {}", e))?;
    let response = client
        .post(&url)
        .basic_auth("api", Some(mailgun_api_key()?))
        .form(&[
            ("from", mailgun_from()?),
            ("to", to.to_string()),
            ("subject", subject.to_string()),
            ("html", html_body.to_string()),
        ])
        .send()
        .await
        .map_err(|e| format!("Mailgun request failed: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Mailgun API error ({}): {}", status, body));
    }

    tracing::info!(to = to, subject = subject, "Email sent successfully");
    Ok(())
}

/// `Mailer` backed by the Mailgun HTTP API.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailgunMailer;

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        send_email(to, subject, html_body)
            .await
            .map_err(AppError::internal)
    }
}

// --- Booking request email ---

pub fn booking_request_subject(req: &BookingNotificationRequest) -> String {
    format!("New Booking Request: {}", req.room_title)
}

pub fn booking_request_body(req: &BookingNotificationRequest) -> String {
    templates::booking_request_html(req, &app_name(), &app_base_url())
}

mod templates {
    use shared_types::BookingNotificationRequest;

    fn escape(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    pub fn booking_request_html(
        req: &BookingNotificationRequest,
        app_name: &str,
        base_url: &str,
    ) -> String {
        let link = format!("{}/admin/notifications", base_url);
        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; background: #f6f7f9; color: #1f2933; padding: 20px;">
  <div style="max-width: 600px; margin: 0 auto; background: #ffffff; border-radius: 8px; padding: 30px;">
    <h1 style="color: #0f766e;">New Booking Request</h1>
    <p><strong>{tenant_name}</strong> ({tenant_email}) has requested to book <strong>{room_title}</strong>.</p>
    <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
      <tr><td style="padding: 8px; border-bottom: 1px solid #e5e7eb;">Start date</td><td style="padding: 8px; border-bottom: 1px solid #e5e7eb; text-align: right;">{start_date}</td></tr>
      <tr><td style="padding: 8px; border-bottom: 1px solid #e5e7eb;">Monthly rent</td><td style="padding: 8px; border-bottom: 1px solid #e5e7eb; text-align: right;">&#8377;{rent:.0}</td></tr>
    </table>
    <p style="text-align: center;">
      <a href="{link}" style="display: inline-block; background: #0f766e; color: #ffffff; padding: 12px 24px; text-decoration: none; border-radius: 6px;">Open admin notifications</a>
    </p>
    <p style="color: #6b7280;">The {app_name} Team</p>
  </div>
</body>
</html>"#,
            tenant_name = escape(&req.tenant_name),
            tenant_email = escape(&req.tenant_email),
            room_title = escape(&req.room_title),
            start_date = req.start_date,
            rent = req.monthly_rent,
            link = link,
            app_name = escape(app_name),
        )
    }
}
