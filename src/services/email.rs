// src/services/email.rs
//! Transactional email via the Resend API.
//!
//! Every send is best-effort: the callers persist their records first and a
//! failed email must never fail the request, so the send methods log and
//! swallow provider errors.

use reqwest::Client;
use serde::Serialize;
use std::env;
use tracing::{info, warn};

use crate::common::safe_email_log;

const RESEND_API: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Clone)]
pub struct EmailService {
    http: Client,
    api_key: Option<String>,
    from: String,
    support_email: String,
}

impl EmailService {
    pub fn new(
        http: Client,
        api_key: Option<String>,
        from: String,
        support_email: String,
    ) -> Self {
        Self {
            http,
            api_key,
            from,
            support_email,
        }
    }

    pub fn from_env(http: Client) -> Self {
        Self::new(
            http,
            env::var("RESEND_API_KEY").ok(),
            env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@brainwave.com".to_string()),
            env::var("SUPPORT_EMAIL").unwrap_or_else(|_| "support@brainwave.com".to_string()),
        )
    }

    async fn send(&self, to: &str, subject: &str, html: &str) {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("Email not configured, skipping send");
                return;
            }
        };

        let request = SendRequest {
            from: &self.from,
            to,
            subject,
            html,
        };

        match self
            .http
            .post(RESEND_API)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(to = %safe_email_log(to), subject = %subject, "Email sent");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(
                    to = %safe_email_log(to),
                    http_status = %status,
                    body = %body,
                    "Email provider rejected send"
                );
            }
            Err(e) => {
                warn!(to = %safe_email_log(to), error = %e, "Email send failed");
            }
        }
    }

    /// Notify the support inbox about a new contact-form submission.
    pub async fn send_contact_notification(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) {
        let subject_line = format!(
            "New Contact Form Submission: {}",
            subject.unwrap_or("No Subject")
        );
        let html = format!(
            r#"<h2>New Contact Form Submission</h2>
<p><strong>Name:</strong> {}</p>
<p><strong>Email:</strong> {}</p>
<p><strong>Subject:</strong> {}</p>
<p><strong>Message:</strong></p>
<p>{}</p>"#,
            name,
            email,
            subject.unwrap_or("N/A"),
            message
        );
        let to = self.support_email.clone();
        self.send(&to, &subject_line, &html).await;
    }

    /// Welcome email for a new waitlist signup.
    pub async fn send_waitlist_welcome(&self, email: &str, name: Option<&str>) {
        let html = format!(
            r#"<h2>Thank you for joining the Brainwave waitlist!</h2>
<p>Hi {},</p>
<p>We're excited to have you on board. You'll be among the first to know when we launch new features.</p>
<p>Stay tuned for updates!</p>
<br>
<p>Best regards,<br>The Brainwave Team</p>"#,
            name.unwrap_or("there")
        );
        self.send(email, "Welcome to Brainwave Waitlist!", &html)
            .await;
    }
}
