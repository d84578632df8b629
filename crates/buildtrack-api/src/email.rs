use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use buildtrack_types::models::{Project, User};
use serde::Serialize;
use tracing::info;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound transactional email.
#[derive(Clone)]
pub enum Mailer {
    Resend(ResendClient),
    /// No provider configured; messages are logged instead of sent.
    Disabled,
    /// Messages are kept in memory, for local runs and tests.
    Memory(Outbox),
}

#[derive(Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<Email>>>);

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Email> {
        self.0.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn push(&self, email: &Email) -> Result<()> {
        self.0
            .lock()
            .map_err(|e| anyhow!("outbox lock poisoned: {}", e))?
            .push(email.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl Mailer {
    pub fn resend(api_key: String, from: String) -> Self {
        Self::Resend(ResendClient {
            http: reqwest::Client::new(),
            api_key,
            from,
        })
    }

    pub fn provider(&self) -> &'static str {
        match self {
            Self::Resend(_) => "resend",
            Self::Disabled => "disabled",
            Self::Memory(_) => "memory",
        }
    }

    pub async fn send(&self, email: &Email) -> Result<()> {
        match self {
            Self::Resend(client) => client.send(email).await,
            Self::Disabled => {
                info!("Email disabled, not sending '{}' to {}", email.subject, email.to);
                Ok(())
            }
            Self::Memory(outbox) => outbox.push(email),
        }
    }
}

impl ResendClient {
    async fn send(&self, email: &Email) -> Result<()> {
        let payload = ResendPayload {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Resend rejected email to {}: {} {}", email.to, status, body);
        }

        info!("Sent '{}' to {}", email.subject, email.to);
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn welcome(user: &User, app_url: &str) -> Email {
    Email {
        to: user.email.clone(),
        subject: "Welcome to BuildTrack".into(),
        html: format!(
            "<p>Hi {},</p>\
             <p>Your {} account is ready. Sign in at <a href=\"{app_url}/login\">{app_url}/login</a> \
             to follow your projects.</p>",
            escape(&user.first_name),
            user.role,
        ),
    }
}

pub fn new_photos(homeowner: &User, project: &Project, count: usize, app_url: &str) -> Email {
    let (noun, verb) = if count == 1 { ("photo", "was") } else { ("photos", "were") };
    Email {
        to: homeowner.email.clone(),
        subject: format!("New {} for {}", noun, project.title),
        html: format!(
            "<p>Hi {},</p>\
             <p>{count} new {noun} {verb} added to <strong>{}</strong>.</p>\
             <p><a href=\"{app_url}/projects/{}\">View the project</a></p>",
            escape(&homeowner.first_name),
            escape(&project.title),
            project.id,
        ),
    }
}

pub fn password_reset(user: &User, link: &str) -> Email {
    Email {
        to: user.email.clone(),
        subject: "Reset your BuildTrack password".into(),
        html: format!(
            "<p>Hi {},</p>\
             <p>Use <a href=\"{link}\">this link</a> to choose a new password. \
             It expires in one hour. If you did not ask for this, ignore this email.</p>",
            escape(&user.first_name),
        ),
    }
}

pub fn test_message(to: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "BuildTrack test email".into(),
        html: "<p>Email delivery is working.</p>".into(),
    }
}
