//! Minimal GitHub Issues REST client (spec.md §4.9).
//!
//! Built on `ureq`, configured with `http_status_as_error(false)` so a 4xx/5xx
//! response is returned as `Ok` rather than `Err` -- the orchestrator needs to
//! read `Retry-After` off a 429 and `Link` off a 200, and `remove_label`
//! treats a 404 as success.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::{MirrorError, Result};

const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// An issue as returned by the GitHub REST API, narrowed to the fields the
/// Mirror Orchestrator needs.
#[derive(Debug, Clone)]
pub struct ExternalIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
    pub html_url: String,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// The create/update payload shape.
#[derive(Debug, Clone)]
pub struct ExternalIssuePatch {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub state: String,
}

#[derive(Debug, Serialize)]
struct CreateOrUpdateBody<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
    state: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    labels: Vec<RawLabel>,
    html_url: String,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl From<RawIssue> for ExternalIssue {
    fn from(raw: RawIssue) -> Self {
        Self {
            number: raw.number,
            title: raw.title,
            body: raw.body,
            state: raw.state,
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            html_url: raw.html_url,
            updated_at: raw.updated_at,
            closed_at: raw.closed_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct AddLabelsBody<'a> {
    labels: &'a [String],
}

#[derive(Debug, Serialize)]
struct AddCommentBody<'a> {
    body: &'a str,
}

/// A thin, retrying wrapper around the GitHub Issues REST API for one
/// `owner/repo`.
pub struct GithubClient {
    agent: Agent,
    token: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Self {
        let config = ureq::config::Config::builder().http_status_as_error(false).build();
        Self {
            agent: Agent::new_with_config(config),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn issues_url(&self) -> String {
        format!("https://api.github.com/repos/{}/{}/issues", self.owner, self.repo)
    }

    pub fn create_issue(&self, patch: &ExternalIssuePatch) -> Result<ExternalIssue> {
        let url = self.issues_url();
        let response = self.with_retry(|| {
            self.agent
                .post(&url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .send_json(CreateOrUpdateBody {
                    title: &patch.title,
                    body: &patch.body,
                    labels: &patch.labels,
                    state: &patch.state,
                })
        })?;
        read_issue(response)
    }

    pub fn update_issue(&self, number: u64, patch: &ExternalIssuePatch) -> Result<ExternalIssue> {
        let url = format!("{}/{}", self.issues_url(), number);
        let response = self.with_retry(|| {
            self.agent
                .patch(&url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .send_json(CreateOrUpdateBody {
                    title: &patch.title,
                    body: &patch.body,
                    labels: &patch.labels,
                    state: &patch.state,
                })
        })?;
        read_issue(response)
    }

    /// Lists every open-or-closed issue in the repo, following `Link:
    /// rel="next"` pagination until exhausted. Pull requests (which GitHub's
    /// issues endpoint also returns) are filtered out.
    pub fn list_issues(&self) -> Result<Vec<ExternalIssue>> {
        let mut url = format!("{}?state=all&per_page=100", self.issues_url());
        let mut issues = Vec::new();

        loop {
            let response = self.with_retry(|| {
                self.agent
                    .get(&url)
                    .header("Authorization", &format!("Bearer {}", self.token))
                    .header("Accept", "application/vnd.github+json")
                    .call()
            })?;

            let next = next_page_url(&response);
            let status = response.status();
            let mut response = response;
            if !status.is_success() {
                return Err(MirrorError::ExternalApi(format!(
                    "list issues failed with status {status}"
                )));
            }
            let page: Vec<RawIssue> = response
                .body_mut()
                .read_json()
                .map_err(|e| MirrorError::ExternalApi(e.to_string()))?;
            issues.extend(page.into_iter().filter(|i| i.pull_request.is_none()).map(ExternalIssue::from));

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(issues)
    }

    pub fn add_label(&self, number: u64, label: &str) -> Result<()> {
        let url = format!("{}/{}/labels", self.issues_url(), number);
        let response = self.with_retry(|| {
            self.agent
                .post(&url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .send_json(AddLabelsBody { labels: std::slice::from_ref(&label.to_string()) })
        })?;
        expect_success(response, "add label")
    }

    /// Removes a label from an issue. GitHub returns 404 both when the
    /// issue lacks the label and when the label doesn't exist on the repo --
    /// either way the desired end state (label absent) already holds, so a
    /// 404 here is treated as success rather than an error.
    pub fn remove_label(&self, number: u64, label: &str) -> Result<()> {
        let url = format!("{}/{}/labels/{}", self.issues_url(), number, urlencode(label));
        let response = self.with_retry(|| {
            self.agent
                .delete(&url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .call()
        })?;
        if response.status().as_u16() == 404 {
            return Ok(());
        }
        expect_success(response, "remove label")
    }

    pub fn add_comment(&self, number: u64, body: &str) -> Result<()> {
        let url = format!("{}/{}/comments", self.issues_url(), number);
        let response = self.with_retry(|| {
            self.agent
                .post(&url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .send_json(AddCommentBody { body })
        })?;
        expect_success(response, "add comment")
    }

    /// Retries once per 429 response (honoring `Retry-After` if present),
    /// up to [`MAX_RATE_LIMIT_RETRIES`] times, then gives up.
    fn with_retry<F>(&self, mut request: F) -> Result<ureq::http::Response<ureq::Body>>
    where
        F: FnMut() -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    {
        let mut attempt = 0;
        loop {
            let response = request()?;
            if response.status().as_u16() != 429 || attempt >= MAX_RATE_LIMIT_RETRIES {
                return Ok(response);
            }
            let wait = retry_after(&response).unwrap_or(DEFAULT_RETRY_AFTER);
            thread::sleep(wait);
            attempt += 1;
        }
    }
}

fn read_issue(response: ureq::http::Response<ureq::Body>) -> Result<ExternalIssue> {
    let status = response.status();
    let mut response = response;
    if !status.is_success() {
        return Err(MirrorError::ExternalApi(format!("github api returned status {status}")));
    }
    let raw: RawIssue = response
        .body_mut()
        .read_json()
        .map_err(|e| MirrorError::ExternalApi(e.to_string()))?;
    Ok(raw.into())
}

fn expect_success(response: ureq::http::Response<ureq::Body>, what: &str) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(MirrorError::ExternalApi(format!("{what} failed with status {}", response.status())))
    }
}

fn retry_after(response: &ureq::http::Response<ureq::Body>) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Parses the `rel="next"` target out of a GitHub `Link` header, per
/// RFC 8288.
fn next_page_url(response: &ureq::http::Response<ureq::Body>) -> Option<String> {
    let link = response.headers().get("Link")?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let part = part.trim();
        let (url_part, rel_part) = part.split_once(';')?;
        if rel_part.trim() != r#"rel="next""# {
            return None;
        }
        let url = url_part.trim().trim_start_matches('<').trim_end_matches('>');
        Some(url.to_string())
    })
}

fn urlencode(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for byte in label.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencode_escapes_spaces_and_slashes() {
        assert_eq!(urlencode("in progress"), "in%20progress");
        assert_eq!(urlencode("a/b"), "a%2Fb");
        assert_eq!(urlencode("needs-triage"), "needs-triage");
    }
}
