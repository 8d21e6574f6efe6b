//! Synchronous client for the reporting gateway.
//!
//! The gateway keeps an indicator catalog and saved widgets locally and
//! proxies lookups and tree data from the upstream statistics service. All
//! calls authenticate with a `user_id` cookie; attach one with
//! [`Client::with_user`] before touching widgets or folders.
//!
//! ### Notes
//! - Lookup ids sometimes arrive as **strings**; the models accept both
//!   string and number and normalize.
//! - GET requests retry briefly on 5xx and transport errors. Mutations are
//!   sent once.
//!
//! Typical usage:
//! ```no_run
//! # use svodka_rs::{Client, models::TreeQuery};
//! let client = Client::default().with_user("42");
//! let indicators = client.indicators()?;
//! let rows = client.tree_data(&TreeQuery {
//!     index_id: indicators[0].id,
//!     period_id: 2,
//!     terms: "741880,741881".into(),
//!     term_id: 741880,
//!     dic_ids: "10179".into(),
//!     ..TreeQuery::default()
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::models::{
    Folder, Indicator, Period, PrimaryMetadata, Row, Segment, TreeQuery, Widget, WidgetDraft,
};
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::COOKIE;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    user_id: Option<String>,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

// Allow -, _, . and , unescaped in query values (comma-joined id lists)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b',');

fn enc(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("svodka_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into(),
            user_id: None,
            http,
        }
    }

    /// Attach the session user; sent as the `user_id` cookie on every call.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn with_cookie(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.user_id {
            Some(id) => req.header(COOKIE, format!("user_id={}", id)),
            None => req,
        }
    }

    // Small retry for transient failures (5xx / network errors)
    fn get_json(&self, url: &str) -> Result<Value> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.with_cookie(self.http.get(url)).send() {
                Ok(r) if r.status().is_success() => {
                    return r.json().context("decode json");
                }
                Ok(r) if r.status().is_server_error() => {
                    debug!("HTTP {} from {}, retrying", r.status(), url);
                }
                Ok(r) => bail!("request failed with HTTP {}", r.status()),
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        warn!("giving up on {}", url);
        bail!("network error: {:?}", last_err);
    }

    // Mutations are sent once; the gateway reports failures as 4xx with a
    // detail message worth surfacing.
    fn send_json(&self, req: RequestBuilder) -> Result<Value> {
        let resp = self.with_cookie(req).send().context("send request")?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            bail!("request failed with HTTP {}: {}", status, detail);
        }
        resp.json().context("decode json")
    }

    /// Indicators available in the gateway catalog.
    pub fn indicators(&self) -> Result<Vec<Indicator>> {
        let url = format!("{}/get_indicators", self.base_url);
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse indicators")
    }

    /// Period types offered for an indicator.
    pub fn periods(&self, index_id: i64) -> Result<Vec<Period>> {
        let url = format!("{}/get_periods?indexId={}", self.base_url, index_id);
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse periods")
    }

    /// Classification options for an indicator/period pair.
    pub fn segments(&self, index_id: i64, period_id: i64) -> Result<Vec<Segment>> {
        let url = format!(
            "{}/get_segments?indexId={}&periodId={}",
            self.base_url, index_id, period_id
        );
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse segments")
    }

    /// Report title and unit of measure for an indicator/period pair.
    pub fn index_attributes(&self, index_id: i64, period_id: i64) -> Result<PrimaryMetadata> {
        let url = format!(
            "{}/get_index_attributes?indexId={}&periodId={}",
            self.base_url, index_id, period_id
        );
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse index attributes")
    }

    /// Rows of the report tree for a fully specified query.
    pub fn tree_data(&self, query: &TreeQuery) -> Result<Vec<Row>> {
        let url = format!(
            "{}/new_get_index_tree_data?p_measure_id={}&p_index_id={}&p_period_id={}&p_terms={}&p_term_id={}&p_dicIds={}&idx={}&p_parent_id={}",
            self.base_url,
            query.measure_id,
            query.index_id,
            query.period_id,
            enc(&query.terms),
            query.term_id,
            enc(&query.dic_ids),
            query.idx,
            enc(&query.parent_id),
        );
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse tree rows")
    }

    /// Save a widget; returns the new widget id.
    pub fn save_widget(&self, draft: &WidgetDraft) -> Result<i64> {
        let url = format!("{}/save-data", self.base_url);
        let v = self
            .send_json(self.http.post(&url).json(draft))
            .with_context(|| format!("POST {}", url))?;
        v.get("data_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow::anyhow!("missing data_id in response"))
    }

    /// Saved widgets for the session user, optionally scoped to one folder.
    pub fn widgets(&self, folder_id: Option<i64>) -> Result<Vec<Widget>> {
        let url = match folder_id {
            Some(id) => format!("{}/get-data?folder_id={}", self.base_url, id),
            None => format!("{}/get-data", self.base_url),
        };
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse widgets")
    }

    /// Delete a saved widget.
    pub fn delete_widget(&self, id: i64) -> Result<()> {
        let url = format!("{}/delete-data/{}", self.base_url, id);
        self.send_json(self.http.delete(&url))
            .with_context(|| format!("DELETE {}", url))?;
        Ok(())
    }

    /// Folders of the session user.
    pub fn folders(&self) -> Result<Vec<Folder>> {
        let url = format!("{}/get-user-folders", self.base_url);
        let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
        serde_json::from_value(v).context("parse folders")
    }

    /// Create a folder.
    pub fn add_folder(&self, name: &str) -> Result<Folder> {
        let url = format!("{}/save-folder", self.base_url);
        let body = serde_json::json!({ "name": name });
        let v = self
            .send_json(self.http.post(&url).json(&body))
            .with_context(|| format!("POST {}", url))?;
        serde_json::from_value(v).context("parse folder")
    }

    /// Rename a folder.
    pub fn rename_folder(&self, id: i64, name: &str) -> Result<Folder> {
        let url = format!("{}/update-folder/{}", self.base_url, id);
        let body = serde_json::json!({ "name": name });
        let v = self
            .send_json(self.http.put(&url).json(&body))
            .with_context(|| format!("PUT {}", url))?;
        serde_json::from_value(v).context("parse folder")
    }

    /// Delete a folder. The gateway refuses while the folder still holds
    /// widgets.
    pub fn delete_folder(&self, id: i64) -> Result<()> {
        let url = format!("{}/delete-folder/{}", self.base_url, id);
        self.send_json(self.http.delete(&url))
            .with_context(|| format!("DELETE {}", url))?;
        Ok(())
    }
}
