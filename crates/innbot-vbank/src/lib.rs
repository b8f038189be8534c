//! vbankcenter.ru adapter for the company registry port.
//!
//! Every lookup first resolves the tax ID to the registry's partner UUID via
//! the search endpoint; activities and the extract PDF are then fetched by UUID.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use innbot_core::{
    domain::{ActivityEntry, CompanyInfo, DocumentStream, TaxId},
    errors::Error,
    registry::{Lookup, RegistryProvider},
    Result,
};

#[cfg(test)]
mod test_server;

#[derive(Debug, Default, Deserialize)]
struct SearchPage {
    #[serde(default)]
    content: Vec<SearchRecord>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRecord {
    #[serde(default)]
    inn: String,
    #[serde(default)]
    partner_uuid: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    address: String,
}

#[derive(Debug, Default, Deserialize)]
struct ActivityPage {
    #[serde(default)]
    content: Vec<ActivityRecord>,
}

#[derive(Debug, Deserialize)]
struct ActivityRecord {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
}

#[derive(Clone, Debug)]
pub struct VbankRegistry {
    base_url: String,
    http: reqwest::Client,
}

impl VbankRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("registry http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn search_url(&self, tax_id: &TaxId) -> String {
        format!(
            "{}/filter?page=0&size=20&searchStr={tax_id}&withCounter=true",
            self.base_url
        )
    }

    fn activities_url(&self, uuid: &str, tax_id: &TaxId) -> String {
        format!(
            "{}/type/legal/uuid/{uuid}/activityTypes?page=0&size=100&inn={tax_id}",
            self.base_url
        )
    }

    fn document_url(&self, uuid: &str) -> String {
        format!("{}/type/legal/uuid/{uuid}/pdf", self.base_url)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("registry request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "registry request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self
            .get(url)
            .await?
            .text()
            .await
            .map_err(|e| Error::Transport(format!("registry read error: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Transport(format!("registry decode error: {e}")))
    }

    async fn find_record(&self, tax_id: &TaxId) -> Result<Lookup<SearchRecord>> {
        let page: SearchPage = self.get_json(&self.search_url(tax_id)).await?;
        let found = pick_record(page, tax_id);
        debug!(%tax_id, found = matches!(found, Lookup::Found(_)), "registry search");
        Ok(found)
    }
}

/// The search highlights the matched tax ID as `<em>{id}</em>`. Exactly one
/// such record must be present.
fn pick_record(page: SearchPage, tax_id: &TaxId) -> Lookup<SearchRecord> {
    let highlighted = format!("<em>{tax_id}</em>");
    let mut matches = page.content.into_iter().filter(|r| r.inn == highlighted);
    match (matches.next(), matches.next()) {
        (Some(record), None) => Lookup::Found(record),
        _ => Lookup::NotFound,
    }
}

fn to_activities(page: ActivityPage) -> Vec<ActivityEntry> {
    page.content
        .into_iter()
        .map(|r| ActivityEntry {
            code: r.code,
            activity_type: r.name,
        })
        .collect()
}

#[async_trait]
impl RegistryProvider for VbankRegistry {
    async fn lookup_company(&self, tax_id: &TaxId) -> Result<Lookup<CompanyInfo>> {
        Ok(self.find_record(tax_id).await?.map(|r| CompanyInfo {
            name: r.full_name,
            address: r.address,
        }))
    }

    async fn lookup_activities(&self, tax_id: &TaxId) -> Result<Lookup<Vec<ActivityEntry>>> {
        let record = match self.find_record(tax_id).await? {
            Lookup::Found(r) => r,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let page: ActivityPage = self
            .get_json(&self.activities_url(&record.partner_uuid, tax_id))
            .await?;
        Ok(Lookup::Found(to_activities(page)))
    }

    async fn lookup_document(&self, tax_id: &TaxId) -> Result<Lookup<DocumentStream>> {
        let record = match self.find_record(tax_id).await? {
            Lookup::Found(r) => r,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let bytes = self
            .get(&self.document_url(&record.partner_uuid))
            .await?
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("registry read error: {e}")))?;
        debug!(%tax_id, size = bytes.len(), "registry extract downloaded");
        Ok(Lookup::Found(DocumentStream::from_bytes(bytes.to_vec())))
    }
}
