//! Company registry port.

use async_trait::async_trait;

use crate::{
    domain::{ActivityEntry, CompanyInfo, DocumentStream, TaxId},
    Result,
};

/// Outcome of a registry lookup that reached the registry.
///
/// `NotFound` covers both "no company" and "more than one company" for the
/// tax id. Transport failures are `Err` on the surrounding `Result`.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

#[async_trait]
pub trait RegistryProvider: Send + Sync {
    async fn lookup_company(&self, tax_id: &TaxId) -> Result<Lookup<CompanyInfo>>;

    /// Activities in provider order; display ordering is the caller's job.
    async fn lookup_activities(&self, tax_id: &TaxId) -> Result<Lookup<Vec<ActivityEntry>>>;

    async fn lookup_document(&self, tax_id: &TaxId) -> Result<Lookup<DocumentStream>>;
}
