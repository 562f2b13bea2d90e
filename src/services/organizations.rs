use super::resource_path;
use crate::client::{Client, Response};
use crate::error::QontoError;
use crate::http::Transport;
use crate::models::Organization;
use log::debug;
use reqwest::Method;
use serde::Deserialize;

const ORGANIZATIONS_PATH: &str = "organizations";

#[derive(Deserialize)]
struct OrganizationRoot {
    organization: Organization,
}

pub struct Organizations<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Organizations<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    /// Fetch an organization and its bank accounts.
    pub async fn get(self, id: &str) -> Result<(Organization, Response), QontoError> {
        let path = resource_path(ORGANIZATIONS_PATH, id, "organization id must not be empty")?;
        debug!("Fetching organization {}", id);
        let (root, mut response) = self
            .client
            .fetch::<OrganizationRoot, ()>(Method::GET, &path, None)
            .await?;
        response.meta = None;
        Ok((root.organization, response))
    }
}
