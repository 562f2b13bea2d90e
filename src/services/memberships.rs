use crate::client::{Client, Response};
use crate::error::QontoError;
use crate::http::Transport;
use crate::models::{Membership, PageOptions};
use reqwest::Method;
use serde::Deserialize;

const MEMBERSHIPS_PATH: &str = "memberships";

#[derive(Deserialize)]
struct MembershipsRoot {
    memberships: Vec<Membership>,
}

pub struct Memberships<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Memberships<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub async fn list(
        self,
        options: &PageOptions,
    ) -> Result<(Vec<Membership>, Response), QontoError> {
        let (root, response) = self
            .client
            .fetch::<MembershipsRoot, _>(Method::GET, MEMBERSHIPS_PATH, Some(options))
            .await?;
        Ok((root.memberships, response))
    }
}
