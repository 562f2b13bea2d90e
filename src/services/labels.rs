use crate::client::{Client, Response};
use crate::error::QontoError;
use crate::http::Transport;
use crate::models::{Label, PageOptions};
use reqwest::Method;
use serde::Deserialize;

const LABELS_PATH: &str = "labels";

#[derive(Deserialize)]
struct LabelsRoot {
    labels: Vec<Label>,
}

pub struct Labels<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Labels<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub async fn list(self, options: &PageOptions) -> Result<(Vec<Label>, Response), QontoError> {
        let (root, response) = self
            .client
            .fetch::<LabelsRoot, _>(Method::GET, LABELS_PATH, Some(options))
            .await?;
        Ok((root.labels, response))
    }
}
