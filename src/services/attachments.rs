use super::resource_path;
use crate::client::{Client, Response};
use crate::error::QontoError;
use crate::http::Transport;
use crate::models::Attachment;
use log::debug;
use reqwest::Method;
use serde::Deserialize;

const ATTACHMENTS_PATH: &str = "attachments";

#[derive(Deserialize)]
struct AttachmentRoot {
    attachment: Attachment,
}

pub struct Attachments<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Attachments<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    /// Fetch attachment details, including its temporary download URL.
    pub async fn get(self, id: &str) -> Result<(Attachment, Response), QontoError> {
        let path = resource_path(ATTACHMENTS_PATH, id, "attachment id must not be empty")?;
        debug!("Fetching attachment {}", id);
        let (root, mut response) = self
            .client
            .fetch::<AttachmentRoot, ()>(Method::GET, &path, None)
            .await?;
        response.meta = None;
        Ok((root.attachment, response))
    }
}
