use super::resource_path;
use crate::client::{Client, Response};
use crate::error::QontoError;
use crate::http::Transport;
use crate::models::{Transaction, TransactionsOptions};
use log::debug;
use reqwest::Method;
use serde::Deserialize;

const TRANSACTIONS_PATH: &str = "transactions";

#[derive(Deserialize)]
struct TransactionsRoot {
    transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
struct TransactionRoot {
    transaction: Transaction,
}

pub struct Transactions<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Transactions<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    /// List transactions of one bank account. Pagination is reported in
    /// `Response::meta`.
    pub async fn list(
        self,
        options: &TransactionsOptions,
    ) -> Result<(Vec<Transaction>, Response), QontoError> {
        if options.slug.is_empty() || options.iban.is_empty() {
            return Err(QontoError::InvalidParameter(
                "transactions are listed per organization slug and iban",
            ));
        }
        debug!("Listing transactions for account {}", options.slug);
        let (root, response) = self
            .client
            .fetch::<TransactionsRoot, _>(Method::GET, TRANSACTIONS_PATH, Some(options))
            .await?;
        Ok((root.transactions, response))
    }

    /// Fetch one transaction. The body is expected as
    /// `{"transaction": {...}}`, like the other single-resource endpoints.
    pub async fn get(self, id: &str) -> Result<(Transaction, Response), QontoError> {
        let path = resource_path(TRANSACTIONS_PATH, id, "transaction id must not be empty")?;
        debug!("Fetching transaction {}", id);
        let (root, mut response) = self
            .client
            .fetch::<TransactionRoot, ()>(Method::GET, &path, None)
            .await?;
        response.meta = None;
        Ok((root.transaction, response))
    }
}
