use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Writes the compact JSON form of a record.
fn write_json<T: Serialize>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&json)
}

macro_rules! display_as_json {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write_json(self, f)
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub slug: String,
    pub bank_accounts: Vec<BankAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slug: String,
    pub iban: String,
    pub bic: String,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub balance_cents: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub authorized_balance: Decimal,
    pub authorized_balance_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSide {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Reversed,
    Declined,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Transfer,
    Card,
    DirectDebit,
    Income,
    QontoFee,
    Cheque,
    Recall,
    SwiftIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionSortBy {
    #[serde(rename = "settled_at:asc")]
    SettledAtAsc,
    #[serde(rename = "settled_at:desc")]
    SettledAtDesc,
    #[serde(rename = "updated_at:asc")]
    UpdatedAtAsc,
    #[serde(rename = "updated_at:desc")]
    UpdatedAtDesc,
}

/// A single bank transaction.
///
/// Enumerated attributes (`side`, `status`, `operation_type`) are kept as the
/// raw wire strings so values added by the API later still decode; use the
/// typed accessors to interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub amount_cents: i64,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub local_amount: Decimal,
    pub local_amount_cents: i64,
    pub side: String,
    pub operation_type: String,
    pub currency: String,
    pub local_currency: String,
    pub label: String,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
    pub emitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_amount: Option<Decimal>,
    #[serde(default)]
    pub vat_amount_cents: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_rate: Option<Decimal>,
    #[serde(default)]
    pub initiator_id: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub attachment_lost: bool,
    #[serde(default)]
    pub attachment_required: bool,
}

impl Transaction {
    pub fn side(&self) -> Option<TransactionSide> {
        parse_wire_enum(&self.side)
    }

    pub fn status(&self) -> Option<TransactionStatus> {
        parse_wire_enum(&self.status)
    }

    pub fn operation_type(&self) -> Option<OperationType> {
        parse_wire_enum(&self.operation_type)
    }
}

fn parse_wire_enum<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_owned())).ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    /// `None` for top level labels.
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub file_name: String,
    /// Size in bytes, as the decimal string the API returns.
    pub file_size: String,
    pub file_content_type: String,
    /// Temporary download link.
    pub url: String,
}

display_as_json!(Organization, BankAccount, Transaction, Membership, Label, Attachment);

/// Filters for listing transactions. `slug` and `iban` are always sent;
/// everything else only when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionsOptions {
    pub slug: String,
    pub iban: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<TransactionSide>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operation_type: Vec<OperationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<TransactionSortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
}

impl TransactionsOptions {
    pub fn new(slug: impl Into<String>, iban: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            iban: iban.into(),
            ..Default::default()
        }
    }
}

/// Page selection for the plain list endpoints (memberships, labels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
}

impl PageOptions {
    pub fn page(current_page: u64, per_page: u64) -> Self {
        Self {
            current_page: Some(current_page),
            per_page: Some(per_page),
        }
    }
}
