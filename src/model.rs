//! Payload types carried in the response envelope's `data` field.
//!
//! Field names mirror the wire format, including its camelCase/snake_case
//! mix. The service omits fields freely depending on endpoint and account
//! state, so every response struct tolerates missing fields via defaults.

use chrono::NaiveDate;
use serde::Deserialize;

/// Category `type` value for income categories.
pub const CATEGORY_TYPE_INCOME: i64 = 1;
/// Category `type` value for expense categories.
pub const CATEGORY_TYPE_EXPENSE: i64 = 2;

/// The authenticated user, as reported by `/user/info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub icon_package: Vec<String>,
    #[serde(rename = "limitDevice")]
    pub limit_device: i64,
    pub tags: Vec<String>,
    /// Opaque per-client settings blob.
    pub client_setting: serde_json::Value,
    pub purchased: bool,
    #[serde(rename = "subscribeProduct")]
    pub subscribe_product: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
}

/// A user with access to a shared wallet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalletUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
}

/// A wallet as returned by `/wallet/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Wallet {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub currency_id: i64,
    pub owner: String,
    #[serde(rename = "sortIndex")]
    pub sort_index: i64,
    pub transaction_notification: bool,
    pub archived: bool,
    pub account_type: i64,
    pub exclude_total: bool,
    pub icon: String,
    #[serde(rename = "listUser")]
    pub list_user: Vec<WalletUser>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updateAt")]
    pub update_at: String,
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
    /// Per-currency balance entries; shape varies by wallet type.
    pub balance: Vec<serde_json::Value>,
}

/// Parent of a nested category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryParent {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub metadata: String,
}

/// A transaction category as returned by `/category/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub icon: String,
    pub account: String,
    /// Income or expense; see [`CATEGORY_TYPE_INCOME`] and
    /// [`CATEGORY_TYPE_EXPENSE`].
    #[serde(rename = "type")]
    pub kind: i64,
    pub metadata: String,
    pub group: i64,
    pub parent: Option<CategoryParent>,
}

/// Wallet summary embedded in a transaction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub currency_id: i64,
    pub account_type: i64,
    pub icon: String,
}

/// A transaction as returned by `/transaction/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub note: String,
    pub account: AccountSummary,
    pub category: Category,
    pub amount: f64,
    #[serde(rename = "displayDate")]
    pub display_date: String,
    pub remind: i64,
    pub address: String,
    /// The wire format misspells longitude.
    pub longtitude: f64,
    pub latitude: f64,
    pub with: Vec<String>,
    pub campaign: Vec<String>,
    #[serde(rename = "lastEditBy")]
    pub last_edit_by: WalletUser,
    pub exclude_report: bool,
    pub images: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Date window echoed back by `/transaction/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

/// Result page of `/transaction/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionsPage {
    pub daterange: DateRange,
    pub transactions: Vec<Transaction>,
}

/// Acknowledgement returned by `/transaction/add`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTransaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub with: Vec<String>,
    pub account: String,
    pub category: String,
    pub amount: f64,
    pub note: String,
    #[serde(rename = "displayDate")]
    pub display_date: String,
    #[serde(rename = "tokenDevice")]
    pub token_device: String,
}

/// Parameters for creating a transaction.
#[derive(Debug, Clone)]
pub struct TransactionParams {
    /// Wallet the transaction belongs to.
    pub wallet_id: String,
    /// Category; whether this is income or expense follows from the
    /// category's type, not from the call used to create it.
    pub category_id: String,
    /// Decimal amount as a string, e.g. `"125000"` or `"12.50"`. The API
    /// expects a string; this avoids float transmission ambiguity.
    pub amount: String,
    pub note: Option<String>,
    /// Calendar day; no time-of-day or zone survives the round trip.
    pub date: NaiveDate,
}
