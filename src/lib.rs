//! Client for the Money Lover web API.
//!
//! Exchanges user credentials for a bearer token through the service's
//! two-step login handshake, caches tokens per identity in a local file,
//! inspects token expiry offline, and issues authenticated calls to list
//! wallets, categories, and transactions or to create transactions.
//!
//! Every call is a blocking POST; every response arrives in the same JSON
//! envelope, which is unwrapped into either a typed payload or an
//! [`Error`]. The service is inconsistent about which of two error field
//! pairs it populates, so both are normalized into [`Error::Api`].
//!
//! ```no_run
//! use moneylover_client::{Client, TokenStore};
//!
//! fn main() -> Result<(), moneylover_client::Error> {
//!     let store = TokenStore::open_default()?;
//!     let client = match Client::resume_default(&store) {
//!         Some(client) => client,
//!         None => Client::login("user@example.com", "password")?,
//!     };
//!     for wallet in client.get_wallets()? {
//!         println!("{}  {}", wallet.id, wallet.name);
//!     }
//!     Ok(())
//! }
//! ```

mod transport;

pub mod client;
pub mod envelope;
pub mod error;
pub mod model;
pub mod store;
pub mod token;

pub use client::{fetch_token, Client, Endpoints};
pub use error::{Error, Result};
pub use model::{
    AccountSummary, Category, CategoryParent, DateRange, NewTransaction, Transaction,
    TransactionParams, TransactionsPage, UserInfo, Wallet, WalletUser, CATEGORY_TYPE_EXPENSE,
    CATEGORY_TYPE_INCOME,
};
pub use store::{TokenStore, DEFAULT_IDENTITY};
pub use token::is_token_expired;
