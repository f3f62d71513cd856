//! # escrowpay-ledger
//!
//! Where the money lives.
//!
//! ## Architecture
//!
//! - **`balance_ledger`**: [`BalanceLedger`], the internal withdrawable balance per user
//! - **`splitter`**: [`split_funding`], ledger share vs. external share of a payment
//! - **`funding`**: [`FundingSource`], one capability over both rails
//! - **`native`**: [`NativeRail`], funds arrive as attached coin value
//! - **`token`**: [`TokenRail`], funds are pulled through an allowance on a [`TokenLedger`]
//! - **`registry`**: [`RoleRegistry`], per-universe operator and fees collector
//! - **`solvency`**: [`SolvencyTracker`], escrow holdings vs. what is owed
//!
//! ## Money flow
//!
//! ```text
//! external account ──debit──▶ escrow ──(ledger credit)──▶ BalanceLedger
//!                                ▲                             │
//!                                └──────── credit ◀── withdraw ┘
//! ```

pub mod balance_ledger;
pub mod funding;
pub mod native;
pub mod registry;
pub mod solvency;
pub mod splitter;
pub mod token;

pub use balance_ledger::BalanceLedger;
pub use funding::{Collection, CollectionRequest, FundingSource};
pub use native::{NativeBank, NativeRail};
pub use registry::RoleRegistry;
pub use solvency::{SolvencyReport, SolvencyTracker};
pub use splitter::{AuctionFundingSplit, FundingSplit, split_funding};
pub use token::{InMemoryToken, TokenLedger, TokenRail};
