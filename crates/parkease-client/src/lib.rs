//! ParkEase Client SDK.
//!
//! Async client for dashboards and kiosks talking to the parkease service.
//! Every call carries the operator's identity token as a bearer header.
//!
//! # Example
//!
//! ```no_run
//! use parkease_client::ParkEaseClient;
//!
//! # async fn example() -> Result<(), parkease_client::ClientError> {
//! let client = ParkEaseClient::new("http://parkease:8080", "operator-id-token")?;
//!
//! let record = client.record_entry("ABC-123").await?;
//! let bill = client.get_bill(&record.id, 0).await?;
//! println!("Due: {}", bill.amount_due);
//!
//! let paid = client.confirm_payment(&record.id, 0).await?;
//! println!("Charged: {}", paid.amount_charged);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, ParkEaseClient};
pub use error::{ClientError, Result};
pub use types::*;
