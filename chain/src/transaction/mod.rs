//! # Transaction Model
//!
//! The shape of a Thor transaction, from clause to signed wire bytes:
//!
//! - **types** — [`Clause`], [`BlockRef`], [`TxId`], [`Receipt`]: the data
//!   model shared by the builder, the node client, and the submitter.
//! - **rlp** — the minimal RLP encoder the wire format requires. Encoding
//!   only; the node never sends RLP back.
//! - **builder** — [`TransactionBody`] and its fluent builder.
//! - **signing** — turns a body plus a registrar key into an immutable
//!   [`SignedTransaction`], broadcast exactly once.

pub mod builder;
pub mod rlp;
pub mod signing;
pub mod types;

pub use builder::{TransactionBody, TransactionBuilder};
pub use signing::{sign_transaction, SignedTransaction};
pub use types::{BlockRef, BlockRefError, Clause, Receipt, ReceiptMeta, TxId};
