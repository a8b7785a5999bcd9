//! Document domain logic.
//!
//! The four document types (goods receipts, withdrawals, transfers,
//! adjustments) are the callers of the valuation core: posting a document
//! turns its lines into movement requests. This module holds their status
//! machines, the document number format, and the pure request builders.

pub mod numbering;
pub mod requests;
pub mod types;

pub use numbering::DocumentNumber;
pub use requests::{
    adjustment_requests, entry_requests, opening_balance_request, transfer_in_requests,
    transfer_out_requests, withdrawal_requests, RequestError,
};
pub use types::{
    AdjustmentLineInput, AdjustmentStatus, EntryLineInput, EntryStatus, PricedTransferLine,
    TransferLineInput, TransferStatus, WithdrawalLineInput, WithdrawalStatus,
};
