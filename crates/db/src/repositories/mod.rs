//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The movement repository is the transaction coordinator:
//! every balance mutation in the system goes through it.

pub mod adjustment;
pub mod document_number;
pub mod item;
pub mod item_entry;
pub mod movement;
pub mod transfer;
pub mod warehouse;
pub mod withdrawal;

pub use adjustment::{
    AdjustmentError, AdjustmentFilter, AdjustmentRepository, AdjustmentWithLines,
    CreateAdjustmentInput, PostedAdjustment,
};
pub use document_number::DocumentNumberRepository;
pub use item::{CreateItemInput, ItemError, ItemFilter, ItemRepository, UpdateItemInput};
pub use item_entry::{
    CreateItemEntryInput, ItemEntryError, ItemEntryFilter, ItemEntryRepository,
    ItemEntryWithLines, PostedItemEntry,
};
pub use movement::{MovementError, MovementRepository};
pub use transfer::{
    CompletedTransfer, CreateTransferInput, TransferError, TransferFilter, TransferRepository,
    TransferWithLines,
};
pub use warehouse::{
    CreateWarehouseInput, UpdateWarehouseInput, WarehouseError, WarehouseRepository,
};
pub use withdrawal::{
    CreateWithdrawalInput, PostedWithdrawal, WithdrawalError, WithdrawalFilter,
    WithdrawalRepository, WithdrawalWithLines,
};
