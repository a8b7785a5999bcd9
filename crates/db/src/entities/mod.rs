//! `SeaORM` entity definitions.

pub mod adjustment_lines;
pub mod adjustments;
pub mod document_counters;
pub mod item_entries;
pub mod item_entry_lines;
pub mod items;
pub mod sea_orm_active_enums;
pub mod stock_balances;
pub mod stock_movements;
pub mod transfer_lines;
pub mod transfers;
pub mod warehouses;
pub mod withdrawal_lines;
pub mod withdrawals;
