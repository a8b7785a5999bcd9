//! Initial database migration.
//!
//! Creates all enums, catalog and document tables, the movement ledger,
//! the balance cache, counters, constraints, and triggers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(ITEMS_SQL).await?;
        db.execute_unprepared(WAREHOUSES_SQL).await?;

        // ============================================================
        // PART 3: BALANCES & MOVEMENT LEDGER
        // ============================================================
        db.execute_unprepared(STOCK_BALANCES_SQL).await?;
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 4: DOCUMENTS
        // ============================================================
        db.execute_unprepared(ITEM_ENTRIES_SQL).await?;
        db.execute_unprepared(WITHDRAWALS_SQL).await?;
        db.execute_unprepared(TRANSFERS_SQL).await?;
        db.execute_unprepared(ADJUSTMENTS_SQL).await?;

        // ============================================================
        // PART 5: DOCUMENT COUNTERS
        // ============================================================
        db.execute_unprepared(DOCUMENT_COUNTERS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Movement kinds
CREATE TYPE movement_kind AS ENUM (
    'entry',
    'opening_balance',
    'transfer_in',
    'transfer_out',
    'withdrawal',
    'adjustment',
    'revaluation'
);

-- Costing methods
CREATE TYPE costing_method AS ENUM (
    'weighted_average',
    'fifo',
    'lifo',
    'moving_average',
    'standard_cost',
    'specific_identification'
);

-- Originating document kinds
CREATE TYPE document_kind AS ENUM (
    'item_entry',
    'withdrawal',
    'transfer',
    'adjustment'
);

-- Document statuses
CREATE TYPE entry_status AS ENUM ('draft', 'posted', 'cancelled');
CREATE TYPE withdrawal_status AS ENUM ('draft', 'posted', 'cancelled');
CREATE TYPE transfer_status AS ENUM ('draft', 'completed', 'cancelled');
CREATE TYPE adjustment_status AS ENUM ('draft', 'posted', 'cancelled');
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY,
    code VARCHAR(64) NOT NULL UNIQUE,
    description TEXT NOT NULL,
    unit VARCHAR(32) NOT NULL,
    standard_cost DECIMAL(19, 4) NOT NULL DEFAULT 0,
    costing_method costing_method NOT NULL DEFAULT 'moving_average',
    reorder_level DECIMAL(19, 4),
    min_level DECIMAL(19, 4),
    max_level DECIMAL(19, 4),
    supplier VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT items_standard_cost_non_negative CHECK (standard_cost >= 0)
);
";

const WAREHOUSES_SQL: &str = r"
CREATE TABLE warehouses (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    location VARCHAR(255),
    is_main BOOLEAN NOT NULL DEFAULT FALSE,
    default_costing_method costing_method NOT NULL DEFAULT 'moving_average',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- At most one main warehouse
CREATE UNIQUE INDEX warehouses_single_main ON warehouses (is_main) WHERE is_main;
";

const STOCK_BALANCES_SQL: &str = r"
CREATE TABLE stock_balances (
    id UUID PRIMARY KEY,
    item_id UUID NOT NULL REFERENCES items(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    quantity DECIMAL(19, 4) NOT NULL DEFAULT 0,
    total_value DECIMAL(19, 4) NOT NULL DEFAULT 0,
    avg_unit_cost DECIMAL(19, 6) NOT NULL DEFAULT 0,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT stock_balances_item_warehouse_unique UNIQUE (item_id, warehouse_id),
    CONSTRAINT stock_balances_quantity_non_negative CHECK (quantity >= 0),
    CONSTRAINT stock_balances_value_non_negative CHECK (total_value >= 0)
);

CREATE INDEX stock_balances_warehouse_idx ON stock_balances (warehouse_id);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id UUID PRIMARY KEY,
    item_id UUID NOT NULL REFERENCES items(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    kind movement_kind NOT NULL,
    quantity_delta DECIMAL(19, 4) NOT NULL,
    unit_cost DECIMAL(19, 6) NOT NULL,
    value_delta DECIMAL(19, 4) NOT NULL,
    balance_quantity DECIMAL(19, 4) NOT NULL,
    balance_value DECIMAL(19, 4) NOT NULL,
    balance_version BIGINT NOT NULL,
    costing_method costing_method NOT NULL,
    reference_kind document_kind,
    reference_id UUID,
    note TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- The ledger is strictly ordered per pair
    CONSTRAINT stock_movements_pair_version_unique
        UNIQUE (item_id, warehouse_id, balance_version),
    CONSTRAINT stock_movements_snapshot_non_negative
        CHECK (balance_quantity >= 0 AND balance_value >= 0)
);

CREATE INDEX stock_movements_pair_idx
    ON stock_movements (item_id, warehouse_id, balance_version);
CREATE INDEX stock_movements_reference_idx
    ON stock_movements (reference_kind, reference_id);
CREATE INDEX stock_movements_created_at_idx ON stock_movements (created_at);
";

const ITEM_ENTRIES_SQL: &str = r"
CREATE TABLE item_entries (
    id UUID PRIMARY KEY,
    number VARCHAR(32) NOT NULL UNIQUE,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    supplier VARCHAR(255),
    status entry_status NOT NULL DEFAULT 'draft',
    note TEXT,
    created_by UUID NOT NULL,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE item_entry_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES item_entries(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id),
    quantity DECIMAL(19, 4) NOT NULL,
    unit_cost DECIMAL(19, 6) NOT NULL,

    CONSTRAINT item_entry_lines_quantity_positive CHECK (quantity > 0),
    CONSTRAINT item_entry_lines_cost_non_negative CHECK (unit_cost >= 0)
);

CREATE INDEX item_entry_lines_entry_idx ON item_entry_lines (entry_id);
";

const WITHDRAWALS_SQL: &str = r"
CREATE TABLE withdrawals (
    id UUID PRIMARY KEY,
    number VARCHAR(32) NOT NULL UNIQUE,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    status withdrawal_status NOT NULL DEFAULT 'draft',
    note TEXT,
    created_by UUID NOT NULL,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE withdrawal_lines (
    id UUID PRIMARY KEY,
    withdrawal_id UUID NOT NULL REFERENCES withdrawals(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id),
    quantity DECIMAL(19, 4) NOT NULL,

    CONSTRAINT withdrawal_lines_quantity_positive CHECK (quantity > 0)
);

CREATE INDEX withdrawal_lines_withdrawal_idx ON withdrawal_lines (withdrawal_id);
";

const TRANSFERS_SQL: &str = r"
CREATE TABLE transfers (
    id UUID PRIMARY KEY,
    number VARCHAR(32) NOT NULL UNIQUE,
    source_warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    destination_warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    status transfer_status NOT NULL DEFAULT 'draft',
    note TEXT,
    created_by UUID NOT NULL,
    completed_by UUID,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT transfers_distinct_warehouses
        CHECK (source_warehouse_id <> destination_warehouse_id)
);

CREATE TABLE transfer_lines (
    id UUID PRIMARY KEY,
    transfer_id UUID NOT NULL REFERENCES transfers(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id),
    quantity DECIMAL(19, 4) NOT NULL,

    CONSTRAINT transfer_lines_quantity_positive CHECK (quantity > 0)
);

CREATE INDEX transfer_lines_transfer_idx ON transfer_lines (transfer_id);
";

const ADJUSTMENTS_SQL: &str = r"
CREATE TABLE adjustments (
    id UUID PRIMARY KEY,
    number VARCHAR(32) NOT NULL UNIQUE,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    status adjustment_status NOT NULL DEFAULT 'draft',
    note TEXT,
    created_by UUID NOT NULL,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE adjustment_lines (
    id UUID PRIMARY KEY,
    adjustment_id UUID NOT NULL REFERENCES adjustments(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id),
    system_quantity DECIMAL(19, 4) NOT NULL,
    actual_quantity DECIMAL(19, 4) NOT NULL,
    unit_cost DECIMAL(19, 6) NOT NULL,

    CONSTRAINT adjustment_lines_counts_non_negative
        CHECK (system_quantity >= 0 AND actual_quantity >= 0),
    CONSTRAINT adjustment_lines_cost_non_negative CHECK (unit_cost >= 0)
);

CREATE INDEX adjustment_lines_adjustment_idx ON adjustment_lines (adjustment_id);
";

const DOCUMENT_COUNTERS_SQL: &str = r"
CREATE TABLE document_counters (
    prefix VARCHAR(8) NOT NULL,
    year INTEGER NOT NULL,
    last_value BIGINT NOT NULL DEFAULT 0,

    PRIMARY KEY (prefix, year)
);
";

const TRIGGERS_SQL: &str = r"
-- Keep updated_at current on every row update
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER items_set_updated_at
    BEFORE UPDATE ON items
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER warehouses_set_updated_at
    BEFORE UPDATE ON warehouses
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER stock_balances_set_updated_at
    BEFORE UPDATE ON stock_balances
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER item_entries_set_updated_at
    BEFORE UPDATE ON item_entries
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER withdrawals_set_updated_at
    BEFORE UPDATE ON withdrawals
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER transfers_set_updated_at
    BEFORE UPDATE ON transfers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER adjustments_set_updated_at
    BEFORE UPDATE ON adjustments
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS document_counters CASCADE;
DROP TABLE IF EXISTS adjustment_lines CASCADE;
DROP TABLE IF EXISTS adjustments CASCADE;
DROP TABLE IF EXISTS transfer_lines CASCADE;
DROP TABLE IF EXISTS transfers CASCADE;
DROP TABLE IF EXISTS withdrawal_lines CASCADE;
DROP TABLE IF EXISTS withdrawals CASCADE;
DROP TABLE IF EXISTS item_entry_lines CASCADE;
DROP TABLE IF EXISTS item_entries CASCADE;
DROP TABLE IF EXISTS stock_movements CASCADE;
DROP TABLE IF EXISTS stock_balances CASCADE;
DROP TABLE IF EXISTS warehouses CASCADE;
DROP TABLE IF EXISTS items CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS adjustment_status;
DROP TYPE IF EXISTS transfer_status;
DROP TYPE IF EXISTS withdrawal_status;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS document_kind;
DROP TYPE IF EXISTS costing_method;
DROP TYPE IF EXISTS movement_kind;
";
