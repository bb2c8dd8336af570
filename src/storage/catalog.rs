// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Merch catalog: item name → price. Read-only to the wallet core.

use std::sync::Arc;

use redb::{ReadableTable, ReadableTableMetadata, TableDefinition};

use super::database::{StoreError, StoreResult, WalletDatabase};
use super::records::MerchItem;

/// Merch: item name → price.
pub(crate) const MERCH: TableDefinition<&str, u64> = TableDefinition::new("merch");

/// Catalog seeded into an empty database.
pub const DEFAULT_CATALOG: &[(&str, u64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

#[derive(Clone)]
pub struct MerchCatalog {
    db: Arc<WalletDatabase>,
}

impl MerchCatalog {
    pub fn new(db: Arc<WalletDatabase>) -> Self {
        Self { db }
    }

    pub fn get(&self, name: &str) -> StoreResult<Option<MerchItem>> {
        let snapshot = self.db.snapshot()?;
        let table = snapshot.txn().open_table(MERCH)?;
        Ok(table.get(name)?.map(|price| MerchItem {
            name: name.to_string(),
            price: price.value(),
        }))
    }

}

impl WalletDatabase {
    /// Seed `items` when the catalog is empty. Returns the number inserted.
    ///
    /// This is the out-of-band catalog loader; the wallet core never calls it.
    /// Every price must be positive; otherwise nothing is written.
    pub fn seed_catalog(&self, items: &[(&str, u64)]) -> StoreResult<usize> {
        if let Some((name, _)) = items.iter().find(|(_, price)| *price == 0) {
            return Err(StoreError::InvalidPrice(name.to_string()));
        }

        let write_txn = self.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(MERCH)?;
            if !table.is_empty()? {
                0
            } else {
                for (name, price) in items {
                    table.insert(*name, *price)?;
                }
                items.len()
            }
        };
        write_txn.commit()?;

        if inserted > 0 {
            tracing::info!(items = inserted, "Merch catalog seeded");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (MerchCatalog, Arc<WalletDatabase>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(WalletDatabase::open_in(dir.path()).unwrap());
        db.seed_catalog(DEFAULT_CATALOG).unwrap();
        (MerchCatalog::new(Arc::clone(&db)), db, dir)
    }

    #[test]
    fn lookup_by_name() {
        let (catalog, _db, _dir) = seeded();
        let shirt = catalog.get("t-shirt").unwrap().unwrap();
        assert_eq!(shirt.price, 80);
        assert!(catalog.get("T-Shirt").unwrap().is_none());
        assert!(catalog.get("nonexistent_item").unwrap().is_none());
    }

    #[test]
    fn seeding_is_idempotent() {
        let (catalog, db, _dir) = seeded();
        assert_eq!(db.seed_catalog(&[("cup", 999)]).unwrap(), 0);
        assert_eq!(catalog.get("cup").unwrap().unwrap().price, 20);
        for (name, price) in DEFAULT_CATALOG {
            assert_eq!(catalog.get(name).unwrap().unwrap().price, *price, "{name}");
        }
    }

    #[test]
    fn zero_price_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = WalletDatabase::open_in(dir.path()).unwrap();
        let err = db.seed_catalog(&[("cup", 20), ("sticker", 0)]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPrice(name) if name == "sticker"));

        let catalog = MerchCatalog::new(Arc::new(db));
        assert!(catalog.get("cup").unwrap().is_none());
    }
}
