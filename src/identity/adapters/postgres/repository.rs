//! `PostgreSQL`-backed identity resolver.

use super::schema::{buyers, vendors};
use crate::db::{PgPool, get_conn_with, run_blocking_with};
use crate::identity::{
    domain::{BuyerId, BuyerKey, VendorId, VendorKey},
    ports::{IdentityError, IdentityResolver, IdentityResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Resolves participant keys from the `buyers` and `vendors` tables.
#[derive(Debug, Clone)]
pub struct PostgresIdentityResolver {
    pool: PgPool,
}

impl PostgresIdentityResolver {
    /// Creates a resolver over a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> IdentityResult<T>
    where
        F: FnOnce(&mut PgConnection) -> IdentityResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, IdentityError::backend)?;
                f(&mut connection)
            },
            IdentityError::backend,
        )
        .await
    }
}

#[async_trait]
impl IdentityResolver for PostgresIdentityResolver {
    async fn resolve_buyer_key(&self, id: BuyerId) -> IdentityResult<Option<BuyerKey>> {
        let uuid = id.into_inner();
        self.run_blocking(move |connection| {
            let pk = buyers::table
                .filter(buyers::id.eq(uuid))
                .select(buyers::pk)
                .first::<i64>(connection)
                .optional()
                .map_err(IdentityError::backend)?;
            Ok(pk.map(BuyerKey::new))
        })
        .await
    }

    async fn resolve_vendor_key(&self, id: VendorId) -> IdentityResult<Option<VendorKey>> {
        let uuid = id.into_inner();
        self.run_blocking(move |connection| {
            let pk = vendors::table
                .filter(vendors::id.eq(uuid))
                .select(vendors::pk)
                .first::<i64>(connection)
                .optional()
                .map_err(IdentityError::backend)?;
            Ok(pk.map(VendorKey::new))
        })
        .await
    }
}
