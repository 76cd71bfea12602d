//! Aggregate listing of pickup points
//!
//! The storage engine returns one flat row per (pickup point, reception,
//! product) combination produced by two LEFT JOINs. [`fold_rows`] nests
//! those rows back into pickup point → receptions → products.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::models::{PickupPoint, PickupPointSummary, Product, Reception, ReceptionStatus, ReceptionWithProducts};
use uuid::Uuid;

/// Default page size for the aggregate listing
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound for the page size
pub const MAX_PAGE_SIZE: i64 = 30;

/// Page and reception time window for the aggregate listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingWindow {
    /// 1-based page number
    pub page: i64,
    pub limit: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl ListingWindow {
    /// Normalizes out-of-range values instead of rejecting them
    pub fn new(
        page: Option<i64>,
        limit: Option<i64>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self {
            page,
            limit,
            start_date: start_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            end_date: end_date.unwrap_or_else(Utc::now),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One row of the pickup point ⟕ reception ⟕ product join
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PickupPointRow {
    pub pvz_id: Uuid,
    pub registration_date: DateTime<Utc>,
    pub city: String,
    pub reception_id: Option<Uuid>,
    pub reception_date: Option<DateTime<Utc>>,
    pub reception_status: Option<ReceptionStatus>,
    pub reception_closed_at: Option<DateTime<Utc>>,
    pub product_id: Option<Uuid>,
    pub product_date: Option<DateTime<Utc>>,
    pub product_type: Option<String>,
}

/// Nest flat join rows, preserving first-occurrence order at every level.
///
/// Rows without a reception contribute only their pickup point; rows
/// without a product contribute only their reception.
pub fn fold_rows<I>(rows: I) -> Vec<PickupPointSummary>
where
    I: IntoIterator<Item = PickupPointRow>,
{
    let mut summaries: Vec<PickupPointSummary> = Vec::new();
    let mut pvz_index: HashMap<Uuid, usize> = HashMap::new();
    let mut reception_index: HashMap<(Uuid, Uuid), usize> = HashMap::new();

    for row in rows {
        let pvz_idx = *pvz_index.entry(row.pvz_id).or_insert_with(|| {
            summaries.push(PickupPointSummary {
                pvz: PickupPoint {
                    id: row.pvz_id,
                    registration_date: row.registration_date,
                    city: row.city.clone(),
                },
                receptions: Vec::new(),
            });
            summaries.len() - 1
        });

        let (Some(reception_id), Some(date_time), Some(status)) =
            (row.reception_id, row.reception_date, row.reception_status)
        else {
            continue;
        };

        let receptions = &mut summaries[pvz_idx].receptions;
        let rec_idx = *reception_index
            .entry((row.pvz_id, reception_id))
            .or_insert_with(|| {
                receptions.push(ReceptionWithProducts {
                    reception: Reception {
                        id: reception_id,
                        date_time,
                        pvz_id: row.pvz_id,
                        status,
                        closed_at: row.reception_closed_at,
                    },
                    products: Vec::new(),
                });
                receptions.len() - 1
            });

        if let (Some(id), Some(date_time), Some(product_type)) =
            (row.product_id, row.product_date, row.product_type)
        {
            receptions[rec_idx].products.push(Product {
                id,
                date_time,
                product_type,
                reception_id,
            });
        }
    }

    summaries
}
