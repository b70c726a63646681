//! Blocking entities.
//!
//! Three tables hold date holds (direct bookings, imported external blocks,
//! manual admin blocks) but the overlap algorithm sees exactly one shape: a
//! half-open range plus a tagged source.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::calendar;

/// One date hold on a property, whatever its origin.
#[derive(Debug, Clone, Serialize)]
pub struct DateBlock {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: BlockKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// A pending or confirmed direct booking
    Booking { id: Uuid },
    /// A hold imported from an external calendar
    External { provider: String },
    /// An administrator-created hold
    Manual { reason: Option<String> },
}

impl DateBlock {
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        calendar::ranges_overlap(self.start_date, self.end_date, start, end)
    }
}

/// Raw row of the UNION ALL blocking query; folded into [`DateBlock`].
#[derive(Debug, FromRow)]
pub struct BlockRow {
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ref_id: Option<Uuid>,
    pub detail: Option<String>,
}

impl BlockRow {
    pub fn into_block(self) -> DateBlock {
        let kind = match self.kind.as_str() {
            "booking" => BlockKind::Booking {
                // the UNION arm selects the booking id as ref_id
                id: self.ref_id.unwrap_or_default(),
            },
            "external" => BlockKind::External {
                provider: self.detail.unwrap_or_default(),
            },
            _ => BlockKind::Manual {
                reason: self.detail,
            },
        };
        DateBlock {
            start_date: self.start_date,
            end_date: self.end_date,
            kind,
        }
    }
}
