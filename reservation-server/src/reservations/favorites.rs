//! 常用桌台聚合
//!
//! 从已完成的预订中统计每张桌台的出现次数，返回最常订的前几张。
//! 纯函数，方便单独测试。

use crate::db::models::Reservation;
use shared::client::FavoriteTable;
use std::collections::BTreeMap;

/// How many favorite tables the list endpoint surfaces
pub const FAVORITES_LIMIT: usize = 2;

struct Tally {
    count: u32,
    floorplan_id: String,
    table_name: Option<String>,
    last_starts_at: i64,
    last_date: String,
    last_time_slot: String,
}

/// Aggregate finished reservations into the favorites list.
///
/// Ordering: count descending, then table id ascending for stable ties.
/// The metadata (name, floorplan, last visit) comes from the most recent
/// finished reservation of each table.
pub fn compute_favorites(finished: &[Reservation]) -> Vec<FavoriteTable> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for r in finished {
        let entry = tallies.entry(r.table_id.as_str()).or_insert_with(|| Tally {
            count: 0,
            floorplan_id: r.floorplan_id.clone(),
            table_name: r.table_name.clone(),
            last_starts_at: r.starts_at,
            last_date: r.date.clone(),
            last_time_slot: r.time_slot.clone(),
        });
        entry.count += 1;
        if r.starts_at >= entry.last_starts_at {
            entry.last_starts_at = r.starts_at;
            entry.floorplan_id = r.floorplan_id.clone();
            entry.table_name = r.table_name.clone();
            entry.last_date = r.date.clone();
            entry.last_time_slot = r.time_slot.clone();
        }
    }

    let mut favorites: Vec<(String, Tally)> = tallies
        .into_iter()
        .map(|(id, tally)| (id.to_string(), tally))
        .collect();

    // BTreeMap already yields table ids ascending, so a stable sort by
    // count keeps the tie order.
    favorites.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    favorites.truncate(FAVORITES_LIMIT);

    favorites
        .into_iter()
        .map(|(table_id, tally)| FavoriteTable {
            table_id,
            count: tally.count,
            table_name: tally.table_name,
            floorplan_id: tally.floorplan_id,
            last_date: tally.last_date,
            last_time_slot: tally.last_time_slot,
        })
        .collect()
}
