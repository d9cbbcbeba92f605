//! 餐厅平面图目录
//!
//! 平面图是静态资源：布局由店家后台维护，这里内置两张样例图。
//! 可用性查询返回随机占用状态，真实占用由预订冲突检查保证。

use rand::Rng;
use shared::client::{
    AvailabilityEntry, AvailabilityResponse, FloorSection, FloorTable, Floorplan, TableStatus,
};

pub const MAIN_HALL_ID: &str = "fp-main-hall";
pub const ROOFTOP_ID: &str = "fp-rooftop";

/// 内置平面图目录
pub fn catalog() -> Vec<Floorplan> {
    vec![main_hall(), rooftop()]
}

/// 按 ID 查找平面图
pub fn find(floorplan_id: &str) -> Option<Floorplan> {
    catalog().into_iter().find(|fp| fp.id == floorplan_id)
}

/// 查找桌台显示名，如 "Main Hall · T3"
pub fn find_table_label(floorplan_id: &str, table_id: &str) -> Option<String> {
    let fp = find(floorplan_id)?;
    let table = fp.tables.iter().find(|t| t.id == table_id)?;
    Some(format!("{} · {}", fp.name, table.label))
}

/// 某平面图在给定时段的桌台可用性
///
/// 占用状态是随机演示数据；date/time_slot 仅用于参数校验，
/// 真正的冲突判定在预订创建时执行。
pub fn availability(floorplan_id: &str) -> Option<AvailabilityResponse> {
    let fp = find(floorplan_id)?;
    let mut rng = rand::thread_rng();

    let availability = fp
        .tables
        .iter()
        .map(|t| AvailabilityEntry {
            table_id: t.id.clone(),
            status: if rng.gen_bool(0.3) {
                TableStatus::Reserved
            } else {
                TableStatus::Free
            },
        })
        .collect();

    Some(AvailabilityResponse {
        floorplan_id: fp.id,
        availability,
    })
}

fn main_hall() -> Floorplan {
    Floorplan {
        id: MAIN_HALL_ID.to_string(),
        name: "Main Hall".to_string(),
        sections: vec![
            FloorSection {
                id: "window".to_string(),
                name: "Window".to_string(),
            },
            FloorSection {
                id: "center".to_string(),
                name: "Center".to_string(),
            },
        ],
        tables: vec![
            table("t1", "T1", 40, 40, 2),
            table("t2", "T2", 120, 40, 2),
            table("t3", "T3", 200, 40, 4),
            table("t4", "T4", 40, 140, 4),
            table("t5", "T5", 120, 140, 6),
            table("t6", "T6", 200, 140, 6),
            table("t7", "T7", 120, 240, 8),
        ],
    }
}

fn rooftop() -> Floorplan {
    Floorplan {
        id: ROOFTOP_ID.to_string(),
        name: "Rooftop Lounge".to_string(),
        sections: vec![
            FloorSection {
                id: "bar".to_string(),
                name: "Bar".to_string(),
            },
            FloorSection {
                id: "terrace".to_string(),
                name: "Terrace".to_string(),
            },
        ],
        tables: vec![
            table("r1", "R1", 40, 40, 2),
            table("r2", "R2", 120, 40, 2),
            table("r3", "R3", 200, 40, 4),
            table("r4", "R4", 40, 140, 4),
            table("r5", "R5", 120, 140, 6),
        ],
    }
}

fn table(id: &str, label: &str, x: u32, y: u32, capacity: u32) -> FloorTable {
    FloorTable {
        id: id.to_string(),
        label: label.to_string(),
        x,
        y,
        capacity,
        status: TableStatus::Free,
    }
}
