use std::path::Path;

use crate::transforms::TransformKind;

/// How a replace-mode target is emptied before the new snapshot is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Clear the values of the target range only.
    Range,
    /// Clear every cell value on the sheet with this id.
    Sheet { sheet_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Replace(ClearScope),
}

impl WriteMode {
    pub fn label(&self) -> &'static str {
        match self {
            WriteMode::Append => "append",
            WriteMode::Replace(ClearScope::Range) => "replace (range)",
            WriteMode::Replace(ClearScope::Sheet { .. }) => "replace (sheet)",
        }
    }
}

/// One destination for one output slot of a transform.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub slot: &'static str,
    /// Destination key, resolved to a spreadsheet id through settings.
    pub destination: &'static str,
    pub range: &'static str,
    pub mode: WriteMode,
    /// Publish every cell as text.
    pub text_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// File stem as it appears on the source, without extension.
    pub file: &'static str,
    pub transform: TransformKind,
    /// Leading metadata rows before the header.
    pub skip_rows: usize,
    pub targets: &'static [Target],
}

const SHEET_ZERO: WriteMode = WriteMode::Replace(ClearScope::Sheet { sheet_id: 0 });

const fn append(destination: &'static str, range: &'static str) -> Target {
    Target {
        slot: "detail",
        destination,
        range,
        mode: WriteMode::Append,
        text_only: false,
    }
}

const fn snapshot(destination: &'static str) -> Target {
    Target {
        slot: "detail",
        destination,
        range: "Sheet1!A1",
        mode: SHEET_ZERO,
        text_only: false,
    }
}

const fn slot(slot: &'static str, target: Target) -> Target {
    Target { slot, ..target }
}

const fn text_only(target: Target) -> Target {
    Target {
        text_only: true,
        ..target
    }
}

const fn route(file: &'static str, transform: TransformKind, targets: &'static [Target]) -> Route {
    Route {
        file,
        transform,
        skip_rows: 1,
        targets,
    }
}

pub const ROUTES: &[Route] = &[
    route(
        "01_ORD_OPEN_ALL_RSL",
        TransformKind::OpenBacklogAging,
        &[append("ord_open_all_rsl", "Sheet1!A1:AS1")],
    ),
    route(
        "06_RPLN_OPEN",
        TransformKind::OpenOrderAging,
        &[append("rpln_open", "Sheet1!A1:AF1")],
    ),
    route(
        "Incomplete_RSL_Transfer",
        TransformKind::OpenOrderAging,
        &[append("incomplete_rsl_transfer", "Sheet1!A1:AW1")],
    ),
    route(
        "02_CS_MOL",
        TransformKind::CentralReturnAging,
        &[append("cs_mol", "Sheet1!A1:Z1")],
    ),
    route(
        "02_OSL_TSL_MOL",
        TransformKind::FieldReturnAging,
        &[append("osl_tsl_mol", "Sheet1!A1:AJ1")],
    ),
    route(
        "08_OPEN_RPLN_NEW_PUTAWAY",
        TransformKind::PutawayAging,
        &[
            slot("mol", append("putaway_mol", "Sheet1!A1:AB1")),
            slot("new", append("putaway_new", "Sheet1!A1:AB1")),
        ],
    ),
    route(
        "01_ORD_CLOSED_RSL",
        TransformKind::ClosedOrderAging,
        &[append("ord_closed_rsl", "Sheet1!A1:AP1")],
    ),
    route(
        "01_ORD_ALL_RSL",
        TransformKind::PassThrough,
        &[append("ord_all_rsl", "Sheet1!A1:AQ1")],
    ),
    route(
        "01_ORD_ALL_CS",
        TransformKind::PassThrough,
        &[append("ord_all_cs", "Sheet1!A1:Z1")],
    ),
    route(
        "01_ORD_ALL_CS_CANCELLED",
        TransformKind::PassThrough,
        &[append("ord_all_cs_cancelled", "Sheet1!A1:Z1")],
    ),
    route(
        "01_ORD_CANCEL_RSL",
        TransformKind::PassThrough,
        &[append("ord_cancel_rsl", "Sheet1!A1:AO1")],
    ),
    route(
        "01_ORD_CS_NMS_CLOSED",
        TransformKind::PassThrough,
        &[append("ord_cs_nms_closed", "Sheet1!A1:U1")],
    ),
    route(
        "06_RPLN_DUE",
        TransformKind::PassThrough,
        &[append("rpln_due", "Sheet1!A1:AI1")],
    ),
    route(
        "OSL_TSL_Live_Sites",
        TransformKind::PassThrough,
        &[snapshot("osl_tsl_live_sites")],
    ),
    route(
        "RSL_Planning_Rpt",
        TransformKind::OptimalStatus,
        &[
            slot("trend", append("rsl_optimal_trend", "Sheet1!A1:D1")),
            snapshot("rsl_planning"),
        ],
    ),
    route(
        "Zero_Stock",
        TransformKind::ZeroStock,
        &[
            slot("with_orders", append("zero_stock_trend", "With Orders!A1:Q1")),
            slot("no_orders", append("zero_stock_trend", "No Orders!A1:P1")),
            snapshot("zero_stock"),
        ],
    ),
    route(
        "AVP_Report_Weekly",
        TransformKind::PassThrough,
        &[text_only(snapshot("avp_report_weekly"))],
    ),
    Route {
        file: "NMS_Call_log",
        transform: TransformKind::PassThrough,
        skip_rows: 0,
        targets: &[text_only(snapshot("nms_call_log"))],
    },
];

/// Look up the route for a source file by its stem, so `.xlsx` and `.csv`
/// exports of the same report share one entry.
pub fn route_for(file_name: &str) -> Option<&'static Route> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    ROUTES.iter().find(|r| r.file == stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_route_for_matches_stem() {
        let r = route_for("06_RPLN_OPEN.xlsx").unwrap();
        assert_eq!(r.transform, TransformKind::OpenOrderAging);
        assert_eq!(route_for("06_RPLN_OPEN.csv").unwrap().file, "06_RPLN_OPEN");
        assert!(route_for("06_rpln_open.xlsx").is_none());
        assert!(route_for("Unknown_Report.xlsx").is_none());
    }

    #[test]
    fn test_route_files_are_unique() {
        let mut seen = HashSet::new();
        for r in ROUTES {
            assert!(seen.insert(r.file), "duplicate route {}", r.file);
        }
        assert_eq!(ROUTES.len(), 18);
    }

    #[test]
    fn test_every_target_slot_is_produced() {
        for r in ROUTES {
            for t in r.targets {
                assert!(
                    r.transform.slots().contains(&t.slot),
                    "{} routes slot {} that {} never produces",
                    r.file,
                    t.slot,
                    r.transform.key()
                );
            }
        }
    }

    #[test]
    fn test_only_call_log_keeps_first_row() {
        for r in ROUTES {
            let expected = if r.file == "NMS_Call_log" { 0 } else { 1 };
            assert_eq!(r.skip_rows, expected, "{}", r.file);
        }
    }

    #[test]
    fn test_putaway_routes_to_two_destinations() {
        let r = route_for("08_OPEN_RPLN_NEW_PUTAWAY.xlsx").unwrap();
        let dests: Vec<_> = r.targets.iter().map(|t| t.destination).collect();
        assert_eq!(dests, vec!["putaway_mol", "putaway_new"]);
    }

    #[test]
    fn test_snapshots_replace_whole_sheet() {
        let r = route_for("Zero_Stock.xlsx").unwrap();
        let detail = r.targets.iter().find(|t| t.slot == "detail").unwrap();
        assert_eq!(detail.mode, WriteMode::Replace(ClearScope::Sheet { sheet_id: 0 }));
        assert!(r
            .targets
            .iter()
            .filter(|t| t.slot != "detail")
            .all(|t| t.mode == WriteMode::Append));
    }
}
