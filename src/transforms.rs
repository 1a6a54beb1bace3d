use std::cmp::Ordering;

use tracing::debug;

use crate::calendar::aging;
use crate::categorizer::{self, categorize, Buckets};
use crate::dates::{format_date, parse_date};
use crate::models::{Cell, Output, RunContext, Table, TrendAggregate};

pub const WEEK_NUMBER: &str = "Week_Number";
pub const BUSINESS_DAYS_AGING: &str = "Business_Days_Aging";
pub const AGING_CATEGORY: &str = "Aging_Category";
pub const OPTIMAL_STATUS: &str = "Optimal Status";
pub const OPTIMAL_AT_ZERO: &str = "Optimal at Zero";

pub const AT_OPTIMAL: &str = "At Optimal";
pub const BELOW_OPTIMAL: &str = "Below Optimal";
pub const ABOVE_OPTIMAL: &str = "Above Optimal";

/// Columns kept in the optimal-stock detail snapshot. The full extract
/// (~170K rows) does not fit the destination's cell ceiling.
const OPTIMAL_COLUMNS: &[&str] = &[
    "UNIT",
    "DESCRIPTION",
    "CUSTOMER CODE",
    "STOCK_LOC_ID",
    "STATE",
    "BOH",
    "OPTIMAL_KEEP",
    "TWO_YR_USAGE",
    OPTIMAL_STATUS,
    OPTIMAL_AT_ZERO,
];

const CLOSED_ORDER_DATES: &[&str] = &[
    "ORD_DATE",
    "ORDER_MODIFIED_DATE",
    "BORROWED_DATE",
    "PENDING_RETURN_DATE",
    "FINALIZE_DATE",
    "RETURN_DATE",
    "REPLEN_DATE",
    "RMS_CREATE_DATE",
    "RMS_SHIP_TIME",
    "RMS_RECV_TIME",
    "NMS_SHIP_TIME",
];

const BACKLOG_STATUSES: &[&str] = &["B", "O", "PR"];

// ---------------------------------------------------------------------------
// Transform kinds: one variant per report family
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    OptimalStatus,
    OpenOrderAging,
    OpenBacklogAging,
    CentralReturnAging,
    FieldReturnAging,
    PutawayAging,
    ClosedOrderAging,
    PassThrough,
    ZeroStock,
}

impl TransformKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::OptimalStatus => "optimal_status",
            Self::OpenOrderAging => "open_order_aging",
            Self::OpenBacklogAging => "open_backlog_aging",
            Self::CentralReturnAging => "central_return_aging",
            Self::FieldReturnAging => "field_return_aging",
            Self::PutawayAging => "putaway_aging",
            Self::ClosedOrderAging => "closed_order_aging",
            Self::PassThrough => "pass_through",
            Self::ZeroStock => "zero_stock",
        }
    }

    /// Output slots this transform produces, in order.
    pub fn slots(&self) -> &'static [&'static str] {
        match self {
            Self::OptimalStatus => &["detail", "trend"],
            Self::PutawayAging => &["mol", "new"],
            Self::ZeroStock => &["detail", "no_orders", "with_orders"],
            _ => &["detail"],
        }
    }

    pub fn apply(&self, data: &Table, ctx: &RunContext) -> Vec<Output> {
        let outputs = match self {
            Self::OptimalStatus => optimal_status(data, ctx),
            Self::OpenOrderAging => vec![Output::new(
                "detail",
                aged(data.clone(), "ORD_DATE", &categorizer::OPEN_ORDER, ctx),
            )],
            Self::OpenBacklogAging => vec![Output::new(
                "detail",
                aged(open_backlog(data), "ORD_DATE", &categorizer::BACKLOG, ctx),
            )],
            Self::CentralReturnAging => {
                let shipped = data.filter(|t, r| t.cell(r, "STATUS").eq_code("S"));
                vec![Output::new(
                    "detail",
                    aged(shipped, "SHIP_TIME", &categorizer::CENTRAL_RETURN, ctx),
                )]
            }
            Self::FieldReturnAging => vec![Output::new(
                "detail",
                aged(data.clone(), "FINALIZE_DATE", &categorizer::FIELD_RETURN, ctx),
            )],
            Self::PutawayAging => putaway(data, ctx),
            Self::ClosedOrderAging => vec![Output::new("detail", closed_orders(data, ctx))],
            Self::PassThrough => vec![Output::new("detail", pass_through(data, ctx))],
            Self::ZeroStock => zero_stock(data, ctx),
        };
        for o in &outputs {
            debug!(transform = self.key(), slot = o.slot, rows = o.table.len(), "shaped");
        }
        outputs
    }
}

pub const ALL_TRANSFORMS: &[TransformKind] = &[
    TransformKind::OptimalStatus,
    TransformKind::OpenOrderAging,
    TransformKind::OpenBacklogAging,
    TransformKind::CentralReturnAging,
    TransformKind::FieldReturnAging,
    TransformKind::PutawayAging,
    TransformKind::ClosedOrderAging,
    TransformKind::PassThrough,
    TransformKind::ZeroStock,
];

pub fn get_by_key(key: &str) -> Option<TransformKind> {
    ALL_TRANSFORMS.iter().find(|t| t.key() == key).copied()
}

// ---------------------------------------------------------------------------
// Shared shaping steps
// ---------------------------------------------------------------------------

fn stamp_week(data: &mut Table, ctx: &RunContext) {
    let label = ctx.week_label();
    let values = vec![Cell::Text(label); data.len()];
    data.set_column(WEEK_NUMBER, values);
}

fn date_cell(date: Option<chrono::NaiveDate>) -> Cell {
    match date {
        Some(_) => Cell::Text(format_date(date)),
        None => Cell::Empty,
    }
}

/// Parse a date column and rewrite it in display format. Absent columns are
/// left absent and read as all-missing.
fn normalize_dates(data: &mut Table, column: &str) -> Vec<Option<chrono::NaiveDate>> {
    let parsed: Vec<_> = data.column(column).iter().map(parse_date).collect();
    if data.column_index(column).is_some() {
        data.set_column(column, parsed.iter().copied().map(date_cell).collect());
    }
    parsed
}

fn set_aging(data: &mut Table, agings: &[Option<i64>], buckets: &Buckets) {
    data.set_column(
        BUSINESS_DAYS_AGING,
        agings.iter().copied().map(Cell::from).collect(),
    );
    data.set_column(
        AGING_CATEGORY,
        agings
            .iter()
            .map(|a| Cell::text(categorize(*a, buckets)))
            .collect(),
    );
}

/// Aging anchored at `anchor` and run-date "today".
fn aged(mut data: Table, anchor: &str, buckets: &Buckets, ctx: &RunContext) -> Table {
    let starts = normalize_dates(&mut data, anchor);
    let agings: Vec<_> = starts.iter().map(|s| aging(*s, Some(ctx.today))).collect();
    set_aging(&mut data, &agings, buckets);
    stamp_week(&mut data, ctx);
    data
}

// ---------------------------------------------------------------------------
// Report transforms
// ---------------------------------------------------------------------------

fn optimal_status(data: &Table, ctx: &RunContext) -> Vec<Output> {
    let mut data = data.clone();
    let mut trend = TrendAggregate::new(ctx.week_label()).with_labels(&[
        AT_OPTIMAL,
        BELOW_OPTIMAL,
        ABOVE_OPTIMAL,
    ]);

    let boh = data.column("BOH");
    let optimal = data.column("OPTIMAL_KEEP");
    let mut statuses = Vec::with_capacity(data.len());
    let mut at_zero = Vec::with_capacity(data.len());
    for (on_hand, keep) in boh.iter().zip(&optimal) {
        let keep = keep.as_number();
        let status = optimal_label(keep, on_hand.as_number());
        trend.add(status);
        statuses.push(Cell::text(status));
        at_zero.push(Cell::text(if keep == Some(0.0) { "Yes" } else { "No" }));
    }
    data.set_column(OPTIMAL_STATUS, statuses);
    data.set_column(OPTIMAL_AT_ZERO, at_zero);
    stamp_week(&mut data, ctx);

    vec![
        Output::new("detail", data.select(OPTIMAL_COLUMNS)),
        Output::new("trend", trend.into_table()),
    ]
}

/// Compares the optimal keep level against on-hand stock. An unreadable
/// quantity compares as neither equal nor greater and lands in "Above".
pub fn optimal_label(optimal: Option<f64>, on_hand: Option<f64>) -> &'static str {
    let ord = match (optimal, on_hand) {
        (Some(o), Some(b)) => o.partial_cmp(&b),
        _ => None,
    };
    match ord {
        Some(Ordering::Equal) => AT_OPTIMAL,
        Some(Ordering::Greater) => BELOW_OPTIMAL,
        _ => ABOVE_OPTIMAL,
    }
}

fn open_backlog(data: &Table) -> Table {
    data.filter(|t, r| {
        t.cell(r, "ORD_TYPE").eq_code("MOL")
            && BACKLOG_STATUSES
                .iter()
                .any(|s| t.cell(r, "ORD_STATUS").eq_code(s))
    })
}

fn putaway(data: &Table, ctx: &RunContext) -> Vec<Output> {
    let (new, mol) = data.partition(|t, r| t.cell(r, "ORD_TYPE").eq_code("NEW"));
    vec![
        Output::new("mol", aged(mol, "SHIP_TIME", &categorizer::PUTAWAY, ctx)),
        Output::new("new", aged(new, "SHIP_TIME", &categorizer::PUTAWAY, ctx)),
    ]
}

fn closed_orders(data: &Table, ctx: &RunContext) -> Table {
    let mut data = data.clone();
    let mut ord_date = Vec::new();
    let mut replen_date = Vec::new();
    for column in CLOSED_ORDER_DATES {
        let parsed = normalize_dates(&mut data, column);
        match *column {
            "ORD_DATE" => ord_date = parsed,
            "REPLEN_DATE" => replen_date = parsed,
            _ => {}
        }
    }
    stamp_week(&mut data, ctx);
    let agings: Vec<_> = ord_date
        .iter()
        .zip(&replen_date)
        .map(|(start, end)| aging(*start, *end))
        .collect();
    set_aging(&mut data, &agings, &categorizer::BACKLOG);
    data
}

fn pass_through(data: &Table, ctx: &RunContext) -> Table {
    let mut data = data.clone();
    stamp_week(&mut data, ctx);
    data
}

fn zero_stock(data: &Table, ctx: &RunContext) -> Vec<Output> {
    let mut data = data.clone();
    stamp_week(&mut data, ctx);

    // Every state in the extract gets a with-orders column, zero when it
    // has no referenced rows, so appended weeks stay column-aligned.
    let states: Vec<String> = data
        .rows
        .iter()
        .map(|r| data.cell(r, "STATE"))
        .filter(|c| !c.is_missing())
        .map(|c| c.display().trim().to_string())
        .collect();
    let labels: Vec<&str> = states.iter().map(String::as_str).collect();

    let mut no_orders = TrendAggregate::new(ctx.week_label());
    let mut with_orders = TrendAggregate::new(ctx.week_label()).with_labels(&labels);
    for row in &data.rows {
        let state = data.cell(row, "STATE");
        if state.is_missing() {
            continue;
        }
        let state = state.display();
        if data.cell(row, "ORDER_REFERENCE").is_missing() {
            no_orders.add(state.trim());
        } else {
            with_orders.add(state.trim());
        }
    }

    vec![
        Output::new("detail", data),
        Output::new("no_orders", no_orders.into_table()),
        Output::new("with_orders", with_orders.into_table()),
    ]
}
