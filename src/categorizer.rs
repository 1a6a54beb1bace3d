/// Threshold table mapping a business-day aging to a bucket label.
///
/// `bounds` are `(upper_bound_exclusive, label)` pairs in ascending order.
/// Aging at or above the last bound gets `default`; a missing aging gets
/// `missing`.
#[derive(Debug, Clone, Copy)]
pub struct Buckets {
    pub bounds: &'static [(i64, &'static str)],
    pub default: &'static str,
    pub missing: &'static str,
}

impl Buckets {
    pub const fn with_missing(self, missing: &'static str) -> Self {
        Self {
            bounds: self.bounds,
            default: self.default,
            missing,
        }
    }

    /// Every label this table can produce, in bucket order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<_> = self.bounds.iter().map(|(_, l)| *l).collect();
        labels.push(self.default);
        labels.push(self.missing);
        labels
    }
}

pub const NO_DATE: &str = "No Date";

/// Open replenishments and incomplete transfers.
pub const OPEN_ORDER: Buckets = Buckets {
    bounds: &[(5, "<5"), (10, ">=5"), (20, ">=10"), (40, ">=20")],
    default: ">40",
    missing: NO_DATE,
};

/// Open and closed order backlogs.
pub const BACKLOG: Buckets = Buckets {
    bounds: &[(10, "<10"), (30, "<30"), (60, "<60")],
    default: ">=60",
    missing: NO_DATE,
};

pub const CENTRAL_RETURN: Buckets = BACKLOG.with_missing("Not shipped");
pub const FIELD_RETURN: Buckets = BACKLOG.with_missing("No Finalize Date");
pub const PUTAWAY: Buckets = BACKLOG.with_missing("No shipping Info");

pub fn categorize(aging: Option<i64>, buckets: &Buckets) -> &'static str {
    let Some(days) = aging else {
        return buckets.missing;
    };
    buckets
        .bounds
        .iter()
        .find(|(bound, _)| days < *bound)
        .map(|(_, label)| *label)
        .unwrap_or(buckets.default)
}
