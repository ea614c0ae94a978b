// Bilateral combination of left/right RSI records
// Outer-joins jumps by ordinal and synthesizes a Combined row with an asymmetry score

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::events::Limb;
use crate::rsi::calculator::RsiRecord;

/// Row kind in the long-format table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    Left,
    Right,
    Combined,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Left => "Left",
            RowKind::Right => "Right",
            RowKind::Combined => "Combined",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "Left" | "left" => Some(RowKind::Left),
            "Right" | "right" => Some(RowKind::Right),
            "Combined" | "combined" => Some(RowKind::Combined),
            _ => None,
        }
    }
}

impl From<Limb> for RowKind {
    fn from(limb: Limb) -> Self {
        match limb {
            Limb::Left => RowKind::Left,
            Limb::Right => RowKind::Right,
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the combined table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub jump: u32,
    pub kind: RowKind,
    pub gct: Option<f64>,
    pub peak_height_flight: Option<f64>,
    pub peak_height_detected: Option<f64>,
    pub rsi_flight: Option<f64>,
    pub rsi_peak: Option<f64>,

    /// Symmetric percent difference of left/right RSI_Peak, Combined rows only
    pub asymmetry_peak_pct: Option<f64>,
}

impl CombinedRecord {
    /// Per-limb row; a limb without this jump gets every field unset
    fn limb_row(jump: u32, kind: RowKind, record: Option<&RsiRecord>) -> Self {
        CombinedRecord {
            jump,
            kind,
            gct: record.and_then(|r| r.gct),
            peak_height_flight: record.and_then(|r| r.peak_height_flight),
            peak_height_detected: record.and_then(|r| r.peak_height_detected),
            rsi_flight: record.and_then(|r| r.rsi_flight),
            rsi_peak: record.and_then(|r| r.rsi_peak),
            asymmetry_peak_pct: None,
        }
    }
}

impl From<&RsiRecord> for CombinedRecord {
    fn from(record: &RsiRecord) -> Self {
        CombinedRecord::limb_row(record.jump, record.limb.into(), Some(record))
    }
}

/// Which reconciliation branch produced the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineStatus {
    /// Neither limb had a validated jump
    NoJumps,

    /// Only this limb had jumps; its rows pass through without Combined rows
    SingleLimb(Limb),

    /// Both limbs had jumps
    Bilateral,
}

/// Long-format bilateral table
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralTable {
    pub rows: Vec<CombinedRecord>,
    pub status: CombineStatus,
}

/// Symmetric percent difference: 2 * |L - R| / (L + R) * 100
/// Unset when either side is unset, both are zero, or the ratio is not finite
pub fn asymmetry_pct(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    let (l, r) = (left?, right?);
    if l.max(r) == 0.0 {
        return None;
    }

    let pct = 2.0 * (l - r).abs() / (l + r) * 100.0;
    pct.is_finite().then_some(pct)
}

/// Mean of the present values
fn nan_mean(values: [Option<f64>; 2]) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Median of the present values
fn median(values: [Option<f64>; 2]) -> Option<f64> {
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }

    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

fn combined_row(jump: u32, left: Option<&RsiRecord>, right: Option<&RsiRecord>) -> CombinedRecord {
    let pick = |f: fn(&RsiRecord) -> Option<f64>| [left.and_then(f), right.and_then(f)];

    CombinedRecord {
        jump,
        kind: RowKind::Combined,
        gct: nan_mean(pick(|r| r.gct)),
        peak_height_flight: nan_mean(pick(|r| r.peak_height_flight)),
        peak_height_detected: nan_mean(pick(|r| r.peak_height_detected)),
        rsi_flight: median(pick(|r| r.rsi_flight)),
        rsi_peak: median(pick(|r| r.rsi_peak)),
        asymmetry_peak_pct: asymmetry_pct(
            left.and_then(|r| r.rsi_peak),
            right.and_then(|r| r.rsi_peak),
        ),
    }
}

/// Reconcile left and right records into Left/Right/Combined rows per jump
///
/// - both empty: empty table
/// - one side empty: the other side's rows pass through, no Combined rows
/// - both present: outer join on jump ordinal
pub fn combine_limbs(left: &[RsiRecord], right: &[RsiRecord]) -> BilateralTable {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => {
            log::warn!("No jumps detected on either limb");
            BilateralTable {
                rows: Vec::new(),
                status: CombineStatus::NoJumps,
            }
        }
        (false, true) | (true, false) => {
            let (present, limb) = if right.is_empty() {
                (left, Limb::Left)
            } else {
                (right, Limb::Right)
            };
            log::warn!("Jumps detected for only one limb ({})", limb);
            BilateralTable {
                rows: present.iter().map(CombinedRecord::from).collect(),
                status: CombineStatus::SingleLimb(limb),
            }
        }
        (false, false) => {
            let mut by_jump: BTreeMap<u32, (Option<&RsiRecord>, Option<&RsiRecord>)> =
                BTreeMap::new();
            for record in left {
                by_jump.entry(record.jump).or_default().0 = Some(record);
            }
            for record in right {
                by_jump.entry(record.jump).or_default().1 = Some(record);
            }

            let mut rows = Vec::with_capacity(by_jump.len() * 3);
            for (jump, (l, r)) in by_jump {
                rows.push(CombinedRecord::limb_row(jump, RowKind::Left, l));
                rows.push(CombinedRecord::limb_row(jump, RowKind::Right, r));
                rows.push(combined_row(jump, l, r));
            }

            BilateralTable {
                rows,
                status: CombineStatus::Bilateral,
            }
        }
    }
}
