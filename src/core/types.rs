use serde::Serialize;

pub type Period = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowSchedule {
    pub(crate) periods: Vec<Period>,
    pub(crate) targets: Vec<f64>,
}

impl CashFlowSchedule {
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Last in input order, not the largest. Only this rung repays principal.
    pub fn final_period(&self) -> Option<Period> {
        self.periods.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondCandidate {
    pub yield_rate: f64,
    pub maturity_period: Period,
    pub face_value: f64,
}

impl BondCandidate {
    /// Cash paid by one unit at maturity. Principal is only counted on the
    /// final rung; interim rungs are coupon-only.
    pub fn maturity_flow(&self, is_final_rung: bool) -> f64 {
        let coupon = self.face_value * self.yield_rate;
        if is_final_rung {
            coupon + self.face_value
        } else {
            coupon
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderPosition {
    pub yield_rate: f64,
    pub maturity_period: Period,
    pub face_value: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub positions: Vec<LadderPosition>,
    pub leftover: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LadderRequest {
    pub schedule: CashFlowSchedule,
    pub candidates: Vec<BondCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderSummary {
    pub ladder_size: usize,
    pub total_unmet: f64,
    pub matched: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    pub term: Period,
    pub desired: f64,
    pub matched: f64,
    pub leftover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderReport {
    pub positions: Vec<LadderPosition>,
    pub leftover: Vec<f64>,
    #[serde(flatten)]
    pub summary: LadderSummary,
    pub periods: Vec<PeriodRow>,
}
