use std::collections::HashMap;

use tracing::{debug, info};

use super::types::{BondCandidate, CashFlowSchedule, LadderPosition, MatchResult, Period};

/// Candidates are taken strictly in input order, so earlier candidates claim
/// a period's unmet amount first.
pub fn match_ladder(schedule: &CashFlowSchedule, candidates: &[BondCandidate]) -> MatchResult {
    let mut unmet = schedule.targets.clone();
    let index_by_period = period_index(schedule);
    let final_period = schedule.final_period();
    let mut positions = Vec::with_capacity(candidates.len());

    for (n, candidate) in candidates.iter().enumerate() {
        let Some(&idx) = index_by_period.get(&candidate.maturity_period) else {
            debug!(
                candidate = n,
                maturity = candidate.maturity_period,
                "no scheduled period for candidate maturity"
            );
            continue;
        };

        let flow = candidate.maturity_flow(Some(candidate.maturity_period) == final_period);
        if flow <= 0.0 {
            debug!(candidate = n, "candidate pays nothing at this rung");
            continue;
        }

        let quantity = (unmet[idx] / flow).min(1.0);
        if quantity > 0.0 {
            positions.push(LadderPosition {
                yield_rate: candidate.yield_rate,
                maturity_period: candidate.maturity_period,
                face_value: candidate.face_value,
                quantity,
            });
            unmet[idx] = (unmet[idx] - quantity * flow).max(0.0);
            debug!(
                candidate = n,
                period = candidate.maturity_period,
                quantity,
                remaining = unmet[idx],
                "allocated candidate"
            );
        }
    }

    info!(
        periods = schedule.len(),
        candidates = candidates.len(),
        positions = positions.len(),
        "ladder matched"
    );

    MatchResult {
        positions,
        leftover: unmet,
    }
}

// First index wins for repeated periods.
fn period_index(schedule: &CashFlowSchedule) -> HashMap<Period, usize> {
    let mut index = HashMap::with_capacity(schedule.len());
    for (idx, &period) in schedule.periods.iter().enumerate() {
        index.entry(period).or_insert(idx);
    }
    index
}
