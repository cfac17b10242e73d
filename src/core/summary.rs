use super::types::{CashFlowSchedule, LadderSummary, MatchResult, PeriodRow};

pub fn summarize(schedule: &CashFlowSchedule, result: &MatchResult) -> LadderSummary {
    LadderSummary {
        ladder_size: result.positions.len(),
        total_unmet: result.leftover.iter().sum(),
        matched: schedule
            .targets
            .iter()
            .zip(&result.leftover)
            .map(|(target, left)| target - left)
            .collect(),
    }
}

pub fn period_rows(schedule: &CashFlowSchedule, result: &MatchResult) -> Vec<PeriodRow> {
    schedule
        .periods
        .iter()
        .zip(&schedule.targets)
        .zip(&result.leftover)
        .map(|((&term, &desired), &leftover)| PeriodRow {
            term,
            desired,
            matched: desired - leftover,
            leftover,
        })
        .collect()
}

impl LadderSummary {
    pub fn headline(&self) -> [String; 2] {
        [
            format!("Bond Ladder Size: {}", self.ladder_size),
            format!("Unmet Cash Flow: {:.2}", self.total_unmet),
        ]
    }
}
