use super::error::LadderError;
use super::ladder::match_ladder;
use super::summary::{period_rows, summarize};
use super::types::{LadderReport, LadderRequest};
use super::validate::{RawLadderInput, normalize};

pub fn build_report(request: &LadderRequest) -> LadderReport {
    let result = match_ladder(&request.schedule, &request.candidates);
    let summary = summarize(&request.schedule, &result);
    let periods = period_rows(&request.schedule, &result);
    LadderReport {
        positions: result.positions,
        leftover: result.leftover,
        summary,
        periods,
    }
}

pub fn run_ladder(raw: &RawLadderInput) -> Result<LadderReport, LadderError> {
    let request = normalize(raw)?;
    Ok(build_report(&request))
}
