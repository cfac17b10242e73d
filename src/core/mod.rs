mod error;
mod ladder;
mod report;
mod summary;
mod types;
mod validate;

pub use error::{LadderError, ValidationError};
pub use ladder::match_ladder;
pub use report::{build_report, run_ladder};
pub use summary::{period_rows, summarize};
pub use types::{
    BondCandidate, CashFlowSchedule, LadderPosition, LadderReport, LadderRequest, LadderSummary,
    MatchResult, Period, PeriodRow,
};
pub use validate::{
    MAX_BOND_SLOTS, ParsedBond, ParsedInput, RawBondSlot, RawLadderInput, normalize,
    parse_raw_input, validate,
};
