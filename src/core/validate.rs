use std::num::{ParseFloatError, ParseIntError};

use super::error::{LadderError, ValidationError};
use super::types::{BondCandidate, CashFlowSchedule, LadderRequest, Period};

pub const MAX_BOND_SLOTS: usize = 3;

/// A row with any empty field is unused. Whitespace counts as filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBondSlot {
    pub yield_rate: String,
    pub maturity: String,
    pub face_value: String,
}

impl RawBondSlot {
    pub fn new(yield_rate: &str, maturity: &str, face_value: &str) -> Self {
        Self {
            yield_rate: yield_rate.to_string(),
            maturity: maturity.to_string(),
            face_value: face_value.to_string(),
        }
    }

    /// Anything after the second comma belongs to the face value.
    pub fn from_triple(text: &str) -> Self {
        let mut parts = text.splitn(3, ',').map(str::trim);
        Self {
            yield_rate: parts.next().unwrap_or_default().to_string(),
            maturity: parts.next().unwrap_or_default().to_string(),
            face_value: parts.next().unwrap_or_default().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.yield_rate.is_empty() || self.maturity.is_empty() || self.face_value.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLadderInput {
    pub cash_flows: String,
    pub terms: String,
    pub bonds: Vec<RawBondSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedBond {
    pub yield_rate: f64,
    pub maturity_period: i64,
    pub face_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedInput {
    pub cash_flows: Vec<f64>,
    pub terms: Vec<i64>,
    pub bonds: Vec<ParsedBond>,
}

fn float_error(text: &str, err: ParseFloatError) -> LadderError {
    LadderError::Unexpected(format!("could not convert '{text}' to a number: {err}"))
}

fn int_error(text: &str, err: ParseIntError) -> LadderError {
    LadderError::Unexpected(format!("could not convert '{text}' to an integer: {err}"))
}

fn parse_float(text: &str) -> Result<f64, LadderError> {
    let text = text.trim();
    text.parse::<f64>().map_err(|e| float_error(text, e))
}

fn parse_int(text: &str) -> Result<i64, LadderError> {
    let text = text.trim();
    let value = text.parse::<i64>().map_err(|e| int_error(text, e))?;
    if value > i64::from(Period::MAX) {
        return Err(LadderError::Unexpected(format!(
            "period '{text}' is out of range"
        )));
    }
    Ok(value)
}

pub fn parse_raw_input(raw: &RawLadderInput) -> Result<ParsedInput, LadderError> {
    if raw.bonds.len() > MAX_BOND_SLOTS {
        return Err(LadderError::Unexpected(format!(
            "at most {MAX_BOND_SLOTS} bond options are supported, got {}",
            raw.bonds.len()
        )));
    }
    let cash_flows = raw
        .cash_flows
        .split(',')
        .map(parse_float)
        .collect::<Result<Vec<_>, _>>()?;
    let terms = raw
        .terms
        .split(',')
        .map(parse_int)
        .collect::<Result<Vec<_>, _>>()?;

    let mut bonds = Vec::with_capacity(raw.bonds.len());
    for slot in raw.bonds.iter().filter(|slot| !slot.is_blank()) {
        bonds.push(ParsedBond {
            yield_rate: parse_float(&slot.yield_rate)?,
            maturity_period: parse_int(&slot.maturity)?,
            face_value: parse_float(&slot.face_value)?,
        });
    }

    Ok(ParsedInput {
        cash_flows,
        terms,
        bonds,
    })
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn validate(parsed: ParsedInput) -> Result<LadderRequest, ValidationError> {
    if parsed.cash_flows.len() != parsed.terms.len() {
        return Err(ValidationError::LengthMismatch {
            cash_flows: parsed.cash_flows.len(),
            terms: parsed.terms.len(),
        });
    }
    if !parsed.cash_flows.iter().copied().all(is_positive) || parsed.terms.iter().any(|&t| t <= 0)
    {
        return Err(ValidationError::NonPositiveSchedule);
    }
    if parsed.bonds.is_empty() {
        return Err(ValidationError::NoBonds);
    }
    if let Some(index) = parsed.bonds.iter().position(|b| {
        !(b.yield_rate.is_finite() && b.yield_rate >= 0.0)
            || b.maturity_period <= 0
            || !is_positive(b.face_value)
    }) {
        return Err(ValidationError::InvalidBond { index });
    }

    // Both ranges were checked above and in `parse_int`.
    let schedule = CashFlowSchedule {
        periods: parsed.terms.iter().map(|&t| t as Period).collect(),
        targets: parsed.cash_flows,
    };
    let candidates = parsed
        .bonds
        .iter()
        .map(|b| BondCandidate {
            yield_rate: b.yield_rate,
            maturity_period: b.maturity_period as Period,
            face_value: b.face_value,
        })
        .collect();

    Ok(LadderRequest {
        schedule,
        candidates,
    })
}

pub fn normalize(raw: &RawLadderInput) -> Result<LadderRequest, LadderError> {
    let parsed = parse_raw_input(raw)?;
    Ok(validate(parsed)?)
}
