//! Row construction helpers.
//!
//! [`fill_attr`] and [`fill_attr_text`] build one [`ColumnAttr`] with a
//! freshly allocated, zero-filled, capacity-bounded value and append it to a
//! row; insertion order is the eventual column order of the bound statement
//! (unless the row is later reordered for key predicates).
//!
//! [`fill_decision`] is the value-presence policy used by the key-type
//! managers: given the operation kind and a column's valid flag it decides
//! whether the column participates, is cleared, or keeps a default. The
//! function is pure; it never touches I/O.

use serde::{Deserialize, Serialize};

use super::{ColumnAttr, ColumnName, Row};
use crate::value::{AttrType, AttrValue, ValueError};

/// Per-column value-presence marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidFlag {
    /// The enclosing struct was not supplied at all
    NotGiven,
    /// The struct was supplied but this column carries no value
    /// (on update this is an explicit "clear")
    NoValue,
    /// The column is marked not-valid
    Invalid,
    /// The column carries a meaningful value
    Valid,
}

impl ValidFlag {
    /// One-character form stored in per-table `valid` columns.
    pub fn as_char(self) -> char {
        match self {
            ValidFlag::Invalid | ValidFlag::NotGiven => '0',
            ValidFlag::Valid => '1',
            ValidFlag::NoValue => '2',
        }
    }

    pub fn from_char(c: char) -> ValidFlag {
        match c {
            '1' => ValidFlag::Valid,
            '2' => ValidFlag::NoValue,
            _ => ValidFlag::Invalid,
        }
    }
}

/// Operation kind driving the fill decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Outcome of the fill decision for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The value is meaningful: write it, and on read paths also filter on
    /// it (the column joins the primary-key list).
    UseValue,
    /// The value is irrelevant for a read; emit an empty placeholder so the
    /// fetch path has a slot to fill.
    Placeholder,
    /// Value absent on create: leave the column marked invalid.
    LeaveInvalid,
    /// The enclosing struct was not supplied: keep the column valid with
    /// default content.
    DefaultValid,
    /// Update with an explicit clear: emit an empty value and flip validity
    /// to invalid.
    Clear,
}

/// Decide how one column participates in an operation.
///
/// `prior` is the valid flag currently recorded in the database row, used
/// when an update leaves a column untouched. Deterministic in its inputs.
pub fn fill_decision(op: Operation, valid: ValidFlag, prior: ValidFlag) -> FillOutcome {
    match (op, valid) {
        (_, ValidFlag::NotGiven) => FillOutcome::DefaultValid,
        (Operation::Read | Operation::Delete, ValidFlag::Valid) => FillOutcome::UseValue,
        (Operation::Read | Operation::Delete, _) => FillOutcome::Placeholder,
        (Operation::Create | Operation::Update, ValidFlag::Valid) => FillOutcome::UseValue,
        (Operation::Update, ValidFlag::NoValue) => FillOutcome::Clear,
        (Operation::Create, _) => FillOutcome::LeaveInvalid,
        (Operation::Update, ValidFlag::Invalid) => {
            // An untouched column keeps whatever validity the row already has.
            if prior == ValidFlag::Valid {
                FillOutcome::DefaultValid
            } else {
                FillOutcome::LeaveInvalid
            }
        }
    }
}

/// Effective valid flag recorded for a column after applying an outcome.
///
/// `clear_exception` marks the one documented column whose validity stays
/// `Valid` when cleared (the link description column).
pub fn effective_flag(outcome: FillOutcome, prior: ValidFlag, clear_exception: bool) -> ValidFlag {
    match outcome {
        FillOutcome::UseValue | FillOutcome::DefaultValid => ValidFlag::Valid,
        FillOutcome::LeaveInvalid => ValidFlag::Invalid,
        FillOutcome::Placeholder => prior,
        FillOutcome::Clear => {
            if clear_exception {
                ValidFlag::Valid
            } else {
                ValidFlag::Invalid
            }
        }
    }
}

/// Append one column entry whose value is built from raw bytes.
///
/// The value is freshly allocated, zero-filled to its declared capacity, and
/// the caller's bytes are copied in, never exceeding the capacity.
pub fn fill_attr(row: &mut Row, name: ColumnName, ty: AttrType, data: &[u8]) -> Result<(), ValueError> {
    let value = AttrValue::from_wire(ty, data)?;
    let length = data.len().min(ty.capacity());
    row.push(ColumnAttr { name, attr_type: ty, length, value: Some(value) });
    Ok(())
}

/// Append one column entry whose value is parsed from text.
///
/// Numeric types parse per their integer conversion; an empty string is a
/// valid IPv4 literal (`0.0.0.0`).
pub fn fill_attr_text(row: &mut Row, name: ColumnName, ty: AttrType, text: &str) -> Result<(), ValueError> {
    let value = AttrValue::parse(ty, text)?;
    let length = value.logical_len();
    row.push(ColumnAttr { name, attr_type: ty, length, value: Some(value) });
    Ok(())
}

/// Fill one column under the decision policy.
///
/// Applies [`fill_decision`], appends the appropriate entry (value, empty
/// placeholder, or nothing for [`FillOutcome::LeaveInvalid`]), extends the
/// primary-key list when the column is filtered on during a read, and
/// returns the effective valid flag to record.
#[allow(clippy::too_many_arguments)]
pub fn fill_attr_decided(
    row: &mut Row,
    primary_keys: Option<&mut Vec<ColumnName>>,
    name: ColumnName,
    ty: AttrType,
    text: &str,
    op: Operation,
    valid: ValidFlag,
    prior: ValidFlag,
    clear_exception: bool,
) -> Result<ValidFlag, ValueError> {
    let outcome = fill_decision(op, valid, prior);
    match outcome {
        FillOutcome::UseValue => {
            fill_attr_text(row, name, ty, text)?;
            if op == Operation::Read {
                if let Some(keys) = primary_keys {
                    keys.push(name);
                }
            }
        }
        FillOutcome::Placeholder | FillOutcome::Clear => {
            row.push(ColumnAttr::empty(name, ty)?);
        }
        FillOutcome::DefaultValid => {
            // Default content is only written on create; an update leaves
            // the stored column untouched.
            if op == Operation::Create {
                row.push(ColumnAttr::empty(name, ty)?);
            } else {
                row.push(ColumnAttr::absent(name, ty));
            }
        }
        FillOutcome::LeaveInvalid => {
            row.push(ColumnAttr::absent(name, ty));
        }
    }
    Ok(effective_flag(outcome, prior, clear_exception))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_attr_zero_pads_to_capacity() {
        let mut row = Row::new();
        fill_attr(&mut row, ColumnName::CtrName, AttrType::Bytes(32), b"ctrl1").unwrap();
        let attr = &row[0];
        assert_eq!(attr.length, 5);
        match attr.value.as_ref().unwrap() {
            AttrValue::Bytes(b) => {
                assert_eq!(b.capacity(), 32);
                assert_eq!(b.as_value(), b"ctrl1");
                assert!(b.as_bytes()[5..].iter().all(|&x| x == 0));
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_fill_attr_never_exceeds_capacity() {
        let mut row = Row::new();
        let long = vec![0xAB; 64];
        fill_attr(&mut row, ColumnName::TrunkAllowedVlan, AttrType::Bytes(2), &long).unwrap();
        assert_eq!(row[0].length, 2);
    }

    #[test]
    fn test_fill_attr_text_numeric_and_ipv4() {
        let mut row = Row::new();
        fill_attr_text(&mut row, ColumnName::OperStatus, AttrType::Uint16, "1").unwrap();
        fill_attr_text(&mut row, ColumnName::IpAddress, AttrType::Ipv4, "").unwrap();
        assert_eq!(row[0].value, Some(AttrValue::Uint16(1)));
        assert_eq!(row[1].value, Some(AttrValue::Ipv4(std::net::Ipv4Addr::UNSPECIFIED)));
    }

    #[test]
    fn test_decision_create_invalid_leaves_invalid() {
        let outcome = fill_decision(Operation::Create, ValidFlag::Invalid, ValidFlag::Invalid);
        assert_eq!(outcome, FillOutcome::LeaveInvalid);
        assert_eq!(effective_flag(outcome, ValidFlag::Invalid, false), ValidFlag::Invalid);
    }

    #[test]
    fn test_decision_update_clear_flips_invalid() {
        let outcome = fill_decision(Operation::Update, ValidFlag::NoValue, ValidFlag::Valid);
        assert_eq!(outcome, FillOutcome::Clear);
        assert_eq!(effective_flag(outcome, ValidFlag::Valid, false), ValidFlag::Invalid);
        // The documented exception column stays valid when cleared.
        assert_eq!(effective_flag(outcome, ValidFlag::Valid, true), ValidFlag::Valid);
    }

    #[test]
    fn test_decision_not_given_defaults_valid() {
        for op in [Operation::Create, Operation::Read, Operation::Update, Operation::Delete] {
            let outcome = fill_decision(op, ValidFlag::NotGiven, ValidFlag::Invalid);
            assert_eq!(outcome, FillOutcome::DefaultValid);
            assert_eq!(effective_flag(outcome, ValidFlag::Invalid, false), ValidFlag::Valid);
        }
    }

    #[test]
    fn test_decision_read_without_value_emits_placeholder() {
        let outcome = fill_decision(Operation::Read, ValidFlag::Invalid, ValidFlag::Valid);
        assert_eq!(outcome, FillOutcome::Placeholder);
    }

    #[test]
    fn test_decided_read_extends_primary_keys() {
        let mut row = Row::new();
        let mut keys = Vec::new();
        fill_attr_decided(
            &mut row,
            Some(&mut keys),
            ColumnName::CtrName,
            AttrType::Bytes(32),
            "ctrl1",
            Operation::Read,
            ValidFlag::Valid,
            ValidFlag::Valid,
            false,
        )
        .unwrap();
        assert_eq!(keys, vec![ColumnName::CtrName]);
        assert!(row[0].has_value());
    }

    #[test]
    fn test_valid_flag_chars() {
        assert_eq!(ValidFlag::Valid.as_char(), '1');
        assert_eq!(ValidFlag::Invalid.as_char(), '0');
        assert_eq!(ValidFlag::NoValue.as_char(), '2');
        assert_eq!(ValidFlag::from_char('1'), ValidFlag::Valid);
        assert_eq!(ValidFlag::from_char('x'), ValidFlag::Invalid);
    }
}
