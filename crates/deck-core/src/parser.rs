//! Parser for structured element ids (`"cell-1-3"`, `"member-0-photo"`, …).
//!
//! Built on `winnow` 0.7. The whole input must match one id form; anything
//! else is a [`ParseElementRefError`] rather than a silently dropped edit.

use crate::element::{ElementRef, MemberField};
use thiserror::Error;
use winnow::ascii::dec_uint;
use winnow::combinator::{alt, preceded};
use winnow::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseElementRefError {
    #[error("unrecognized element id `{0}`")]
    Unrecognized(String),
}

/// Parse a structured element id into an [`ElementRef`].
pub fn parse_element_ref(input: &str) -> Result<ElementRef, ParseElementRefError> {
    element_ref
        .parse(input)
        .map_err(|_| ParseElementRefError::Unrecognized(input.to_string()))
}

fn element_ref(input: &mut &str) -> ModalResult<ElementRef> {
    alt((
        "title".value(ElementRef::Title),
        "subtitle".value(ElementRef::Subtitle),
        "description".value(ElementRef::Description),
        preceded("image-", index).map(ElementRef::Image),
        preceded("logo-", index).map(ElementRef::Logo),
        table_cell,
        plan_feature,
        member_field,
    ))
    .parse_next(input)
}

fn index(input: &mut &str) -> ModalResult<usize> {
    dec_uint.map(|n: u32| n as usize).parse_next(input)
}

fn table_cell(input: &mut &str) -> ModalResult<ElementRef> {
    (preceded("cell-", index), preceded('-', index))
        .map(|(row, col)| ElementRef::TableCell { row, col })
        .parse_next(input)
}

fn plan_feature(input: &mut &str) -> ModalResult<ElementRef> {
    (preceded("plan-", index), preceded("-feature-", index))
        .map(|(plan, feature)| ElementRef::PlanFeature { plan, feature })
        .parse_next(input)
}

fn member_field(input: &mut &str) -> ModalResult<ElementRef> {
    let member = preceded("member-", index).parse_next(input)?;
    let field = preceded(
        '-',
        alt((
            "name".value(MemberField::Name),
            "role".value(MemberField::Role),
            "photo".value(MemberField::Photo),
        )),
    )
    .parse_next(input)?;
    Ok(ElementRef::MemberField { member, field })
}
