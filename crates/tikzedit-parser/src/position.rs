//! Grammar of position options.
//!
//! Small winnow parsers over `&str` for lengths, coordinates and the
//! position-related options of a node declaration:
//!
//! ```text
//! at (2, -1.5cm)
//! below=of k8s
//! right = 1.5cm of gateway
//! xshift=-0.8cm
//! inner sep=4mm
//! fit=(api) (db) (cache)
//! ```
//!
//! All lengths are returned in centimetres.

use winnow::{
    ModalResult, Parser,
    ascii::{Caseless, multispace0, multispace1},
    combinator::{alt, delimited, opt, preceded, repeat, separated_pair, terminated},
    error::{ContextError, ErrMode},
    token::{one_of, take, take_till, take_while},
};

use tikzedit_core::{geometry::Point, model::Direction, units::LengthUnit};

/// A plain decimal number with optional sign: `3`, `-1.25`, `.5`, `+2.`
pub(crate) fn number(input: &mut &str) -> ModalResult<f32> {
    (
        opt(one_of(['+', '-'])),
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.'),
    )
        .take()
        .try_map(str::parse::<f32>)
        .parse_next(input)
}

fn unit(input: &mut &str) -> ModalResult<LengthUnit> {
    take_while(0.., |c: char| c.is_ascii_alphabetic())
        .try_map(str::parse::<LengthUnit>)
        .parse_next(input)
}

/// A number with an optional unit suffix, converted to centimetres.
pub(crate) fn length(input: &mut &str) -> ModalResult<f32> {
    (number, unit)
        .map(|(value, unit)| unit.to_cm(value))
        .parse_next(input)
}

/// `(x, y)` with lengths on both axes.
pub(crate) fn coordinate(input: &mut &str) -> ModalResult<Point> {
    delimited(
        ('(', multispace0),
        separated_pair(length, (multispace0, ',', multispace0), length),
        (multispace0, ')'),
    )
    .map(|(x, y)| Point::new(x, y))
    .parse_next(input)
}

/// Outcome of an `at` clause: either a readable coordinate or the raw text
/// between the parentheses.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AtClause<'s> {
    Point(Point),
    Unreadable(&'s str),
}

/// A parenthesized group with nested parentheses balanced; yields the inside.
fn balanced_parens<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let close = crate::scan::matching_close(*input, 0, b'(', b')')
        .ok_or_else(|| ErrMode::Backtrack(ContextError::new()))?;
    let group = take(close + 1).parse_next(input)?;
    Ok(&group[1..close])
}

/// `at (x,y)`, tolerating coordinates it cannot read.
pub(crate) fn at_clause<'s>(input: &mut &'s str) -> ModalResult<AtClause<'s>> {
    preceded(
        ("at", multispace0),
        alt((
            coordinate.map(AtClause::Point),
            balanced_parens.map(AtClause::Unreadable),
        )),
    )
    .parse_next(input)
}

fn direction(input: &mut &str) -> ModalResult<Direction> {
    alt((
        "above".value(Direction::Above),
        "below".value(Direction::Below),
        "left".value(Direction::Left),
        "right".value(Direction::Right),
    ))
    .parse_next(input)
}

fn caseless_direction(input: &mut &str) -> ModalResult<Direction> {
    alt((
        Caseless("above").value(Direction::Above),
        Caseless("below").value(Direction::Below),
        Caseless("left").value(Direction::Left),
        Caseless("right").value(Direction::Right),
    ))
    .parse_next(input)
}

/// Characters allowed in a node name inside a position option.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// A parsed `direction=[distance] of name` option.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelativeOption<'s> {
    pub direction: Direction,
    pub distance: Option<f32>,
    pub reference: &'s str,
}

/// `above=of gcp`, `below = 1cm of k8s`
pub(crate) fn relative_option<'s>(input: &mut &'s str) -> ModalResult<RelativeOption<'s>> {
    (
        direction,
        (multispace0, '=', multispace0),
        opt(terminated(length, multispace1)),
        ("of", multispace1),
        take_while(1.., is_name_char),
    )
        .map(|(direction, _, distance, _, reference)| RelativeOption {
            direction,
            distance,
            reference,
        })
        .parse_next(input)
}

/// Tolerant form of [`relative_option`]: any case, `=` optional,
/// `of=` accepted, name taken up to the next delimiter.
///
/// ```text
/// Above = of GCP
/// left of=db
/// below=of k8s.south
/// ```
pub(crate) fn loose_relative<'s>(input: &mut &'s str) -> ModalResult<(Direction, &'s str)> {
    (
        caseless_direction,
        multispace0,
        opt('='),
        multispace0,
        opt(terminated(length, multispace1)),
        Caseless("of"),
        alt(((multispace0, '=', multispace0).void(), multispace1.void())),
        take_till(1.., |c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | '[' | ']' | '{' | '}' | '(' | ')')
        }),
    )
        .map(|(direction, _, _, _, _, _, _, name)| (direction, name))
        .parse_next(input)
}

/// Axis of a shift option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

fn shift_key(input: &mut &str) -> ModalResult<Axis> {
    terminated(
        alt(("xshift".value(Axis::X), "yshift".value(Axis::Y))),
        (multispace0, '=', multispace0),
    )
    .parse_next(input)
}

/// A shift option whose value may or may not be readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ShiftOption {
    pub axis: Axis,
    pub value: Option<f32>,
}

/// `xshift=-0.8cm`, `yshift = 5mm`
///
/// A recognized key with an unreadable value still parses, with `value`
/// set to `None`, so the caller can report it.
pub(crate) fn shift_option(input: &mut &str) -> ModalResult<ShiftOption> {
    let axis = shift_key.parse_next(input)?;
    let value = opt(length).parse_next(input)?;
    if value.is_none() {
        // Swallow the unreadable value so it is removed on export too.
        take_till(0.., |c: char| matches!(c, ',' | ']' | '{' | ';')).parse_next(input)?;
    }
    Ok(ShiftOption { axis, value })
}

/// `inner sep=0.5cm`
pub(crate) fn inner_sep_option(input: &mut &str) -> ModalResult<f32> {
    preceded(
        ("inner", multispace1, "sep", multispace0, '=', multispace0),
        length,
    )
    .parse_next(input)
}

/// `fit=` followed by the raw member list.
///
/// Members are either parenthesized groups or a comma/space separated list:
///
/// ```text
/// fit=(api) (db) (cache)
/// fit=(api, db cache)
/// fit=api, db
/// ```
pub(crate) fn fit_option(input: &mut &str) -> ModalResult<Vec<String>> {
    preceded(("fit", multispace0, '=', multispace0), fit_members).parse_next(input)
}

fn paren_group<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    preceded(multispace0, delimited('(', take_till(0.., ')'), ')')).parse_next(input)
}

fn fit_members(input: &mut &str) -> ModalResult<Vec<String>> {
    let groups: Vec<&str> = repeat(0.., paren_group).parse_next(input)?;
    let raw: Vec<&str> = if groups.is_empty() {
        let rest = take_till(0.., |c: char| matches!(c, ']' | '{' | ';')).parse_next(input)?;
        vec![rest]
    } else {
        groups
    };
    Ok(raw
        .into_iter()
        .flat_map(|chunk| chunk.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Runs `parser` on `text` and returns its output only if it consumed
/// everything but trailing whitespace.
pub(crate) fn parse_complete<'s, O>(
    text: &'s str,
    mut parser: impl Parser<&'s str, O, ErrMode<ContextError>>,
) -> Option<O> {
    let mut input = text.trim_start();
    let output = parser.parse_next(&mut input).ok()?;
    input.trim().is_empty().then_some(output)
}

/// Runs `parser` at the start of `text` and returns its output together
/// with the number of bytes consumed.
pub(crate) fn parse_prefix<'s, O>(
    text: &'s str,
    mut parser: impl Parser<&'s str, O, ErrMode<ContextError>>,
) -> Option<(O, usize)> {
    let mut input = text;
    let output = parser.parse_next(&mut input).ok()?;
    Some((output, text.len() - input.len()))
}

/// Finds the first loose relative reference anywhere in `text`.
///
/// Only positions at a word boundary are tried, so `fabove=of x` does not
/// match.
pub(crate) fn find_loose_relative(text: &str) -> Option<(Direction, String)> {
    text.char_indices()
        .filter(|&(idx, _)| {
            text[..idx]
                .chars()
                .next_back()
                .is_none_or(|prev| !prev.is_alphanumeric())
        })
        .find_map(|(idx, _)| parse_prefix(&text[idx..], loose_relative))
        .map(|((direction, name), _)| (direction, name.to_string()))
}
