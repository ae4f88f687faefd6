use crate::error::ParseError;
use crate::math::{from_polar, Point2};

use super::ParsedCoordinate;

/// Parses one line of coordinate text.
///
/// Accepted forms, tried in order: `x,y`, `@dx,dy`, `@distance<angle` and a
/// bare distance. Relative and polar forms need `base`.
///
/// # Errors
///
/// Returns a [`ParseError`] describing why the text is not a coordinate.
pub fn parse(text: &str, base: Option<&Point2>) -> Result<ParsedCoordinate, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(rest) = text.strip_prefix('@') {
        let base = base.ok_or(ParseError::MissingBasePoint)?;
        return relative(rest.trim(), base).map(ParsedCoordinate::at);
    }

    if let Some((x, y)) = text.split_once(',') {
        return Ok(ParsedCoordinate::at(Point2::new(number(x)?, number(y)?)));
    }

    if text.contains('<') {
        return Err(ParseError::Unrecognized(text.to_owned()));
    }

    let distance = number(text).map_err(|_| ParseError::Unrecognized(text.to_owned()))?;
    Ok(ParsedCoordinate {
        point: base.copied().unwrap_or_else(Point2::origin),
        distance: Some(distance),
        is_direct_distance: true,
    })
}

/// Resolves the part after `@` against the base point.
fn relative(rest: &str, base: &Point2) -> Result<Point2, ParseError> {
    if rest.is_empty() {
        return Ok(*base);
    }
    if let Some((distance, angle)) = rest.split_once('<') {
        let distance = number(distance)?;
        let angle = number(angle)?.to_radians();
        return Ok(from_polar(distance, angle, base));
    }
    if let Some((dx, dy)) = rest.split_once(',') {
        return Ok(Point2::new(base.x + number(dx)?, base.y + number(dy)?));
    }
    Err(ParseError::Unrecognized(format!("@{rest}")))
}

fn number(s: &str) -> Result<f64, ParseError> {
    let s = s.trim();
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber(s.to_owned())),
    }
}
