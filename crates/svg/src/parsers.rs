//! `nom` parsers for SVG attribute values.

use crate::error::SvgError;
use folio_types::{Color, Matrix};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_while_m_n},
    character::complete::{char, multispace0, multispace1, one_of},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::{many0, many1},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Whitespace with at most one comma.
fn comma_wsp(input: &str) -> IResult<&str, ()> {
    value((), (multispace0, opt(char(',')), multispace0)).parse(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    double(input)
}

fn coordinate_pair(input: &str) -> IResult<&str, (f64, f64)> {
    (number, preceded(comma_wsp, number)).parse(input)
}

fn flag(input: &str) -> IResult<&str, bool> {
    map(one_of("01"), |c| c == '1').parse(input)
}

fn complete<'a, O>(
    name: &str,
    input: &'a str,
    parser: impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
) -> Result<O, SvgError> {
    all_consuming(ws(parser))
        .parse(input)
        .map(|(_, out)| out)
        .map_err(|_| SvgError::attribute(name, input))
}

// --- Numbers & Lengths ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute, already converted to user units.
    User(f64),
    Percent(f64),
}

impl Length {
    /// Resolves against `reference` (the viewport dimension percentages refer to).
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Length::User(v) => v,
            Length::Percent(p) => p / 100.0 * reference,
        }
    }
}

fn unit(input: &str) -> IResult<&str, f64> {
    alt((
        value(1.0, tag_no_case("px")),
        value(1.0, tag_no_case("pt")),
        value(12.0, tag_no_case("pc")),
        value(72.0, tag_no_case("in")),
        value(72.0 / 2.54, tag_no_case("cm")),
        value(72.0 / 25.4, tag_no_case("mm")),
    ))
    .parse(input)
}

fn length(input: &str) -> IResult<&str, Length> {
    alt((
        map(terminated(number, char('%')), Length::Percent),
        map(pair(number, opt(unit)), |(v, scale)| {
            Length::User(v * scale.unwrap_or(1.0))
        }),
    ))
    .parse(input)
}

pub fn parse_number(name: &str, input: &str) -> Result<f64, SvgError> {
    complete(name, input, number)
}

pub fn parse_length(name: &str, input: &str) -> Result<Length, SvgError> {
    complete(name, input, length)
}

/// A number or a percentage, as used by stop offsets (`0.5` or `50%`).
pub fn parse_fraction(name: &str, input: &str) -> Result<f64, SvgError> {
    complete(
        name,
        input,
        alt((map(terminated(number, char('%')), |p| p / 100.0), number)),
    )
}

pub fn parse_number_list(name: &str, input: &str) -> Result<Vec<f64>, SvgError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    complete(
        name,
        input,
        map((number, many0(preceded(comma_wsp, number))), |(first, mut rest)| {
            rest.insert(0, first);
            rest
        }),
    )
}

pub fn parse_length_list(name: &str, input: &str) -> Result<Vec<Length>, SvgError> {
    complete(
        name,
        input,
        map((length, many0(preceded(comma_wsp, length))), |(first, mut rest)| {
            rest.insert(0, first);
            rest
        }),
    )
}

pub fn parse_points(name: &str, input: &str) -> Result<Vec<(f64, f64)>, SvgError> {
    let numbers = parse_number_list(name, input)?;
    // An odd trailing coordinate is ignored.
    Ok(numbers.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub fn parse_view_box(name: &str, input: &str) -> Result<ViewBox, SvgError> {
    let values = parse_number_list(name, input)?;
    match values[..] {
        [x, y, width, height] if width > 0.0 && height > 0.0 => Ok(ViewBox { x, y, width, height }),
        _ => Err(SvgError::attribute(name, input)),
    }
}

// --- Colors & Paint ---

fn hex_color(input: &str) -> IResult<&str, Color> {
    map_res(
        preceded(char('#'), take_while_m_n(3, 6, |c: char| c.is_ascii_hexdigit())),
        |hex: &str| Color::parse_hex(&format!("#{}", hex)),
    )
    .parse(input)
}

fn color_channel(input: &str) -> IResult<&str, u8> {
    alt((
        map(terminated(number, char('%')), |p| (p.clamp(0.0, 100.0) * 2.55).round() as u8),
        map(number, |v| v.clamp(0.0, 255.0).round() as u8),
    ))
    .parse(input)
}

fn rgb_function(input: &str) -> IResult<&str, Color> {
    map(
        delimited(
            (tag_no_case("rgb"), multispace0, char('('), multispace0),
            (
                color_channel,
                preceded(comma_wsp, color_channel),
                preceded(comma_wsp, color_channel),
            ),
            (multispace0, char(')')),
        ),
        |(r, g, b)| Color::rgb(r, g, b),
    )
    .parse(input)
}

fn named_color(input: &str) -> IResult<&str, Color> {
    map_res(
        nom::bytes::complete::take_while1(|c: char| c.is_ascii_alphabetic()),
        |name: &str| Color::named(name).ok_or(()),
    )
    .parse(input)
}

fn color(input: &str) -> IResult<&str, Color> {
    alt((hex_color, rgb_function, named_color)).parse(input)
}

pub fn parse_color(name: &str, input: &str) -> Result<Color, SvgError> {
    complete(name, input, color)
}

/// Fill or stroke as written.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintSpec {
    None,
    CurrentColor,
    Color(Color),
    /// `url(<reference>)` with an optional fallback paint.
    Url(String, Option<Box<PaintSpec>>),
}

fn iri(input: &str) -> IResult<&str, &str> {
    delimited(
        (tag("url("), multispace0, opt(one_of("'\""))),
        map(take_till(|c: char| c == ')' || c == '\'' || c == '"'), str::trim),
        (opt(one_of("'\"")), multispace0, char(')')),
    )
    .parse(input)
}

fn simple_paint(input: &str) -> IResult<&str, PaintSpec> {
    alt((
        value(PaintSpec::None, tag("none")),
        value(PaintSpec::CurrentColor, tag("currentColor")),
        map(color, PaintSpec::Color),
    ))
    .parse(input)
}

fn paint(input: &str) -> IResult<&str, PaintSpec> {
    alt((
        map(
            (iri, opt(preceded(multispace1, simple_paint))),
            |(reference, fallback)| PaintSpec::Url(reference.to_string(), fallback.map(Box::new)),
        ),
        simple_paint,
    ))
    .parse(input)
}

pub fn parse_paint(name: &str, input: &str) -> Result<PaintSpec, SvgError> {
    complete(name, input, paint)
}

/// The reference inside `url(...)`, e.g. `#clip1`.
pub fn parse_iri(name: &str, input: &str) -> Result<String, SvgError> {
    complete(name, input, map(iri, str::to_string))
}

// --- Transforms ---

fn arguments(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        (multispace0, char('('), multispace0),
        map((number, many0(preceded(comma_wsp, number))), |(first, mut rest)| {
            rest.insert(0, first);
            rest
        }),
        (multispace0, char(')')),
    )
    .parse(input)
}

fn transform_function(input: &str) -> IResult<&str, Matrix> {
    let parsed: IResult<&str, (&str, Vec<f64>)> = (
        alt((
            tag("matrix"),
            tag("translate"),
            tag("scale"),
            tag("rotate"),
            tag("skewX"),
            tag("skewY"),
        )),
        arguments,
    )
        .parse(input);
    let (rest, (name, args)) = parsed?;

    let matrix = match (name, args.as_slice()) {
        ("matrix", &[a, b, c, d, e, f]) => Matrix::new(a, b, c, d, e, f),
        ("translate", &[tx]) => Matrix::translate(tx, 0.0),
        ("translate", &[tx, ty]) => Matrix::translate(tx, ty),
        ("scale", &[s]) => Matrix::scale(s, s),
        ("scale", &[sx, sy]) => Matrix::scale(sx, sy),
        ("rotate", &[angle]) => Matrix::rotate(angle),
        ("rotate", &[angle, cx, cy]) => Matrix::multiply(
            &Matrix::multiply(&Matrix::translate(-cx, -cy), &Matrix::rotate(angle)),
            &Matrix::translate(cx, cy),
        ),
        ("skewX", &[angle]) => Matrix::skew_x(angle),
        ("skewY", &[angle]) => Matrix::skew_y(angle),
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
    };
    Ok((rest, matrix))
}

/// Parses a transform list into one matrix; the rightmost function applies first.
pub fn parse_transform(name: &str, input: &str) -> Result<Matrix, SvgError> {
    if input.trim().is_empty() {
        return Ok(Matrix::identity());
    }
    let functions = complete(
        name,
        input,
        (transform_function, many0(preceded(comma_wsp, transform_function))),
    )?;
    let (first, rest) = functions;
    Ok(rest
        .iter()
        .fold(first, |acc, next| acc.pre_transform(next)))
}

// --- Path Data ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo { abs: bool, x: f64, y: f64 },
    LineTo { abs: bool, x: f64, y: f64 },
    Horizontal { abs: bool, x: f64 },
    Vertical { abs: bool, y: f64 },
    CurveTo { abs: bool, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64 },
    Arc {
        abs: bool,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    /// A command that is parsed but not drawn (S, Q, T, Z).
    Unsupported(char),
}

fn repeated<'a, O>(
    parser: impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
) -> impl Parser<&'a str, Output = Vec<O>, Error = nom::error::Error<&'a str>> {
    many1(preceded(comma_wsp, parser))
}

fn path_command(input: &str) -> IResult<&str, Vec<PathSegment>> {
    let parsed: IResult<&str, char> =
        preceded(multispace0, one_of("MmLlHhVvCcSsQqTtAaZz")).parse(input);
    let (input, letter) = parsed?;
    let abs = letter.is_ascii_uppercase();
    match letter {
        'M' | 'm' => map(repeated(coordinate_pair), |pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| match i {
                    0 => PathSegment::MoveTo { abs, x, y },
                    _ => PathSegment::LineTo { abs, x, y },
                })
                .collect()
        })
        .parse(input),
        'L' | 'l' => map(repeated(coordinate_pair), |pairs| {
            pairs
                .into_iter()
                .map(|(x, y)| PathSegment::LineTo { abs, x, y })
                .collect()
        })
        .parse(input),
        'H' | 'h' => map(repeated(number), |xs| {
            xs.into_iter().map(|x| PathSegment::Horizontal { abs, x }).collect()
        })
        .parse(input),
        'V' | 'v' => map(repeated(number), |ys| {
            ys.into_iter().map(|y| PathSegment::Vertical { abs, y }).collect()
        })
        .parse(input),
        'C' | 'c' => map(
            repeated((
                coordinate_pair,
                preceded(comma_wsp, coordinate_pair),
                preceded(comma_wsp, coordinate_pair),
            )),
            |curves| {
                curves
                    .into_iter()
                    .map(|((x1, y1), (x2, y2), (x, y))| PathSegment::CurveTo {
                        abs,
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    })
                    .collect()
            },
        )
        .parse(input),
        'A' | 'a' => map(
            repeated((
                number,
                preceded(comma_wsp, number),
                preceded(comma_wsp, number),
                preceded(comma_wsp, flag),
                preceded(comma_wsp, flag),
                preceded(comma_wsp, coordinate_pair),
            )),
            |arcs| {
                arcs.into_iter()
                    .map(|(rx, ry, rotation, large_arc, sweep, (x, y))| PathSegment::Arc {
                        abs,
                        rx,
                        ry,
                        rotation,
                        large_arc,
                        sweep,
                        x,
                        y,
                    })
                    .collect()
            },
        )
        .parse(input),
        'Z' | 'z' => Ok((input, vec![PathSegment::Unsupported(letter)])),
        // S, Q and T: skip their numeric arguments.
        _ => map(repeated(number), |_| vec![PathSegment::Unsupported(letter)]).parse(input),
    }
}

/// Parses path data, keeping every segment before the first error.
///
/// The second value is the unparsed remainder when the data is malformed.
pub fn parse_path_data(input: &str) -> (Vec<PathSegment>, Option<&str>) {
    let mut segments = Vec::new();
    let mut rest = input;
    loop {
        if rest.trim().is_empty() {
            return (segments, None);
        }
        match path_command(rest) {
            Ok((remaining, mut parsed)) => {
                segments.append(&mut parsed);
                rest = remaining;
            }
            Err(_) => return (segments, Some(rest.trim())),
        }
    }
}
