//! Expression normalizer: raw function text → validated [`Expression`].
//!
//! Pipeline:
//! 1. trim, reject empty input and equalities, `^` → `**`, `,` → `.` (decimal comma);
//! 2. `|expr|` groups (non-nested) → `abs(expr)`;
//! 3. nom grammar with implicit multiplication (`2x`, `x(x+1)`, `2sin(x)`) over a fixed
//!    symbol table: sin, cos, tan/tg, arcsin/asin, arccos/acos, arctan/atan/arctg, exp,
//!    log/ln, sqrt, abs, and the constants pi (π) and e;
//! 4. reject variables other than the declared one, constant divisions by zero and the
//!    zero function.
//!
//! Grammar (lowest to highest precedence):
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary | power)*      // bare `power` = implicit product
//! unary   := ('-' | '+') unary | power
//! power   := primary ('**' unary)?                   // right associative
//! primary := number | function '(' expr ')' | constant | letter | '(' expr ')'
//! ```
use crate::errors::ParseError;
use crate::symbolic::expression::{DEFAULT_VARIABLE, Expression};
use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{map, map_res, not, opt, recognize, value},
    multi::many0,
    sequence::{delimited, preceded, terminated},
};
use regex::Regex;
use std::sync::LazyLock;

static ABS_BARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|([^|]+)\|").expect("valid absolute value pattern"));

type Res<'a, O> = IResult<&'a str, O>;

/// Turns raw text into an [`Expression`] over the variable `x`.
pub fn normalize(text: &str) -> Result<Expression, ParseError> {
    normalize_in(text, DEFAULT_VARIABLE)
}

/// Same as [`normalize`] with an explicit variable name.
pub fn normalize_in(text: &str, variable: &str) -> Result<Expression, ParseError> {
    let canonical = canonical_text(text)?;
    let tree = parse_expression_func(&canonical)?;

    let foreign: Vec<String> = tree
        .extract_variables()
        .into_iter()
        .filter(|name| name != variable)
        .collect();
    if !foreign.is_empty() {
        return Err(ParseError::ForeignVariables {
            expected: variable.to_string(),
            found: foreign,
        });
    }
    if has_complex_infinity(&tree) {
        return Err(ParseError::InfiniteConstant);
    }
    if tree.simplify() == Expr::Const(0.0) {
        return Err(ParseError::ZeroFunction);
    }
    debug!("normalized '{}' into {}", text.trim(), tree);
    Ok(Expression::new(tree, variable, text.trim()))
}

/// Parses the "evaluate at" input: a real constant such as `2`, `-1,5` or `pi/4`.
pub fn parse_point(text: &str) -> Result<f64, ParseError> {
    let canonical = canonical_text(text)?;
    let tree = parse_expression_func(&canonical)
        .map_err(|_| ParseError::NotARealNumber(text.trim().to_string()))?;
    if !tree.is_constant() {
        return Err(ParseError::NotARealNumber(text.trim().to_string()));
    }
    tree.constant_value()
        .ok_or_else(|| ParseError::NotARealNumber(text.trim().to_string()))
}

/// Steps 1 and 2 of the pipeline: purely textual rewrites.
pub fn canonical_text(text: &str) -> Result<String, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    if trimmed.contains('=') {
        return Err(ParseError::ContainsEquality);
    }
    let rewritten = trimmed.replace('^', "**").replace(',', ".");
    let rewritten = ABS_BARS.replace_all(&rewritten, "abs($1)").into_owned();
    if rewritten.contains('|') {
        return Err(ParseError::UnbalancedPipes);
    }
    Ok(rewritten)
}

/// Parses canonical text (see [`canonical_text`]) into a tree. No variable checks.
pub fn parse_expression_func(input: &str) -> Result<Expr, ParseError> {
    match delimited(multispace0, expr, multispace0).parse(input) {
        Ok(("", tree)) => Ok(tree),
        Ok((rest, _)) => Err(syntax_error(input, rest)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(syntax_error(input, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(input, "")),
    }
}

fn syntax_error(input: &str, rest: &str) -> ParseError {
    ParseError::Syntax {
        position: input.len() - rest.len(),
        near: rest.chars().take(12).collect(),
    }
}

/// `1/0`, `ln(0)`, `0^-1`: constants that evaluate to complex infinity.
fn has_complex_infinity(tree: &Expr) -> bool {
    let mut found = false;
    tree.walk(&mut |node| {
        let zero = |e: &Expr| e.is_constant() && e.constant_value() == Some(0.0);
        found |= match node {
            Expr::Div(_, rhs) => zero(rhs),
            Expr::Ln(arg) => zero(arg),
            Expr::Pow(base, exp) => {
                zero(base) && exp.constant_value().is_some_and(|e| e < 0.0)
            }
            _ => false,
        };
    });
    found
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn expr(input: &str) -> Res<'_, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0((ws(one_of("+-")), term)).parse(input)?;
    let tree = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
        _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
    });
    Ok((input, tree))
}

fn term(input: &str) -> Res<'_, Expr> {
    let (input, first) = unary(input)?;
    let explicit = (
        ws(alt((terminated(char('*'), not(char('*'))), char('/')))),
        unary,
    );
    let implicit = map(power, |factor| ('*', factor));
    let (input, rest) = many0(alt((explicit, implicit))).parse(input)?;
    let tree = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
        _ => Expr::Div(Box::new(acc), Box::new(rhs)),
    });
    Ok((input, tree))
}

fn unary(input: &str) -> Res<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |operand| -operand),
        preceded(ws(char('+')), unary),
        power,
    ))
    .parse(input)
}

fn power(input: &str) -> Res<'_, Expr> {
    let (input, base) = primary(input)?;
    let (input, exponent) = opt(preceded(ws(tag("**")), unary)).parse(input)?;
    let tree = match exponent {
        Some(exponent) => Expr::Pow(Box::new(base), Box::new(exponent)),
        None => base,
    };
    Ok((input, tree))
}

fn primary(input: &str) -> Res<'_, Expr> {
    ws(alt((number, function_call, constant, variable, parenthesized))).parse(input)
}

fn parenthesized(input: &str) -> Res<'_, Expr> {
    delimited(ws(char('(')), expr, ws(char(')'))).parse(input)
}

/// `12`, `0.5`, `.5`, `1e-3`; a literal directly followed by another `.` is malformed.
fn number(input: &str) -> Res<'_, Expr> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    let literal = terminated(recognize((mantissa, exponent)), not(char('.')));
    map_res(literal, |text: &str| text.parse::<f64>().map(Expr::Const)).parse(input)
}

fn constant(input: &str) -> Res<'_, Expr> {
    alt((
        value(Expr::Pi, tag("pi")),
        value(Expr::Pi, tag("π")),
        value(Expr::E, char('e')),
    ))
    .parse(input)
}

fn variable(input: &str) -> Res<'_, Expr> {
    map(satisfy(|c: char| c.is_ascii_alphabetic()), |c| {
        Expr::Var(c.to_string())
    })
    .parse(input)
}

fn function_call(input: &str) -> Res<'_, Expr> {
    let (input, name) = alt((
        tag("arcsin"),
        tag("arccos"),
        tag("arctan"),
        tag("arctg"),
        tag("asin"),
        tag("acos"),
        tag("atan"),
        tag("sqrt"),
        tag("sin"),
        tag("cos"),
        tag("tan"),
        tag("tg"),
        tag("exp"),
        tag("log"),
        tag("ln"),
        tag("abs"),
        tag("Abs"),
    ))
    .parse(input)?;
    let (input, arg) = parenthesized(input)?;
    let arg = Box::new(arg);
    let tree = match name {
        "arcsin" | "asin" => Expr::arcsin(arg),
        "arccos" | "acos" => Expr::arccos(arg),
        "arctan" | "arctg" | "atan" => Expr::arctg(arg),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "exp" => Expr::Exp(arg),
        "log" | "ln" => Expr::Ln(arg),
        _ => Expr::Abs(arg),
    };
    Ok((input, tree))
}
