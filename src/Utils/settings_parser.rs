//! parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
//! pairs key-vector of values, e.g.
//! ```text
//! range
//!   window: -20, 20
//!   step: 0.05
//! roots tolerance: 1e-8 max_roots: 5
//! ```
//! Lines starting with //, #, % or ; are comments.
use crate::errors::ConfigError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Vec<Value>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// Numeric view: integers are widened, everything else is `None`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// identifier: letter or underscore, then letters, digits, underscores
fn identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value runs up to a comma, whitespace or a semicolon
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    map_res(value_parser, |s: &str| -> Result<Value, String> {
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    })
    .parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_comma = delimited(space0, tag(","), space0);
    separated_list0(separator_comma, parse_value).parse(input)
}

/// key: value, value
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let (input, result) =
        separated_pair(identifier, colon_separator, parse_value_list).parse(input)?;
    Ok((input.trim_start(), result))
}

/// title followed by one or more key-value pairs
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, title) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, space0)).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document; a section repeated later extends the earlier one.
pub fn parse_document(input: &str) -> Result<DocumentMap, ConfigError> {
    let filtered = filter_comments(input);
    let mut result = DocumentMap::new();
    if filtered.trim().is_empty() {
        return Ok(result);
    }
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    let (remaining, sections) = parser
        .parse(filtered.as_str())
        .map_err(|_| ConfigError::Syntax(snippet(&filtered)))?;
    if !remaining.trim().is_empty() {
        return Err(ConfigError::Syntax(snippet(remaining)));
    }
    for (title, section) in sections {
        result.entry(title).or_default().extend(section);
    }
    Ok(result)
}

fn snippet(text: &str) -> String {
    text.trim().chars().take(24).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_kinds() {
        assert_eq!(parse_value("42").unwrap().1, Value::Integer(42));
        assert_eq!(parse_value("1e-6").unwrap().1, Value::Float(1e-6));
        assert_eq!(parse_value("-0.5,").unwrap(), (",", Value::Float(-0.5)));
        assert_eq!(parse_value("true").unwrap().1, Value::Boolean(true));
        assert_eq!(
            parse_value("bisection").unwrap().1,
            Value::String("bisection".to_string())
        );
    }

    #[test]
    fn test_parse_key_value_pair() {
        let (rest, (key, values)) = parse_key_value_pair("window: -20, 20 step: 0.1").unwrap();
        assert_eq!(key, "window");
        assert_eq!(values, vec![Value::Integer(-20), Value::Integer(20)]);
        assert_eq!(rest, "step: 0.1");
    }

    #[test]
    fn test_parse_document_single_line() {
        let doc = parse_document("range window: -20, 20 step: 0.05 roots tolerance: 1e-8").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["range"]["step"], vec![Value::Float(0.05)]);
        assert_eq!(
            doc["range"]["window"],
            vec![Value::Integer(-20), Value::Integer(20)]
        );
        assert_eq!(doc["roots"]["tolerance"], vec![Value::Float(1e-8)]);
    }

    #[test]
    fn test_parse_document_multiline_with_comments() {
        let text = "# plot settings\nsamples\n  window: -5, 5\n  step: 0.01\n\n// roots\nroots\n  max_roots: 3\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc["samples"]["window"][1].as_float(), Some(5.0));
        assert_eq!(doc["samples"]["step"][0].as_float(), Some(0.01));
        assert_eq!(doc["roots"]["max_roots"][0].as_integer(), Some(3));
    }

    #[test]
    fn test_empty_and_malformed_documents() {
        assert!(parse_document("   \n# nothing\n").unwrap().is_empty());
        assert!(matches!(
            parse_document("range : 1"),
            Err(ConfigError::Syntax(_))
        ));
        assert!(matches!(
            parse_document("range window"),
            Err(ConfigError::Syntax(_))
        ));
    }
}
