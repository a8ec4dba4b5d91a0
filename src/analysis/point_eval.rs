//! Value of the function at one point, with a human-readable derivation trail.
use crate::errors::{ParseError, PointFailure};
use crate::symbolic::expression::Expression;
use crate::symbolic::parse_expr::parse_point;
use crate::symbolic::symbolic_lambdify::compile;
use crate::symbolic::utils::format_number;
use log::debug;

/// f(a) and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct PointEvaluation {
    pub point: f64,
    /// NaN when f is undefined or not real at `point`
    pub value: f64,
    pub failure: Option<PointFailure>,
    pub trace: Vec<String>,
}

/// Substitutes `point`, simplifies, and evaluates numerically. Never fails: an undefined
/// value is NaN with the reason in the trace.
pub fn evaluate_at(expr: &Expression, point: f64) -> PointEvaluation {
    let var = expr.variable();
    let at = format_number(point);
    let mut trace = vec![format!("f({}) = {}", var, expr.tree().to_plain_string())];

    let substituted = expr.tree().set_variable(var, point);
    trace.push(format!(
        "Substitute {} = {}: f({}) = {}",
        var,
        at,
        at,
        substituted.to_plain_string()
    ));
    let simplified = substituted.simplify();
    if simplified != substituted {
        trace.push(format!("Simplify: f({}) = {}", at, simplified.to_plain_string()));
    }

    let outcome = compile(expr)
        .map_err(|err| {
            debug!("{} cannot be lowered: {}", expr, err);
            PointFailure::NotReal
        })
        .and_then(|callable| callable.evaluate(point));
    let (value, failure) = match outcome {
        Ok(value) => {
            trace.push(format!("Numeric value: f({}) = {}", at, format_number(value)));
            (value, None)
        }
        Err(failure) => {
            trace.push(format!(
                "f({}) is not a real number ({}); {} = {} is outside the domain.",
                at, failure, var, at
            ));
            (f64::NAN, Some(failure))
        }
    };
    PointEvaluation {
        point,
        value,
        failure,
        trace,
    }
}

/// Parses the requested point (`"2,5"`, `"pi/2"`, ...) and evaluates there.
pub fn evaluate_at_text(expr: &Expression, point: &str) -> Result<PointEvaluation, ParseError> {
    let point = parse_point(point)?;
    Ok(evaluate_at(expr, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::normalize;
    use approx::assert_relative_eq;

    #[test]
    fn test_trace_of_a_defined_point() {
        let expr = normalize("x^2 - 4").unwrap();
        let result = evaluate_at(&expr, 3.0);
        assert_eq!(result.value, 5.0);
        assert_eq!(result.failure, None);
        assert_eq!(result.trace.first().unwrap(), "f(x) = (x ^ 2) - 4");
        assert_eq!(result.trace[1], "Substitute x = 3: f(3) = (3 ^ 2) - 4");
        assert_eq!(result.trace[2], "Simplify: f(3) = 5");
        assert_eq!(result.trace.last().unwrap(), "Numeric value: f(3) = 5");
    }

    #[test]
    fn test_point_outside_domain() {
        let expr = normalize("log(x - 1)").unwrap();
        let result = evaluate_at(&expr, 0.0);
        assert!(result.value.is_nan());
        assert_eq!(result.failure, Some(PointFailure::NonPositiveLog));
        assert!(result.trace.last().unwrap().contains("outside the domain"));

        let reciprocal = normalize("1/x").unwrap();
        assert_eq!(
            evaluate_at(&reciprocal, 0.0).failure,
            Some(PointFailure::DivisionByZero)
        );
    }

    #[test]
    fn test_evaluate_at_text() {
        let expr = normalize("sin(x)").unwrap();
        let result = evaluate_at_text(&expr, "pi/2").unwrap();
        assert_relative_eq!(result.value, 1.0, epsilon = 1e-12);
        let result = evaluate_at_text(&normalize("2x").unwrap(), "1,5").unwrap();
        assert_eq!(result.value, 3.0);
        assert!(evaluate_at_text(&expr, "").is_err());
        assert!(evaluate_at_text(&expr, "x + 1").is_err());
    }
}
