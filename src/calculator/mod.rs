//! Arithmetic evaluation core
//!
//! A pure dispatch-and-evaluate engine: an operation tag plus an ordered
//! list of numeric arguments produce a single normalized number. The
//! evaluator holds no state and performs no I/O; the MCP layer is
//! responsible for translating failures into protocol-level errors.

#[cfg(test)]
mod tests;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

/// Argument count requirement for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// At least this many arguments.
    AtLeast(usize),
    /// Exactly this many arguments.
    Exactly(usize),
}

impl fmt::Display for Arity {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast(n) => write!(f, "at least {} arguments", n),
            Self::Exactly(n) => write!(f, "exactly {} arguments", n),
        }
    }
}

/// Errors produced by the evaluator. All three kinds are terminal for the
/// call; there is no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{operation} requires {expected}, got {actual}")]
    InvalidArgumentCount {
        operation: Operation,
        expected: Arity,
        actual: usize,
    },

    #[error("division by zero")]
    DivisionByZero,
}

/// A computed result, re-classified as integral when its value is whole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Operation {
    /// All operations, in registration order.
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
        Self::Modulo,
    ];

    /// Wire name of the operation.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Power => "power",
            Self::Modulo => "modulo",
        }
    }

    /// Required argument count for the operation.
    #[inline]
    pub fn arity(self) -> Arity {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide => Arity::AtLeast(2),
            Self::Power | Self::Modulo => Arity::Exactly(2),
        }
    }

    fn check_arity(self, actual: usize) -> Result<(), CalcError> {
        let expected = self.arity();
        let ok = match expected {
            Arity::AtLeast(n) => actual >= n,
            Arity::Exactly(n) => actual == n,
        };

        if ok {
            Ok(())
        } else {
            Err(CalcError::InvalidArgumentCount {
                operation: self,
                expected,
                actual,
            })
        }
    }
}

impl fmt::Display for Operation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            "power" => Ok(Self::Power),
            "modulo" => Ok(Self::Modulo),
            other => Err(CalcError::UnknownOperation(other.to_string())),
        }
    }
}

impl Number {
    /// Classify a computed value. Finite whole values that fit in `i64`
    /// become `Integer`; everything else stays `Float`.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        // Exclusive bound: 2^63 exactly. i64::MAX as f64 rounds up to this
        // value, so an inclusive check would let 2^63 through and saturate
        // the cast.
        const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
        if value.is_finite()
            && value.fract() == 0.0
            && value.abs() < I64_BOUND
        {
            Self::Integer(value as i64)
        } else {
            Self::Float(value)
        }
    }

    /// Numeric value regardless of representation.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Evaluate an operation over an ordered argument list.
///
/// Arity is validated before any computation. Chained division fails with
/// `DivisionByZero` the moment a zero divisor is seen, before performing
/// that division; the running quotient is discarded, never returned.
#[inline]
pub fn evaluate(operation: Operation, args: &[f64]) -> Result<Number, CalcError> {
    operation.check_arity(args.len())?;

    let result = match operation {
        Operation::Add => args.iter().sum(),
        Operation::Subtract => args[1..].iter().fold(args[0], |acc, arg| acc - arg),
        Operation::Multiply => args.iter().product(),
        Operation::Divide => {
            let mut acc = args[0];
            for &divisor in &args[1..] {
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                acc /= divisor;
            }
            acc
        }
        Operation::Power => args[0].powf(args[1]),
        Operation::Modulo => {
            if args[1] == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            args[0] % args[1]
        }
    };

    Ok(Number::from_f64(result))
}

/// Parse the operation name and evaluate in one step. This is the contract
/// the `calculate` tool exposes: unknown names fail before arity checks.
#[inline]
pub fn evaluate_named(method: &str, args: &[f64]) -> Result<Number, CalcError> {
    let operation = Operation::from_str(method)?;
    evaluate(operation, args)
}
