use super::*;
use std::str::FromStr;

#[test]
fn add_sums_all_arguments() {
    let result = evaluate(Operation::Add, &[1.0, 2.0, 3.0]).expect("add succeeds");
    assert_eq!(result, Number::Integer(6));
}

#[test]
fn add_is_permutation_invariant() {
    let orderings = [
        [1.5, 2.25, -3.0, 10.0],
        [10.0, -3.0, 2.25, 1.5],
        [-3.0, 10.0, 1.5, 2.25],
    ];

    let expected = evaluate(Operation::Add, &orderings[0]).expect("add succeeds");
    for args in &orderings[1..] {
        assert_eq!(evaluate(Operation::Add, args).expect("add succeeds"), expected);
    }
}

#[test]
fn subtract_folds_left_to_right() {
    let result = evaluate(Operation::Subtract, &[10.0, 3.0, 2.0]).expect("subtract succeeds");
    assert_eq!(result, Number::Integer(5));
}

#[test]
fn multiply_takes_product() {
    let result = evaluate(Operation::Multiply, &[2.0, 3.0, 4.0]).expect("multiply succeeds");
    assert_eq!(result, Number::Integer(24));
}

#[test]
fn multiply_is_permutation_invariant() {
    let a = evaluate(Operation::Multiply, &[2.0, 3.0, 4.0]).expect("multiply succeeds");
    let b = evaluate(Operation::Multiply, &[4.0, 2.0, 3.0]).expect("multiply succeeds");
    assert_eq!(a, b);
}

#[test]
fn divide_folds_left_to_right() {
    let result = evaluate(Operation::Divide, &[100.0, 5.0, 2.0]).expect("divide succeeds");
    assert_eq!(result, Number::Integer(10));
}

#[test]
fn power_of_two_numbers() {
    let result = evaluate(Operation::Power, &[2.0, 3.0]).expect("power succeeds");
    assert_eq!(result, Number::Integer(8));
}

#[test]
fn modulo_of_two_numbers() {
    let result = evaluate(Operation::Modulo, &[10.0, 3.0]).expect("modulo succeeds");
    assert_eq!(result, Number::Integer(1));
}

#[test]
fn whole_float_result_becomes_integer() {
    let result = evaluate(Operation::Divide, &[10.0, 2.0]).expect("divide succeeds");
    assert_eq!(result, Number::Integer(5));
}

#[test]
fn fractional_result_stays_float() {
    let result = evaluate(Operation::Divide, &[10.0, 3.0]).expect("divide succeeds");
    match result {
        Number::Float(value) => assert!((value - 10.0 / 3.0).abs() < 1e-12),
        Number::Integer(_) => panic!("expected float result"),
    }
}

#[test]
fn normalization_is_idempotent() {
    for value in [5.0, -2.5, 0.0, 1e18, f64::INFINITY] {
        let once = Number::from_f64(value);
        let twice = Number::from_f64(once.as_f64());
        assert_eq!(once, twice);
    }
}

#[test]
fn unknown_operation_is_rejected() {
    let err = Operation::from_str("exponent").expect_err("parse fails");
    assert_eq!(err, CalcError::UnknownOperation("exponent".to_string()));

    let err = evaluate_named("exponent", &[2.0, 3.0]).expect_err("evaluation fails");
    assert!(matches!(err, CalcError::UnknownOperation(_)));
}

#[test]
fn subtract_requires_two_arguments() {
    let err = evaluate(Operation::Subtract, &[1.0]).expect_err("arity check fails");
    assert!(matches!(
        err,
        CalcError::InvalidArgumentCount {
            operation: Operation::Subtract,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn add_requires_two_arguments() {
    let err = evaluate(Operation::Add, &[1.0]).expect_err("arity check fails");
    assert!(matches!(err, CalcError::InvalidArgumentCount { .. }));
}

#[test]
fn power_arity_is_exact() {
    let err = evaluate(Operation::Power, &[2.0]).expect_err("arity check fails");
    assert!(matches!(err, CalcError::InvalidArgumentCount { .. }));

    let err = evaluate(Operation::Power, &[2.0, 3.0, 4.0]).expect_err("arity check fails");
    assert!(matches!(
        err,
        CalcError::InvalidArgumentCount {
            operation: Operation::Power,
            expected: Arity::Exactly(2),
            actual: 3,
        }
    ));
}

#[test]
fn modulo_arity_is_exact() {
    let err = evaluate(Operation::Modulo, &[10.0]).expect_err("arity check fails");
    assert!(matches!(err, CalcError::InvalidArgumentCount { .. }));
}

#[test]
fn division_by_zero_fails() {
    let err = evaluate(Operation::Divide, &[10.0, 0.0]).expect_err("divide fails");
    assert_eq!(err, CalcError::DivisionByZero);
}

#[test]
fn chained_division_fails_fast_on_zero() {
    // The zero divisor aborts the call before the division by 5 happens;
    // no partial quotient is returned.
    let err = evaluate(Operation::Divide, &[10.0, 0.0, 5.0]).expect_err("divide fails");
    assert_eq!(err, CalcError::DivisionByZero);
}

#[test]
fn modulo_by_zero_fails() {
    let err = evaluate(Operation::Modulo, &[10.0, 0.0]).expect_err("modulo fails");
    assert_eq!(err, CalcError::DivisionByZero);
}

#[test]
fn negative_and_zero_inputs() {
    assert_eq!(
        evaluate(Operation::Add, &[-5.0, 3.0]).expect("add succeeds"),
        Number::Integer(-2)
    );
    assert_eq!(
        evaluate(Operation::Multiply, &[5.0, 0.0]).expect("multiply succeeds"),
        Number::Integer(0)
    );
    assert_eq!(
        evaluate(Operation::Multiply, &[1_000_000.0, 1_000_000.0]).expect("multiply succeeds"),
        Number::Integer(1_000_000_000_000)
    );
}

#[test]
fn huge_results_stay_float() {
    let result = evaluate(Operation::Power, &[10.0, 100.0]).expect("power succeeds");
    assert!(matches!(result, Number::Float(_)));
}

#[test]
fn values_at_the_i64_boundary_stay_float() {
    // 2^63 is whole and finite but one past i64::MAX; classifying it as
    // an integer would saturate the cast to 9223372036854775807.
    let two_to_63 = 9_223_372_036_854_775_808.0_f64;
    assert_eq!(Number::from_f64(two_to_63), Number::Float(two_to_63));
    assert_eq!(Number::from_f64(-two_to_63), Number::Float(-two_to_63));

    let half = 4_611_686_018_427_387_904.0_f64; // 2^62, exact in f64
    let result = evaluate(Operation::Add, &[half, half]).expect("add succeeds");
    assert_eq!(result, Number::Float(two_to_63));

    // The largest power of two below the boundary still normalizes.
    let below = 4_611_686_018_427_387_904_i64;
    assert_eq!(Number::from_f64(half), Number::Integer(below));
}

#[test]
fn number_serializes_untagged() {
    let int = serde_json::to_string(&Number::Integer(5)).expect("serializes");
    assert_eq!(int, "5");

    let float = serde_json::to_string(&Number::Float(2.5)).expect("serializes");
    assert_eq!(float, "2.5");
}

#[test]
fn every_operation_round_trips_through_its_name() {
    for operation in Operation::ALL {
        let parsed = Operation::from_str(operation.name()).expect("name parses");
        assert_eq!(parsed, operation);
    }
}

#[test]
fn error_messages_name_the_operation() {
    let err = evaluate(Operation::Power, &[2.0]).expect_err("arity check fails");
    let message = err.to_string();
    assert!(message.contains("power"));
    assert!(message.contains("exactly 2 arguments"));
}
