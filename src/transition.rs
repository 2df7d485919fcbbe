//! Result types of binary operations.
//!
//! Numeric operands follow a fixed promotion table (see [`promote`]).
//! Anything else, opaque host values in particular, must be described by
//! a rule registered in a [`TransitionRegistry`]; rules are consulted
//! before the promotion table and may also rewrite the operator.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{CodegenError, Result};
use crate::operators::Operator;
use crate::types::{DataType, Kind, NumericType, TypeClass};

/// Builds the result type from the two operand types.
pub type TypeFactory = Arc<dyn Fn(&DataType, &DataType) -> DataType + Send + Sync>;

/// What a registered rule yields for one operator.
#[derive(Clone)]
pub struct Outcome {
    pub result: TypeFactory,
    /// Operator used in place of the requested one.
    pub operator: Option<Operator>,
}

impl Outcome {
    pub fn new(result: impl Fn(&DataType, &DataType) -> DataType + Send + Sync + 'static) -> Self {
        Self {
            result: Arc::new(result),
            operator: None,
        }
    }

    /// Result is always `ty`.
    pub fn fixed(ty: impl Into<DataType>) -> Self {
        let ty = ty.into();
        Self::new(move |_, _| ty.clone())
    }

    pub fn rewriting(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }
}

/// Outcomes for one pair of type classes.
#[derive(Clone, Default)]
pub struct TransitionRule {
    operators: HashMap<Operator, Outcome>,
    fallback: Option<Outcome>,
}

impl TransitionRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, operator: Operator, outcome: Outcome) -> Self {
        self.operators.insert(operator, outcome);
        self
    }

    /// Outcome for every operator without its own entry.
    pub fn otherwise(mut self, outcome: Outcome) -> Self {
        self.fallback = Some(outcome);
        self
    }

    pub fn outcome(&self, operator: Operator) -> Option<&Outcome> {
        self.operators.get(&operator).or(self.fallback.as_ref())
    }
}

#[derive(Clone, Default)]
pub struct TransitionRegistry {
    rules: HashMap<(TypeClass, TypeClass), TransitionRule>,
}

impl TransitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry without overrides.
    pub fn builtin() -> &'static TransitionRegistry {
        static BUILTIN: OnceLock<TransitionRegistry> = OnceLock::new();
        BUILTIN.get_or_init(TransitionRegistry::new)
    }

    /// Register `rule` for operands of classes `left` and `right`, in
    /// that order. Replaces any earlier rule for the same pair.
    pub fn register(&mut self, left: TypeClass, right: TypeClass, rule: TransitionRule) {
        self.rules.insert((left, right), rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Result type and effective operator of `left operator right`.
    pub fn transition(
        &self,
        left: &DataType,
        right: &DataType,
        operator: Operator,
    ) -> Result<(DataType, Operator)> {
        let key = (left.class(), right.class());
        if let Some(outcome) = self.rules.get(&key).and_then(|rule| rule.outcome(operator)) {
            let result = (outcome.result)(left, right);
            return Ok((result, outcome.operator.unwrap_or(operator)));
        }

        let error = || CodegenError::TypeTransition {
            left: left.to_string(),
            right: right.to_string(),
            operator: format!("{:?}", operator),
        };
        let (DataType::Numeric(a), DataType::Numeric(b)) = (left, right) else {
            return Err(error());
        };
        if operator != Operator::Index && !lanes_compatible(a, b) {
            return Err(error());
        }
        let result = match operator {
            Operator::Index => a.scalar(),
            Operator::Assign => a.vector(a.lanes),
            _ => promote(a, b).ok_or_else(error)?,
        };
        Ok((result.into(), operator))
    }
}

impl fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn lanes_compatible(a: &NumericType, b: &NumericType) -> bool {
    a.lanes == b.lanes || a.lanes == 1 || b.lanes == 1
}

/// Default numeric promotion.
///
/// - a vector operand makes the result a vector of its lane count; two
///   different lane counts have no result
/// - floating beats integer of equal or lesser width; against a wider
///   integer the result is floating at the integer's width
/// - otherwise the wider width wins, and among equal-width integers
///   unsigned wins
///
/// The result has natural alignment.
pub fn promote(a: &NumericType, b: &NumericType) -> Option<NumericType> {
    if !lanes_compatible(a, b) {
        return None;
    }
    let lanes = a.lanes.max(b.lanes);
    let element = match (a.kind, b.kind) {
        (Kind::Float, Kind::Int) => floating_over(a, b),
        (Kind::Int, Kind::Float) => floating_over(b, a),
        _ if a.width != b.width => {
            if a.width > b.width {
                *a
            } else {
                *b
            }
        }
        _ if !b.signed => *b,
        _ => *a,
    };
    Some(element.scalar().vector(lanes))
}

fn floating_over(float: &NumericType, int: &NumericType) -> NumericType {
    if float.width >= int.width {
        *float
    } else {
        float.with_width(int.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str) -> DataType {
        DataType::Numeric(name.parse().unwrap())
    }

    fn result(a: &str, b: &str, operator: Operator) -> Result<(DataType, Operator)> {
        TransitionRegistry::builtin().transition(&numeric(a), &numeric(b), operator)
    }

    #[test]
    fn test_promotion_table() {
        assert_eq!(result("i32", "i32", Operator::Add).unwrap().0, numeric("i32"));
        assert_eq!(result("i32", "f32", Operator::Add).unwrap().0, numeric("f32"));
        assert_eq!(result("i32x4", "i32", Operator::Mul).unwrap().0, numeric("i32x4"));
        assert_eq!(result("f32", "i16x8", Operator::Sub).unwrap().0, numeric("f32x8"));
        assert!(matches!(
            result("i32x4", "i32x8", Operator::Add),
            Err(CodegenError::TypeTransition { .. })
        ));
    }

    #[test]
    fn test_width_and_signedness() {
        assert_eq!(result("i16", "i64", Operator::Add).unwrap().0, numeric("i64"));
        assert_eq!(result("f64", "f32", Operator::Add).unwrap().0, numeric("f64"));
        assert_eq!(result("i32", "u32", Operator::Add).unwrap().0, numeric("u32"));
        assert_eq!(result("u16", "i16", Operator::Add).unwrap().0, numeric("u16"));
        // A float narrower than the integer widens to the integer's width.
        assert_eq!(result("f32", "i64", Operator::Add).unwrap().0, numeric("f64"));
        assert_eq!(result("u8", "f16", Operator::Add).unwrap().0, numeric("f16"));
    }

    #[test]
    fn test_result_has_natural_alignment() {
        let a = DataType::from("f32x4".parse::<NumericType>().unwrap().with_alignment(4));
        let (ty, _) = TransitionRegistry::builtin()
            .transition(&a, &numeric("f32"), Operator::Add)
            .unwrap();
        assert_eq!(ty.numeric().map(|ty| ty.alignment), Some(16));
    }

    #[test]
    fn test_index_and_assign() {
        assert_eq!(result("f64", "i32", Operator::Index).unwrap().0, numeric("f64"));
        assert_eq!(result("f32x8", "i32", Operator::Index).unwrap().0, numeric("f32"));
        assert_eq!(result("f32", "f64", Operator::Assign).unwrap().0, numeric("f32"));
        assert_eq!(result("f32x4", "f32", Operator::Assign).unwrap().0, numeric("f32x4"));
    }

    #[test]
    fn test_opaque_without_rule_fails() {
        let value = DataType::Opaque("VALUE".to_string());
        let err = TransitionRegistry::builtin()
            .transition(&value, &numeric("i32"), Operator::Assign)
            .unwrap_err();
        assert!(matches!(err, CodegenError::TypeTransition { .. }));
    }

    #[test]
    fn test_registered_rule_rewrites_operator() {
        let value = DataType::Opaque("VALUE".to_string());
        let mut registry = TransitionRegistry::new();
        registry.register(
            TypeClass::Opaque("VALUE".to_string()),
            TypeClass::Integer,
            TransitionRule::new()
                .on(
                    Operator::Assign,
                    Outcome::new(|left, _| left.clone()).rewriting(Operator::Eq),
                )
                .otherwise(Outcome::fixed(NumericType::int(64))),
        );
        assert_eq!(registry.len(), 1);

        let (ty, op) = registry.transition(&value, &numeric("i32"), Operator::Assign).unwrap();
        assert_eq!(ty, value);
        assert_eq!(op, Operator::Eq);

        let (ty, op) = registry.transition(&value, &numeric("i8"), Operator::Add).unwrap();
        assert_eq!(ty, numeric("i64"));
        assert_eq!(op, Operator::Add);

        // Rules are ordered: the reversed pair is not covered.
        assert!(registry.transition(&numeric("i32"), &value, Operator::Add).is_err());
    }

    #[test]
    fn test_rules_take_precedence_over_promotion() {
        let mut registry = TransitionRegistry::new();
        registry.register(
            TypeClass::Integer,
            TypeClass::Floating,
            TransitionRule::new().on(Operator::Div, Outcome::fixed(NumericType::float(64))),
        );
        let (ty, _) = registry
            .transition(&numeric("i32"), &numeric("f32"), Operator::Div)
            .unwrap();
        assert_eq!(ty, numeric("f64"));
        let (ty, _) = registry
            .transition(&numeric("i32"), &numeric("f32"), Operator::Mul)
            .unwrap();
        assert_eq!(ty, numeric("f32"));
    }
}
