//! # Primitive Operators
//!
//! Scalar comparison, membership, and recency operators. All of them
//! validate both sides as primitives (string/number/boolean) or primitive
//! arrays, and all are pure functions of `(data, condition)`.
//!
//! Comparison semantics:
//!
//! - Equality is *semantic* for numbers: `1` equals `1.0`.
//! - Ordering is the primitive's native one — numeric for numbers,
//!   lexicographic for strings, `false < true` for booleans. A
//!   mixed-type pair has no ordering and evaluates to `false`.
//! - `GTE`/`LTE` are composed from `Equals` and `GT`/`LT`; `Between`
//!   composes `GTE` and `LTE`. The base operators are the single source
//!   of comparison truth.

use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use serde_json::Value;

use caserule_core::OperatorId;
use caserule_schema::{shapes, CompiledShape};

use crate::error::RuleError;
use crate::operator::{compile_shape, Operator, OperatorDeps};

/// Semantic equality: numbers compare by value, everything else strictly.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => a == b,
    }
}

/// Native ordering on matching primitive types; `None` when incomparable.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn primitive_shapes(id: OperatorId) -> Result<(CompiledShape, CompiledShape), RuleError> {
    Ok((
        compile_shape(id, "primitive-condition", &shapes::primitive())?,
        compile_shape(id, "primitive-data", &shapes::primitive())?,
    ))
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

/// Strict equality.
#[derive(Debug)]
pub struct Equals {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl Equals {
    pub fn new() -> Result<Self, RuleError> {
        let (condition_shape, data_shape) = primitive_shapes(OperatorId::Equals)?;
        Ok(Self {
            condition_shape,
            data_shape,
        })
    }
}

#[async_trait]
impl Operator for Equals {
    fn id(&self) -> OperatorId {
        OperatorId::Equals
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(values_equal(data_value, condition_value))
    }
}

/// Strict inequality.
#[derive(Debug)]
pub struct NotEquals {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl NotEquals {
    pub fn new() -> Result<Self, RuleError> {
        let (condition_shape, data_shape) = primitive_shapes(OperatorId::NotEquals)?;
        Ok(Self {
            condition_shape,
            data_shape,
        })
    }
}

#[async_trait]
impl Operator for NotEquals {
    fn id(&self) -> OperatorId {
        OperatorId::NotEquals
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(!values_equal(data_value, condition_value))
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Greater-than on the primitive's native ordering.
#[derive(Debug)]
pub struct GreaterThan {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl GreaterThan {
    pub fn new() -> Result<Self, RuleError> {
        let (condition_shape, data_shape) = primitive_shapes(OperatorId::Gt)?;
        Ok(Self {
            condition_shape,
            data_shape,
        })
    }
}

#[async_trait]
impl Operator for GreaterThan {
    fn id(&self) -> OperatorId {
        OperatorId::Gt
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(matches!(
            compare_values(data_value, condition_value),
            Some(std::cmp::Ordering::Greater)
        ))
    }
}

/// Less-than on the primitive's native ordering.
#[derive(Debug)]
pub struct LessThan {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl LessThan {
    pub fn new() -> Result<Self, RuleError> {
        let (condition_shape, data_shape) = primitive_shapes(OperatorId::Lt)?;
        Ok(Self {
            condition_shape,
            data_shape,
        })
    }
}

#[async_trait]
impl Operator for LessThan {
    fn id(&self) -> OperatorId {
        OperatorId::Lt
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(matches!(
            compare_values(data_value, condition_value),
            Some(std::cmp::Ordering::Less)
        ))
    }
}

/// Greater-than-or-equal, composed as `Equals ∨ GreaterThan`.
#[derive(Debug)]
pub struct GreaterThanOrEqual {
    equals: Equals,
    greater_than: GreaterThan,
}

impl GreaterThanOrEqual {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            equals: Equals::new()?,
            greater_than: GreaterThan::new()?,
        })
    }
}

#[async_trait]
impl Operator for GreaterThanOrEqual {
    fn id(&self) -> OperatorId {
        OperatorId::Gte
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        self.equals.condition_shape()
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        self.equals.data_shape()
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(self.equals.evaluate(data_value, condition_value, deps).await?
            || self
                .greater_than
                .evaluate(data_value, condition_value, deps)
                .await?)
    }
}

/// Less-than-or-equal, composed as `Equals ∨ LessThan`.
#[derive(Debug)]
pub struct LessThanOrEqual {
    equals: Equals,
    less_than: LessThan,
}

impl LessThanOrEqual {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            equals: Equals::new()?,
            less_than: LessThan::new()?,
        })
    }
}

#[async_trait]
impl Operator for LessThanOrEqual {
    fn id(&self) -> OperatorId {
        OperatorId::Lte
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        self.equals.condition_shape()
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        self.equals.data_shape()
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(self.equals.evaluate(data_value, condition_value, deps).await?
            || self
                .less_than
                .evaluate(data_value, condition_value, deps)
                .await?)
    }
}

/// Inclusive range membership: `GTE(x, min) ∧ LTE(x, max)`.
#[derive(Debug)]
pub struct Between {
    gte: GreaterThanOrEqual,
    lte: LessThanOrEqual,
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl Between {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            gte: GreaterThanOrEqual::new()?,
            lte: LessThanOrEqual::new()?,
            condition_shape: compile_shape(OperatorId::Between, "range-condition", &shapes::range())?,
            data_shape: compile_shape(OperatorId::Between, "number-data", &shapes::number())?,
        })
    }
}

#[async_trait]
impl Operator for Between {
    fn id(&self) -> OperatorId {
        OperatorId::Between
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let min = condition_value.get("min").ok_or_else(|| {
            RuleError::validation_msg(self.id(), "range condition requires a min bound")
        })?;
        let max = condition_value.get("max").ok_or_else(|| {
            RuleError::validation_msg(self.id(), "range condition requires a max bound")
        })?;
        Ok(self.gte.evaluate(data_value, min, deps).await?
            && self.lte.evaluate(data_value, max, deps).await?)
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// Array membership by semantic equality.
#[derive(Debug)]
pub struct In {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl In {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            condition_shape: compile_shape(
                OperatorId::In,
                "primitive-array-condition",
                &shapes::primitive_array(),
            )?,
            data_shape: compile_shape(OperatorId::In, "primitive-data", &shapes::primitive())?,
        })
    }
}

#[async_trait]
impl Operator for In {
    fn id(&self) -> OperatorId {
        OperatorId::In
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let items = match condition_value.as_array() {
            Some(items) => items,
            None => return Ok(false),
        };
        Ok(items.iter().any(|item| values_equal(data_value, item)))
    }
}

/// Negated array membership.
#[derive(Debug)]
pub struct NotIn {
    membership: In,
}

impl NotIn {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            membership: In::new()?,
        })
    }
}

#[async_trait]
impl Operator for NotIn {
    fn id(&self) -> OperatorId {
        OperatorId::NotIn
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        self.membership.condition_shape()
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        self.membership.data_shape()
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        Ok(!self
            .membership
            .evaluate(data_value, condition_value, deps)
            .await?)
    }
}

/// Case-insensitive containment against a condition array.
///
/// The data side may be a scalar or an array (aggregated extraction).
/// A data element matches a condition item by lower-cased substring
/// containment when both are strings, and by exact equality otherwise;
/// the whole check is true iff any data element matches any condition
/// item. This is deliberately looser than set membership.
#[derive(Debug)]
pub struct InCaseInsensitive {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl InCaseInsensitive {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            condition_shape: compile_shape(
                OperatorId::InCaseInsensitive,
                "primitive-array-condition",
                &shapes::primitive_array(),
            )?,
            data_shape: compile_shape(
                OperatorId::InCaseInsensitive,
                "primitive-or-array-data",
                &shapes::primitive_or_array(),
            )?,
        })
    }
}

fn containment_matches(element: &Value, item: &Value) -> bool {
    match (element, item) {
        (Value::String(element), Value::String(item)) => {
            element.to_lowercase().contains(&item.to_lowercase())
        }
        _ => values_equal(element, item),
    }
}

#[async_trait]
impl Operator for InCaseInsensitive {
    fn id(&self) -> OperatorId {
        OperatorId::InCaseInsensitive
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let items = match condition_value.as_array() {
            Some(items) => items,
            None => return Ok(false),
        };
        let elements: &[Value] = match data_value {
            Value::Array(elements) => elements.as_slice(),
            other => std::slice::from_ref(other),
        };
        Ok(elements
            .iter()
            .any(|element| items.iter().any(|item| containment_matches(element, item))))
    }
}

// ---------------------------------------------------------------------------
// Recency
// ---------------------------------------------------------------------------

/// Date recency: true iff the data date falls within the last `years`
/// years, boundary truncated to start-of-day.
#[derive(Debug)]
pub struct LastYear {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl LastYear {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            condition_shape: compile_shape(
                OperatorId::LastYear,
                "year-window-condition",
                &shapes::year_window(),
            )?,
            data_shape: compile_shape(
                OperatorId::LastYear,
                "date-string-data",
                &shapes::non_empty_string(),
            )?,
        })
    }
}

fn parse_date_like(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?;
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[async_trait]
impl Operator for LastYear {
    fn id(&self) -> OperatorId {
        OperatorId::LastYear
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let years = condition_value
            .get("years")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                RuleError::validation_msg(self.id(), "recency condition requires integer years")
            })?;
        let date = parse_date_like(data_value).ok_or_else(|| {
            RuleError::validation_msg(
                self.id(),
                format!("expected a date-like string, got {data_value}"),
            )
        })?;

        let months = u32::try_from(years.saturating_mul(12)).map_err(|_| {
            RuleError::validation_msg(self.id(), format!("year window out of range: {years}"))
        })?;
        let boundary = Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| {
                RuleError::validation_msg(self.id(), format!("year window out of range: {years}"))
            })?;

        // Day-granular comparison: a date exactly `years` years ago counts.
        Ok(date >= boundary)
    }
}

// ---------------------------------------------------------------------------
// Exists (deprecated)
// ---------------------------------------------------------------------------

/// Non-emptiness check.
///
/// Deprecated: retained only because stored rule configurations still
/// reference it. New rules should state the expected shape explicitly
/// through a typed operator instead. When constructed with a shape, a
/// value that fails the shape makes the check false — the shape is part
/// of the truth value here, not a validation step.
#[derive(Debug)]
pub struct Exists {
    shape: Option<CompiledShape>,
}

impl Exists {
    pub fn new() -> Self {
        Self { shape: None }
    }

    /// Require the value to parse against the given shape as well.
    pub fn with_shape(shape: CompiledShape) -> Self {
        Self { shape: Some(shape) }
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

#[async_trait]
impl Operator for Exists {
    fn id(&self) -> OperatorId {
        OperatorId::Exists
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        _condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let conforms = match &self.shape {
            Some(shape) => shape.is_valid(data_value),
            None => true,
        };
        Ok(is_non_empty(data_value) && conforms)
    }
}
