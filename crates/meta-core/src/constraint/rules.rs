//! Kind-specific validation rules.
//!
//! A rule sees the value selected by its constraint's [`ValueSource`] (the
//! node value, or the node name) and, for uniqueness, the node's siblings.
//! Rules never mutate anything; a failed check yields a [`Rejection`] which the
//! enforcer turns into a [`ConstraintViolation`](super::ConstraintViolation).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::constraint::{ConstraintKind, Target, ValueSource};
use crate::error::{Error, Result};
use crate::type_id::NodeKey;
use crate::value::Value;

/// Why a rule rejected a value. The message has the value substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type RuleResult = std::result::Result<(), Rejection>;

/// A node already linked under the candidate's parent.
#[derive(Debug, Clone, Copy)]
pub struct Sibling<'a> {
    pub key: NodeKey<'a>,
    pub value: Option<&'a Value>,
}

/// Access to the siblings of a node under validation.
pub trait SiblingScan {
    /// Siblings in insertion order, excluding the node itself.
    fn siblings(&self) -> Vec<Sibling<'_>>;
}

/// Scan for nodes with no parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSiblings;

impl SiblingScan for NoSiblings {
    fn siblings(&self) -> Vec<Sibling<'_>> {
        Vec::new()
    }
}

impl SiblingScan for Vec<Sibling<'_>> {
    fn siblings(&self) -> Vec<Sibling<'_>> {
        self.clone()
    }
}

/// What a rule knows about the node beyond its value.
pub struct RuleContext<'a> {
    pub key: NodeKey<'a>,
    pub target: &'a Target,
    pub source: ValueSource,
    pub siblings: &'a dyn SiblingScan,
}

impl RuleContext<'_> {
    /// The value a sibling contributes under this context's value source.
    fn keyed_value(&self, sibling: &Sibling<'_>) -> Option<String> {
        match self.source {
            ValueSource::Name => Some(sibling.key.name.to_string()),
            ValueSource::Value => sibling.value.map(Value::to_string),
        }
    }
}

/// Kind-specific check run by a validation constraint.
pub trait ValidationRule: fmt::Debug + Send + Sync {
    fn kind(&self) -> ConstraintKind;

    fn check(&self, value: Option<&Value>, ctx: &RuleContext<'_>) -> RuleResult;
}

/// Stringified value must fully match a pattern.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: String,
    regex: Regex,
    allow_null: bool,
}

impl RegexRule {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            allow_null: false,
        })
    }

    /// Let missing values bypass the pattern.
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl ValidationRule for RegexRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Regex
    }

    fn check(&self, value: Option<&Value>, _ctx: &RuleContext<'_>) -> RuleResult {
        match value {
            None if self.allow_null => Ok(()),
            None => Err(Rejection::new(format!(
                "a value matching pattern {} is required",
                self.pattern
            ))),
            Some(v) => {
                let text = v.to_string();
                if self.regex.is_match(&text) {
                    Ok(())
                } else {
                    Err(Rejection::new(format!(
                        "value '{text}' does not match pattern {}",
                        self.pattern
                    )))
                }
            }
        }
    }
}

/// Value must be present and, for strings, not blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredRule;

impl ValidationRule for RequiredRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Required
    }

    fn check(&self, value: Option<&Value>, _ctx: &RuleContext<'_>) -> RuleResult {
        match value {
            None => Err(Rejection::new("a value is required")),
            Some(v) if v.is_blank() => Err(Rejection::new("value must not be blank")),
            Some(_) => Ok(()),
        }
    }
}

/// Character length within inclusive bounds.
#[derive(Debug, Clone, Copy)]
pub struct LengthRule {
    min: Option<usize>,
    max: Option<usize>,
    allow_null: bool,
}

impl LengthRule {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidRule {
            kind: ConstraintKind::Length,
            reason,
        };
        match (min, max) {
            (None, None) => Err(invalid("at least one bound is required".into())),
            (Some(lo), Some(hi)) if lo > hi => Err(invalid(format!("min {lo} exceeds max {hi}"))),
            _ => Ok(Self {
                min,
                max,
                allow_null: false,
            }),
        }
    }

    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    fn bounds(&self) -> String {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => format!("between {lo} and {hi}"),
            (Some(lo), None) => format!("at least {lo}"),
            (None, Some(hi)) => format!("at most {hi}"),
            (None, None) => "unbounded".into(),
        }
    }
}

impl ValidationRule for LengthRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Length
    }

    fn check(&self, value: Option<&Value>, _ctx: &RuleContext<'_>) -> RuleResult {
        let Some(v) = value else {
            return if self.allow_null {
                Ok(())
            } else {
                Err(Rejection::new(format!(
                    "a value of length {} is required",
                    self.bounds()
                )))
            };
        };
        let text = v.to_string();
        let len = text.chars().count();
        let too_short = self.min.is_some_and(|lo| len < lo);
        let too_long = self.max.is_some_and(|hi| len > hi);
        if too_short || too_long {
            Err(Rejection::new(format!(
                "value '{text}' has length {len}, expected {}",
                self.bounds()
            )))
        } else {
            Ok(())
        }
    }
}

/// One side of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

/// Numeric value within a range. Missing values pass.
#[derive(Debug, Clone, Copy)]
pub struct RangeRule {
    min: Option<Bound>,
    max: Option<Bound>,
}

impl RangeRule {
    /// Inclusive range; either side may be open.
    pub fn between(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidRule {
            kind: ConstraintKind::Range,
            reason,
        };
        match (min, max) {
            (None, None) => Err(invalid("at least one bound is required".into())),
            (Some(lo), Some(hi)) if lo > hi => Err(invalid(format!("min {lo} exceeds max {hi}"))),
            _ => Ok(Self {
                min: min.map(|value| Bound {
                    value,
                    inclusive: true,
                }),
                max: max.map(|value| Bound {
                    value,
                    inclusive: true,
                }),
            }),
        }
    }

    pub fn min_exclusive(mut self) -> Self {
        if let Some(bound) = self.min.as_mut() {
            bound.inclusive = false;
        }
        self
    }

    pub fn max_exclusive(mut self) -> Self {
        if let Some(bound) = self.max.as_mut() {
            bound.inclusive = false;
        }
        self
    }

    fn contains(&self, x: f64) -> bool {
        let above = self.min.is_none_or(|b| if b.inclusive { x >= b.value } else { x > b.value });
        let below = self.max.is_none_or(|b| if b.inclusive { x <= b.value } else { x < b.value });
        above && below
    }

    fn describe(&self) -> String {
        let lo = self.min.map_or("(-inf".to_string(), |b| {
            format!("{}{}", if b.inclusive { "[" } else { "(" }, b.value)
        });
        let hi = self.max.map_or("+inf)".to_string(), |b| {
            format!("{}{}", b.value, if b.inclusive { "]" } else { ")" })
        });
        format!("{lo}, {hi}")
    }
}

impl ValidationRule for RangeRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Range
    }

    fn check(&self, value: Option<&Value>, _ctx: &RuleContext<'_>) -> RuleResult {
        let Some(v) = value else {
            return Ok(());
        };
        match v.as_f64() {
            Some(x) if self.contains(x) => Ok(()),
            Some(_) => Err(Rejection::new(format!(
                "value {v} is outside range {}",
                self.describe()
            ))),
            None => Err(Rejection::new(format!("value '{v}' is not numeric"))),
        }
    }
}

/// Value must be one of a fixed set. Missing values pass.
#[derive(Debug, Clone)]
pub struct EnumRule {
    allowed: Vec<String>,
    normalized: HashSet<String>,
    case_sensitive: bool,
}

impl EnumRule {
    pub fn new<I, S>(allowed: I, case_sensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Err(Error::InvalidRule {
                kind: ConstraintKind::Enum,
                reason: "allowed value set is empty".into(),
            });
        }
        let normalized = allowed
            .iter()
            .map(|v| Self::fold(v, case_sensitive))
            .collect();
        Ok(Self {
            allowed,
            normalized,
            case_sensitive,
        })
    }

    fn fold(value: &str, case_sensitive: bool) -> String {
        if case_sensitive {
            value.to_string()
        } else {
            value.to_lowercase()
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl ValidationRule for EnumRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Enum
    }

    fn check(&self, value: Option<&Value>, _ctx: &RuleContext<'_>) -> RuleResult {
        let Some(v) = value else {
            return Ok(());
        };
        let text = v.to_string();
        if self.normalized.contains(&Self::fold(&text, self.case_sensitive)) {
            Ok(())
        } else {
            Err(Rejection::new(format!(
                "value '{text}' is not one of [{}]",
                self.allowed.join(", ")
            )))
        }
    }
}

/// No two siblings matching the same target may share a keyed value.
///
/// Checked against siblings already present, so the first of two conflicting
/// nodes is kept and the second is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniquenessRule;

impl ValidationRule for UniquenessRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Uniqueness
    }

    fn check(&self, value: Option<&Value>, ctx: &RuleContext<'_>) -> RuleResult {
        let Some(v) = value else {
            return Ok(());
        };
        let text = v.to_string();
        let duplicate = ctx
            .siblings
            .siblings()
            .into_iter()
            .filter(|s| ctx.target.matches(&s.key))
            .find(|s| ctx.keyed_value(s).as_deref() == Some(text.as_str()));
        match duplicate {
            Some(existing) => Err(Rejection::new(format!(
                "value '{text}' is already used by sibling {}",
                existing.key
            ))),
            None => Ok(()),
        }
    }
}

type Predicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// Caller-supplied predicate. `{value}` in the message is replaced with the
/// rejected value.
#[derive(Clone)]
pub struct CustomRule {
    message: String,
    predicate: Predicate,
}

impl CustomRule {
    pub fn new<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl ValidationRule for CustomRule {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Custom
    }

    fn check(&self, value: Option<&Value>, _ctx: &RuleContext<'_>) -> RuleResult {
        if (self.predicate)(value) {
            Ok(())
        } else {
            let shown = value.map(Value::to_string).unwrap_or_else(|| "null".into());
            Err(Rejection::new(self.message.replace("{value}", &shown)))
        }
    }
}
