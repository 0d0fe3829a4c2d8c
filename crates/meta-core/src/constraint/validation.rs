use std::sync::Arc;

use crate::constraint::rules::{
    CustomRule, EnumRule, LengthRule, RangeRule, RegexRule, RequiredRule, RuleContext, RuleResult,
    SiblingScan, UniquenessRule, ValidationRule,
};
use crate::constraint::Target;
use crate::error::Result;
use crate::type_id::NodeKey;
use crate::value::Value;

/// What a validation constraint inspects on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueSource {
    /// The node's value.
    #[default]
    Value,
    /// The node's name, e.g. for identifier naming rules.
    Name,
}

/// A value rule bound to the nodes it targets.
#[derive(Debug, Clone)]
pub struct ValidationConstraint {
    id: String,
    description: String,
    target: Target,
    source: ValueSource,
    rule: Arc<dyn ValidationRule>,
}

impl ValidationConstraint {
    pub fn new(id: impl Into<String>, target: Target, rule: impl ValidationRule + 'static) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            target,
            source: ValueSource::Value,
            rule: Arc::new(rule),
        }
    }

    pub fn regex(id: impl Into<String>, target: Target, pattern: &str) -> Result<Self> {
        Ok(Self::new(id, target, RegexRule::new(pattern)?))
    }

    pub fn required(id: impl Into<String>, target: Target) -> Self {
        Self::new(id, target, RequiredRule)
    }

    pub fn length(
        id: impl Into<String>,
        target: Target,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<Self> {
        Ok(Self::new(id, target, LengthRule::new(min, max)?))
    }

    pub fn range(id: impl Into<String>, target: Target, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        Ok(Self::new(id, target, RangeRule::between(min, max)?))
    }

    pub fn one_of<I, S>(id: impl Into<String>, target: Target, allowed: I, case_sensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(id, target, EnumRule::new(allowed, case_sensitive)?))
    }

    pub fn unique(id: impl Into<String>, target: Target) -> Self {
        Self::new(id, target, UniquenessRule)
    }

    pub fn custom<F>(id: impl Into<String>, target: Target, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self::new(id, target, CustomRule::new(message, predicate))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate the node name instead of its value.
    pub fn on_name(mut self) -> Self {
        self.source = ValueSource::Name;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn source(&self) -> ValueSource {
        self.source
    }

    pub fn rule(&self) -> &dyn ValidationRule {
        self.rule.as_ref()
    }

    pub fn applies_to(&self, key: &NodeKey<'_>) -> bool {
        self.target.matches(key)
    }

    /// The value this constraint inspects for a node.
    pub fn sourced_value(&self, key: &NodeKey<'_>, value: Option<&Value>) -> Option<Value> {
        match self.source {
            ValueSource::Value => value.cloned(),
            ValueSource::Name => Some(Value::from(key.name)),
        }
    }

    /// Run the rule for a node.
    pub fn validate(&self, key: NodeKey<'_>, value: Option<&Value>, siblings: &dyn SiblingScan) -> RuleResult {
        let ctx = RuleContext {
            key,
            target: &self.target,
            source: self.source,
            siblings,
        };
        match self.source {
            ValueSource::Value => self.rule.check(value, &ctx),
            ValueSource::Name => self.rule.check(Some(&Value::from(key.name)), &ctx),
        }
    }
}
