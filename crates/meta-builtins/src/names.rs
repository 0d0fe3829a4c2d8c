//! Type and attribute names used by the built-in providers.

pub const TYPE_METADATA: &str = "metadata";
pub const TYPE_OBJECT: &str = "object";
pub const TYPE_FIELD: &str = "field";
pub const TYPE_VALIDATOR: &str = "validator";
pub const TYPE_VIEW: &str = "view";
pub const TYPE_IDENTITY: &str = "identity";
pub const TYPE_RELATIONSHIP: &str = "relationship";

// Attribute subtypes
pub const ATTR_STRING: &str = "string";
pub const ATTR_INT: &str = "int";
pub const ATTR_LONG: &str = "long";
pub const ATTR_DOUBLE: &str = "double";
pub const ATTR_BOOLEAN: &str = "boolean";
pub const ATTR_STRING_ARRAY: &str = "stringArray";

// Shared attributes
pub const DESCRIPTION: &str = "description";
pub const IS_ABSTRACT: &str = "isAbstract";

// Field attributes
pub const REQUIRED: &str = "required";
pub const DEFAULT_VALUE: &str = "defaultValue";
pub const DEFAULT_VIEW: &str = "defaultView";
pub const VALIDATION: &str = "validation";
pub const PATTERN: &str = "pattern";
pub const MIN_LENGTH: &str = "minLength";
pub const MAX_LENGTH: &str = "maxLength";
pub const MIN_VALUE: &str = "minValue";
pub const MAX_VALUE: &str = "maxValue";
pub const OBJECT_REF: &str = "objectRef";

// Object attributes
pub const EXTENDS: &str = "extends";
pub const IMPLEMENTS: &str = "implements";
pub const IS_INTERFACE: &str = "isInterface";

// Validator attributes
pub const MESSAGE: &str = "msg";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const MASK: &str = "mask";

// View attributes
pub const LABEL: &str = "label";

// Identity attributes
pub const FIELDS: &str = "fields";
pub const GENERATION: &str = "generation";

// Relationship attributes
pub const TARGET_OBJECT: &str = "targetObject";
pub const CARDINALITY: &str = "cardinality";
pub const REFERENCED_BY: &str = "referencedBy";
