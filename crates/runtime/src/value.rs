//! The core value type used in the Tama runtime

use crate::{function::Function, value_key::ValueKey, Error, ErrorKind, Result};
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::{fmt, hash::BuildHasherDefault, rc::Rc};

/// The hasher used by [ValueMap]
pub type ValueHasher = BuildHasherDefault<FxHasher>;

/// The mapping type used by object values
///
/// Keyed by [ValueKey] so that the language's own hashing and equality rules
/// apply; iteration follows insertion order, which keeps formatted output
/// deterministic.
pub type ValueMap = IndexMap<ValueKey, Value, ValueHasher>;

/// The core value type for Tama
///
/// Aggregate variants share their underlying storage via reference counting,
/// all other variants have plain copy semantics.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The default type, representing the absence of a value
    ///
    /// Missing lookups produce Undefined, distinct from Null.
    #[default]
    Undefined,

    /// The explicit null value
    Null,

    /// A boolean
    Bool(bool),

    /// An integer
    Int(i64),

    /// A single-precision float, produced by float literals
    Float(f32),

    /// A double-precision float, produced only by host-created values
    Double(f64),

    /// A string
    Str(Rc<str>),

    /// An ordered sequence of values
    Array(Rc<Vec<Value>>),

    /// A mapping from value keys to values
    Object(Rc<ValueMap>),

    /// A shared handle to a function
    Function(Rc<Function>),
}

// The operations dispatched through the coercing binary op helpers
#[derive(Clone, Copy)]
enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

impl Value {
    /// Returns true if the value is Undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if the value is Null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is a String
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Returns true if the value is a Function
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns true if the value has one of the trivial tags (Bool, Int, Float, Double)
    pub fn is_trivial(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Double(_)
        )
    }

    /// Returns the value's type as a static string, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Returns the truthiness of the value
    ///
    /// Non-zero numerics and non-empty strings are true, Undefined, Null, and
    /// zero values are false. Arrays and Objects are always true.
    pub fn is_trueish(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Double(d) => *d != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Casts the value to a bool, trivial defaults for non-castable tags
    pub fn cast_bool(&self) -> bool {
        match self {
            Value::Undefined | Value::Null | Value::Array(_) | Value::Object(_)
            | Value::Function(_) => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Double(d) => *d != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Casts the value to an integer, trivial defaults for non-castable tags
    ///
    /// Strings are parsed as a leading decimal integer, yielding 0 when no
    /// digits are present.
    pub fn cast_int(&self) -> i64 {
        match self {
            Value::Undefined | Value::Null | Value::Array(_) | Value::Object(_)
            | Value::Function(_) => 0,
            Value::Bool(b) => *b as i64,
            Value::Int(i) => *i,
            Value::Float(f) => *f as i64,
            Value::Double(d) => *d as i64,
            Value::Str(s) => str_to_int(s),
        }
    }

    /// Casts the value to a float, trivial defaults for non-castable tags
    pub fn cast_float(&self) -> f32 {
        match self {
            Value::Undefined | Value::Null | Value::Array(_) | Value::Object(_)
            | Value::Function(_) => 0.0,
            Value::Bool(b) => *b as u8 as f32,
            Value::Int(i) => *i as f32,
            Value::Float(f) => *f,
            Value::Double(d) => *d as f32,
            Value::Str(s) => str_to_double(s) as f32,
        }
    }

    /// Casts the value to a double, trivial defaults for non-castable tags
    pub fn cast_double(&self) -> f64 {
        match self {
            Value::Undefined | Value::Null | Value::Array(_) | Value::Object(_)
            | Value::Function(_) => 0.0,
            Value::Bool(b) => *b as u8 as f64,
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f as f64,
            Value::Double(d) => *d,
            Value::Str(s) => str_to_double(s),
        }
    }

    /// Casts the value to its plain string form
    pub fn cast_string(&self) -> String {
        self.to_string()
    }

    /// Casts the value to an array, failing for any other tag
    pub fn cast_array(&self) -> Result<Rc<Vec<Value>>> {
        match self {
            Value::Array(array) => Ok(array.clone()),
            other => Err(Error::new(ErrorKind::BadValueCast {
                from: other.type_name(),
                to: "array",
            })),
        }
    }

    /// Casts the value to an object, failing for any other tag
    pub fn cast_object(&self) -> Result<Rc<ValueMap>> {
        match self {
            Value::Object(object) => Ok(object.clone()),
            other => Err(Error::new(ErrorKind::BadValueCast {
                from: other.type_name(),
                to: "object",
            })),
        }
    }

    /// The `+` operator
    pub fn add(&self, other: &Value) -> Result<Value> {
        self.arithmetic_op(other, ArithmeticOp::Add)
    }

    /// The `-` operator
    pub fn subtract(&self, other: &Value) -> Result<Value> {
        self.arithmetic_op(other, ArithmeticOp::Subtract)
    }

    /// The `*` operator
    pub fn multiply(&self, other: &Value) -> Result<Value> {
        self.arithmetic_op(other, ArithmeticOp::Multiply)
    }

    /// The `/` operator
    pub fn divide(&self, other: &Value) -> Result<Value> {
        self.arithmetic_op(other, ArithmeticOp::Divide)
    }

    // Same-tag operands use the natural operator, mixed tags coerce the right
    // operand to the left operand's tag first.
    fn arithmetic_op(&self, other: &Value, op: ArithmeticOp) -> Result<Value> {
        let unimplemented = || {
            Err(Error::new(ErrorKind::UnimplementedOperation {
                op: op.as_str(),
                lhs: self.type_name(),
                rhs: other.type_name(),
            }))
        };

        match self {
            Value::Undefined => Ok(Value::Undefined),
            Value::Null => Ok(Value::Null),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => unimplemented(),
            Value::Bool(_) => Ok(Value::Undefined),
            Value::Str(lhs) => match op {
                ArithmeticOp::Add => {
                    let rhs = match other {
                        Value::Str(rhs) => rhs.to_string(),
                        other => other.cast_string(),
                    };
                    let mut result = lhs.to_string();
                    result.push_str(&rhs);
                    Ok(Value::Str(result.into()))
                }
                _ => Ok(Value::Undefined),
            },
            Value::Int(lhs) => {
                let rhs = other.cast_int();
                let result = match op {
                    ArithmeticOp::Add => lhs.wrapping_add(rhs),
                    ArithmeticOp::Subtract => lhs.wrapping_sub(rhs),
                    ArithmeticOp::Multiply => lhs.wrapping_mul(rhs),
                    ArithmeticOp::Divide => {
                        if rhs == 0 {
                            return Err(Error::new(ErrorKind::DivisionByZero));
                        }
                        lhs.wrapping_div(rhs)
                    }
                };
                Ok(Value::Int(result))
            }
            Value::Float(lhs) => {
                let rhs = other.cast_float();
                let result = match op {
                    ArithmeticOp::Add => lhs + rhs,
                    ArithmeticOp::Subtract => lhs - rhs,
                    ArithmeticOp::Multiply => lhs * rhs,
                    ArithmeticOp::Divide => lhs / rhs,
                };
                Ok(Value::Float(result))
            }
            Value::Double(lhs) => {
                let rhs = other.cast_double();
                let result = match op {
                    ArithmeticOp::Add => lhs + rhs,
                    ArithmeticOp::Subtract => lhs - rhs,
                    ArithmeticOp::Multiply => lhs * rhs,
                    ArithmeticOp::Divide => lhs / rhs,
                };
                Ok(Value::Double(result))
            }
        }
    }

    /// The `<` operator
    ///
    /// Within a shared numeric tag this is the natural comparison; across tags
    /// the right operand is coerced, and numeric-looking strings compare as
    /// numbers.
    pub fn less_than(&self, other: &Value) -> bool {
        match self {
            Value::Undefined | Value::Null => !(other.is_undefined() || other.is_null()),
            Value::Array(_) => match other {
                Value::Array(_) => false,
                other => other.is_trivial() && other.cast_int() > 1,
            },
            Value::Object(_) => match other {
                Value::Object(_) => false,
                other => other.is_trivial() && other.cast_int() > 1,
            },
            Value::Str(lhs) => match other {
                Value::Str(rhs) => lhs < rhs,
                other if other.is_trivial() && is_integer_string(lhs) => {
                    str_to_int(lhs) < other.cast_int()
                }
                _ => false,
            },
            Value::Function(lhs) => match other {
                Value::Function(rhs) => lhs.name < rhs.name,
                _ => false,
            },
            Value::Bool(lhs) => match other {
                Value::Bool(rhs) => lhs < rhs,
                other if other.is_trivial() => !*lhs && other.cast_bool(),
                _ => false,
            },
            Value::Int(lhs) => match other {
                Value::Int(rhs) => lhs < rhs,
                other if other.is_trivial() => *lhs < other.cast_int(),
                Value::Str(rhs) if is_integer_string(rhs) => *lhs < str_to_int(rhs),
                _ => false,
            },
            Value::Float(lhs) => match other {
                Value::Float(rhs) => lhs < rhs,
                other if other.is_trivial() => *lhs < other.cast_float(),
                Value::Str(rhs) if is_numeric_string(rhs) => *lhs < str_to_double(rhs) as f32,
                _ => false,
            },
            Value::Double(lhs) => match other {
                Value::Double(rhs) => lhs < rhs,
                other if other.is_trivial() => *lhs < other.cast_double(),
                Value::Str(rhs) if is_numeric_string(rhs) => *lhs < str_to_double(rhs),
                _ => false,
            },
        }
    }

    /// Renders the value into its formatted form
    ///
    /// Strings are quoted, arrays and objects render their contents with
    /// formatted elements and a trailing comma; other variants equal their
    /// plain string form.
    pub fn to_formatted_string(&self) -> String {
        match self {
            Value::Str(s) => format!("\"{s}\""),
            Value::Array(array) => {
                let mut contents = String::new();
                for element in array.iter() {
                    if !contents.is_empty() {
                        contents.push(' ');
                    }
                    contents.push_str(&element.to_formatted_string());
                    contents.push(',');
                }
                format!("[{contents}]")
            }
            Value::Object(object) => {
                let mut contents = String::new();
                for (key, value) in object.iter() {
                    if !contents.is_empty() {
                        contents.push(' ');
                    }
                    contents.push_str(&key.value().to_formatted_string());
                    contents.push(':');
                    contents.push_str(&value.to_formatted_string());
                    contents.push(',');
                }
                format!("[{contents}]")
            }
            other => other.to_string(),
        }
    }
}

/// Equality follows the language rules: differing tags are unequal (Undefined
/// and Null are only equal to themselves), floats compare with an epsilon of
/// 1e-9, and aggregates compare structurally so that equality is reflexive.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Undefined, Undefined) => true,
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => (a - b).abs() < 1e-9,
            (Double(a), Double(b)) => (a - b).abs() < 1e-9,
            (Str(a), Str(b)) => a == b,
            (Array(a), Array(b)) => a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a == b),
            (Object(a), Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|other| value == other))
            }
            (Function(a), Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The plain string form of a value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Array(_) => f.write_str("Array"),
            Value::Object(_) => f.write_str("Object"),
            Value::Function(_) => f.write_str("Function"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(float) => write!(f, "{float}"),
            Value::Double(d) => write!(f, "{d}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(Rc::new(value))
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Self::Object(Rc::new(value))
    }
}

impl From<Rc<Function>> for Value {
    fn from(value: Rc<Function>) -> Self {
        Self::Function(value)
    }
}

/// Returns true if every character in the string is a decimal digit
///
/// An empty string also counts as numeric.
pub(crate) fn is_integer_string(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

// A string is numeric if it's all digits, or all digits with a single '.'
pub(crate) fn is_numeric_string(s: &str) -> bool {
    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
    digits == s.chars().count()
        || (digits == s.chars().count().saturating_sub(1) && s.contains('.'))
}

// Parses a leading decimal integer, strtol-style: optional whitespace and
// sign, then a digit run; anything else yields 0.
pub(crate) fn str_to_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digit_count = digits.chars().take_while(|c| c.is_ascii_digit()).count();
    digits[..digit_count].parse::<i64>().unwrap_or(0) * sign
}

// Parses a leading decimal float, strtod-style
pub(crate) fn str_to_double(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_point = false;
    for (i, c) in s.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '.' if !seen_point => seen_point = true,
            c if c.is_ascii_digit() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    s[..end].parse().unwrap_or(0.0)
}
