//! Tool-related types.

use serde_json::{Map, Value, json};

use super::ToolError;

/// The shape a single argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Non-empty string.
    String,
    /// Digits only, country code first (e.g. `254712345678`).
    PhoneNumber,
    /// Positive whole number of KES.
    Amount,
    /// `https://` URL.
    HttpsUrl,
}

const PHONE_DIGITS_MIN: usize = 9;
const PHONE_DIGITS_MAX: usize = 15;
/// Largest amount accepted, however it is written.
const MAX_AMOUNT: u64 = u32::MAX as u64;

impl ArgKind {
    fn check(self, name: &str, value: &Value) -> Result<(), String> {
        let ok = match self {
            Self::String => value.as_str().is_some_and(|s| !s.is_empty()),
            Self::PhoneNumber => value.as_str().is_some_and(is_phone_number),
            Self::Amount => amount(value).is_some(),
            Self::HttpsUrl => value
                .as_str()
                .and_then(|s| s.strip_prefix("https://"))
                .is_some_and(|rest| !rest.is_empty()),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("{name} must be {}", self.expectation()))
        }
    }

    fn expectation(self) -> String {
        match self {
            Self::String => "a non-empty string".to_string(),
            Self::PhoneNumber => {
                format!("a numeric string of {PHONE_DIGITS_MIN} to {PHONE_DIGITS_MAX} digits")
            }
            Self::Amount => "a positive whole number".to_string(),
            Self::HttpsUrl => "an https:// URL".to_string(),
        }
    }
}

fn is_phone_number(s: &str) -> bool {
    (PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_digit())
}

/// Whole positive amount, whether sent as `1` or `1.0`.
fn amount(value: &Value) -> Option<u64> {
    let n = match value.as_u64() {
        Some(n) => n,
        None => value
            .as_f64()
            .filter(|f| *f >= 1.0 && f.fract() == 0.0 && *f <= MAX_AMOUNT as f64)
            .map(|f| f as u64)?,
    };
    (1..=MAX_AMOUNT).contains(&n).then_some(n)
}

/// One declared argument of a tool.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgKind,
    pub required: bool,
    pub description: String,
}

impl ArgSpec {
    pub fn required(
        name: impl Into<String>,
        kind: ArgKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(
        name: impl Into<String>,
        kind: ArgKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// A tool definition exposed to callers.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub args: Vec<ArgSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Check `args` against the declared arguments.
    ///
    /// Missing required keys are reported first, in declaration order, then
    /// type mismatches, then undeclared keys. `null` counts as absent.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), String> {
        let present = |name: &str| args.get(name).filter(|v| !v.is_null());

        if let Some(missing) = self
            .args
            .iter()
            .find(|a| a.required && present(a.name.as_str()).is_none())
        {
            return Err(format!("missing {}", missing.name));
        }

        for arg in &self.args {
            if let Some(value) = present(arg.name.as_str()) {
                arg.kind.check(&arg.name, value)?;
            }
        }

        if let Some(unexpected) = args
            .keys()
            .find(|key| !self.args.iter().any(|a| &a.name == *key))
        {
            return Err(format!("unexpected argument: {unexpected}"));
        }

        Ok(())
    }

    /// Catalog entry: `{"description": .., "args": {name: description}}`.
    pub fn catalog_entry(&self) -> Value {
        let args: Map<String, Value> = self
            .args
            .iter()
            .map(|a| (a.name.clone(), Value::String(a.description.clone())))
            .collect();
        json!({
            "description": self.description,
            "args": args,
        })
    }
}

/// Typed accessors for arguments that already passed [`ToolSpec::validate`].
pub(crate) fn str_arg<'a>(
    args: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a str, ToolError> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing {name}")))
}

pub(crate) fn amount_arg(args: &Map<String, Value>, name: &str) -> Result<u64, ToolError> {
    args.get(name)
        .and_then(amount)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stk_spec() -> ToolSpec {
        ToolSpec::new("simulate_stk_push", "push")
            .arg(ArgSpec::required("phone_number", ArgKind::PhoneNumber, "phone"))
            .arg(ArgSpec::required("amount", ArgKind::Amount, "amount"))
            .arg(ArgSpec::required("description", ArgKind::String, "desc"))
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn push_args(phone_number: Value, amount: Value, description: &str) -> Map<String, Value> {
        args(json!({
            "phone_number": phone_number,
            "amount": amount,
            "description": description,
        }))
    }

    #[test]
    fn valid_args_pass() {
        let spec = stk_spec();
        let ok = push_args(json!("254712345678"), json!(1), "test");
        assert_eq!(spec.validate(&ok), Ok(()));
        let float = push_args(json!("254712345678"), json!(10.0), "x");
        assert_eq!(spec.validate(&float), Ok(()));
    }

    #[test]
    fn first_missing_in_declaration_order() {
        let spec = stk_spec();
        let partial = args(json!({"phone_number": "254712345678"}));
        assert_eq!(spec.validate(&partial), Err("missing amount".to_string()));

        let nothing = Map::new();
        assert_eq!(
            spec.validate(&nothing),
            Err("missing phone_number".to_string())
        );

        let null_amount = push_args(json!("254712345678"), Value::Null, "x");
        assert_eq!(
            spec.validate(&null_amount),
            Err("missing amount".to_string())
        );
    }

    #[test]
    fn wrong_types_are_named() {
        const PHONE: &str = "phone_number must be a numeric string of 9 to 15 digits";
        const AMOUNT: &str = "amount must be a positive whole number";
        const DESCRIPTION: &str = "description must be a non-empty string";

        let spec = stk_spec();
        let phone = json!("254712345678");
        for (bad, expected) in [
            (push_args(json!(254712345678u64), json!(1), "x"), PHONE),
            (push_args(json!("+254712345678"), json!(1), "x"), PHONE),
            (push_args(json!("2547"), json!(1), "x"), PHONE),
            (push_args(phone.clone(), json!(0), "x"), AMOUNT),
            (push_args(phone.clone(), json!(-5), "x"), AMOUNT),
            (push_args(phone.clone(), json!(1.5), "x"), AMOUNT),
            (push_args(phone.clone(), json!("1"), "x"), AMOUNT),
            (push_args(phone.clone(), json!(1), ""), DESCRIPTION),
        ] {
            assert_eq!(spec.validate(&bad), Err(expected.to_string()));
        }
    }

    #[test]
    fn amount_bound_is_the_same_for_integers_and_floats() {
        let max = u32::MAX as u64;
        assert_eq!(amount(&json!(max)), Some(max));
        assert_eq!(amount(&json!(max as f64)), Some(max));
        assert_eq!(amount(&json!(max + 1)), None);
        assert_eq!(amount(&json!((max + 1) as f64)), None);
        assert_eq!(amount(&json!(u64::MAX)), None);
    }

    #[test]
    fn undeclared_args_are_rejected() {
        let spec = stk_spec();
        let mut extra = push_args(json!("254712345678"), json!(1), "x");
        extra.insert("memo".to_string(), json!("y"));
        assert_eq!(
            spec.validate(&extra),
            Err("unexpected argument: memo".to_string())
        );
    }

    #[test]
    fn https_url_kind() {
        let spec = ToolSpec::new("register_callback_url", "register")
            .arg(ArgSpec::required("url", ArgKind::HttpsUrl, "url"));
        assert!(spec.validate(&args(json!({"url": "https://a.example/cb"}))).is_ok());
        assert_eq!(
            spec.validate(&args(json!({"url": "http://a.example/cb"}))),
            Err("url must be an https:// URL".to_string())
        );
        assert!(spec.validate(&args(json!({"url": "https://"}))).is_err());
    }

    #[test]
    fn optional_args_may_be_absent() {
        let spec = ToolSpec::new("t", "t").arg(ArgSpec::optional("note", ArgKind::String, "n"));
        assert!(spec.validate(&Map::new()).is_ok());
        assert!(spec.validate(&args(json!({"note": 3}))).is_err());
    }

    #[test]
    fn catalog_entry_shape() {
        let entry = stk_spec().catalog_entry();
        assert_eq!(entry["description"], "push");
        assert_eq!(entry["args"]["amount"], "amount");
        assert_eq!(entry["args"].as_object().unwrap().len(), 3);
    }

    #[test]
    fn accessors_read_validated_values() {
        let a = args(json!({"phone_number": "254712345678", "amount": 3.0}));
        assert_eq!(str_arg(&a, "phone_number").unwrap(), "254712345678");
        assert_eq!(amount_arg(&a, "amount").unwrap(), 3);
        assert!(str_arg(&a, "description").is_err());
    }
}
