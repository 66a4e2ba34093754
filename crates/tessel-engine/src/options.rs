//! Raw option shapes and their normalization into typed match records.
//!
//! Rules describe patterns with a bare string, a list of strings, or a
//! camelCase record. Each typed record has exactly one `from_raw`
//! normalization that either yields the canonical record or reports an
//! [`OptionsError`]. Predicates and the selector compiler only ever see the
//! typed records, so both agree on what an option means.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Options as written by a rule author.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawOptions {
    /// A single name.
    Name(String),
    /// A set of names.
    Names(Vec<String>),
    /// A full record.
    Record(RawRecord),
}

impl RawOptions {
    /// Deserializes raw options from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Malformed`] when the JSON has none of the
    /// accepted shapes or uses an unknown key.
    pub fn from_json(text: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<&str> for RawOptions {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<&[&str]> for RawOptions {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl From<RawRecord> for RawOptions {
    fn from(record: RawRecord) -> Self {
        Self::Record(record)
    }
}

/// The record form of [`RawOptions`]. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[expect(missing_docs, reason = "fields mirror the documented option keys")]
pub struct RawRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_arguments: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_arguments: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_spread_element: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_call: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_member: Option<bool>,
}

impl RawRecord {
    /// Returns the camelCase names of the keys that are set.
    fn present_keys(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("names", self.names.is_some()),
            ("argumentsLength", self.arguments_length.is_some()),
            ("minimumArguments", self.minimum_arguments.is_some()),
            ("maximumArguments", self.maximum_arguments.is_some()),
            ("allowSpreadElement", self.allow_spread_element.is_some()),
            ("optional", self.optional.is_some()),
            ("computed", self.computed.is_some()),
            ("property", self.property.is_some()),
            ("properties", self.properties.is_some()),
            ("object", self.object.is_some()),
            ("objects", self.objects.is_some()),
            ("method", self.method.is_some()),
            ("methods", self.methods.is_some()),
            ("optionalCall", self.optional_call.is_some()),
            ("optionalMember", self.optional_member.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, present)| present.then_some(key))
        .collect()
    }

    fn reject_keys_outside(&self, allowed: &[&str], target: &'static str) -> Result<(), OptionsError> {
        match self
            .present_keys()
            .into_iter()
            .find(|key| !allowed.contains(key))
        {
            Some(key) => Err(OptionsError::inapplicable(key, target)),
            None => Ok(()),
        }
    }

    fn arguments(&self) -> Result<ArgumentBounds, OptionsError> {
        ArgumentBounds::new(
            self.arguments_length,
            self.minimum_arguments.unwrap_or(0),
            self.maximum_arguments,
        )
    }
}

const ARGUMENT_KEYS: [&str; 4] = [
    "argumentsLength",
    "minimumArguments",
    "maximumArguments",
    "allowSpreadElement",
];

/// Merges a singular key and a plural key into one canonical name set.
/// Empty names are dropped; they can never match an identifier.
fn name_set(single: Option<&String>, many: Option<&Vec<String>>) -> BTreeSet<String> {
    single
        .into_iter()
        .chain(many.into_iter().flatten())
        .filter(|name| !name.is_empty())
        .cloned()
        .collect()
}

fn names_to_raw(names: &BTreeSet<String>) -> Option<Vec<String>> {
    (!names.is_empty()).then(|| names.iter().cloned().collect())
}

/// Argument-count constraints.
///
/// `exact` is checked first, then `min <= count <= max`. An absent `max` is
/// unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ArgumentBounds {
    exact: Option<usize>,
    min: usize,
    max: Option<usize>,
}

impl ArgumentBounds {
    /// Creates validated bounds.
    ///
    /// # Errors
    ///
    /// Returns an error when `min > max` or when `exact` lies outside
    /// `[min, max]`.
    pub fn new(exact: Option<usize>, min: usize, max: Option<usize>) -> Result<Self, OptionsError> {
        if let Some(upper) = max
            && min > upper
        {
            return Err(OptionsError::InvertedBounds { min, max: upper });
        }
        if let Some(count) = exact
            && (count < min || max.is_some_and(|upper| count > upper))
        {
            return Err(OptionsError::ExactOutsideBounds { exact: count });
        }
        Ok(Self { exact, min, max })
    }

    /// Bounds requiring exactly `count` arguments.
    #[must_use]
    pub const fn exactly(count: usize) -> Self {
        Self {
            exact: Some(count),
            min: 0,
            max: None,
        }
    }

    /// Returns the exact count, if any.
    #[must_use]
    pub const fn exact(&self) -> Option<usize> {
        self.exact
    }

    /// Returns the minimum count.
    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }

    /// Returns the maximum count, `None` when unbounded.
    #[must_use]
    pub const fn max(&self) -> Option<usize> {
        self.max
    }

    /// Returns whether `count` arguments satisfy the bounds.
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        self.exact.is_none_or(|exact| exact == count)
            && count >= self.min
            && self.max.is_none_or(|max| count <= max)
    }

    /// Returns how many leading arguments must not be spread: the finite
    /// maximum, else the exact count, else none.
    #[must_use]
    pub const fn spread_window(&self) -> Option<usize> {
        match self.max {
            Some(max) => Some(max),
            None => self.exact,
        }
    }
}

/// Options for `CallExpression` (and call-or-new) matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Allowed callee names; empty means any callee.
    pub names: BTreeSet<String>,
    /// Argument-count constraints.
    pub arguments: ArgumentBounds,
    /// Whether spread arguments inside the checked window are allowed.
    pub allow_spread: bool,
    /// Required optional-call state; `None` accepts both.
    pub optional: Option<bool>,
}

impl CallOptions {
    const TARGET: &'static str = "CallExpression";

    /// Normalizes raw options.
    ///
    /// # Errors
    ///
    /// Returns an error for inapplicable keys or contradictory bounds.
    pub fn from_raw(raw: &RawOptions) -> Result<Self, OptionsError> {
        match raw {
            RawOptions::Name(name) => Ok(Self::named(name_set(Some(name), None))),
            RawOptions::Names(names) => Ok(Self::named(name_set(None, Some(names)))),
            RawOptions::Record(record) => {
                let mut allowed = vec!["name", "names", "optional"];
                allowed.extend(ARGUMENT_KEYS);
                record.reject_keys_outside(&allowed, Self::TARGET)?;
                Ok(Self {
                    names: name_set(record.name.as_ref(), record.names.as_ref()),
                    arguments: record.arguments()?,
                    allow_spread: record.allow_spread_element.unwrap_or(false),
                    optional: record.optional,
                })
            }
        }
    }

    fn named(names: BTreeSet<String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// Returns the canonical raw record for these options.
    #[must_use]
    pub fn to_raw(&self) -> RawOptions {
        RawOptions::Record(RawRecord {
            names: names_to_raw(&self.names),
            optional: self.optional,
            ..arguments_to_raw(self.arguments, self.allow_spread)
        })
    }
}

fn arguments_to_raw(arguments: ArgumentBounds, allow_spread: bool) -> RawRecord {
    RawRecord {
        arguments_length: arguments.exact,
        minimum_arguments: (arguments.min > 0).then_some(arguments.min),
        maximum_arguments: arguments.max,
        allow_spread_element: allow_spread.then_some(true),
        ..RawRecord::default()
    }
}

/// Options for `NewExpression` matching.
///
/// There is no optional flag: `new` expressions cannot be optional, and
/// asking for one is rejected during normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewOptions {
    /// Allowed constructor names; empty means any callee.
    pub names: BTreeSet<String>,
    /// Argument-count constraints.
    pub arguments: ArgumentBounds,
    /// Whether spread arguments inside the checked window are allowed.
    pub allow_spread: bool,
}

impl NewOptions {
    const TARGET: &'static str = "NewExpression";

    /// Normalizes raw options.
    ///
    /// # Errors
    ///
    /// Returns an error for inapplicable keys (including `optional`) or
    /// contradictory bounds.
    pub fn from_raw(raw: &RawOptions) -> Result<Self, OptionsError> {
        let call = match raw {
            RawOptions::Record(record) if record.optional.is_some() => {
                return Err(OptionsError::inapplicable("optional", Self::TARGET));
            }
            RawOptions::Record(record) => {
                let mut allowed = vec!["name", "names"];
                allowed.extend(ARGUMENT_KEYS);
                record.reject_keys_outside(&allowed, Self::TARGET)?;
                CallOptions::from_raw(raw)?
            }
            _ => CallOptions::from_raw(raw)?,
        };
        Ok(Self {
            names: call.names,
            arguments: call.arguments,
            allow_spread: call.allow_spread,
        })
    }

    /// Returns the canonical raw record for these options.
    #[must_use]
    pub fn to_raw(&self) -> RawOptions {
        RawOptions::Record(RawRecord {
            names: names_to_raw(&self.names),
            ..arguments_to_raw(self.arguments, self.allow_spread)
        })
    }

    /// Views these options as call options with no optional requirement.
    #[must_use]
    pub fn as_call(&self) -> CallOptions {
        CallOptions {
            names: self.names.clone(),
            arguments: self.arguments,
            allow_spread: self.allow_spread,
            optional: None,
        }
    }
}

/// Options for `MemberExpression` matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberOptions {
    /// Allowed property names; empty means any property.
    pub properties: BTreeSet<String>,
    /// Allowed object names; empty means any object.
    pub objects: BTreeSet<String>,
    /// Required optional-member state; `None` accepts both.
    pub optional: Option<bool>,
    /// Required computed state; `None` accepts both.
    pub computed: Option<bool>,
}

impl MemberOptions {
    const TARGET: &'static str = "MemberExpression";

    /// Normalizes raw options.
    ///
    /// A non-empty property set implies `computed: false`.
    ///
    /// # Errors
    ///
    /// Returns an error for inapplicable keys, or when a property set is
    /// combined with `computed: true`.
    pub fn from_raw(raw: &RawOptions) -> Result<Self, OptionsError> {
        match raw {
            RawOptions::Name(name) => Self::build(name_set(Some(name), None), BTreeSet::new(), None, None),
            RawOptions::Names(names) => Self::build(name_set(None, Some(names)), BTreeSet::new(), None, None),
            RawOptions::Record(record) => {
                record.reject_keys_outside(
                    &["property", "properties", "object", "objects", "optional", "computed"],
                    Self::TARGET,
                )?;
                Self::build(
                    name_set(record.property.as_ref(), record.properties.as_ref()),
                    name_set(record.object.as_ref(), record.objects.as_ref()),
                    record.optional,
                    record.computed,
                )
            }
        }
    }

    fn build(
        properties: BTreeSet<String>,
        objects: BTreeSet<String>,
        optional: Option<bool>,
        computed: Option<bool>,
    ) -> Result<Self, OptionsError> {
        let computed = if properties.is_empty() {
            computed
        } else if computed == Some(true) {
            return Err(OptionsError::Contradiction {
                first: "properties",
                second: "computed",
            });
        } else {
            Some(false)
        };
        Ok(Self {
            properties,
            objects,
            optional,
            computed,
        })
    }

    /// Returns the canonical raw record for these options.
    #[must_use]
    pub fn to_raw(&self) -> RawOptions {
        RawOptions::Record(RawRecord {
            properties: names_to_raw(&self.properties),
            objects: names_to_raw(&self.objects),
            optional: self.optional,
            computed: self.computed,
            ..RawRecord::default()
        })
    }
}

/// Options for a call whose callee is a member expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodCallOptions {
    /// Constraints on the call. `call.names` is always empty.
    pub call: CallOptions,
    /// Constraints on the callee; `member.properties` are the method names.
    pub member: MemberOptions,
}

impl MethodCallOptions {
    const TARGET: &'static str = "method call";

    /// Normalizes raw options. A bare string or list names the methods.
    ///
    /// # Errors
    ///
    /// Returns an error for inapplicable keys or contradictory constraints.
    pub fn from_raw(raw: &RawOptions) -> Result<Self, OptionsError> {
        match raw {
            RawOptions::Name(_) | RawOptions::Names(_) => Ok(Self {
                call: CallOptions::default(),
                member: MemberOptions::from_raw(raw)?,
            }),
            RawOptions::Record(record) => {
                let mut allowed = vec![
                    "method",
                    "methods",
                    "object",
                    "objects",
                    "computed",
                    "optionalCall",
                    "optionalMember",
                ];
                allowed.extend(ARGUMENT_KEYS);
                record.reject_keys_outside(&allowed, Self::TARGET)?;
                let call = CallOptions {
                    names: BTreeSet::new(),
                    arguments: record.arguments()?,
                    allow_spread: record.allow_spread_element.unwrap_or(false),
                    optional: record.optional_call,
                };
                let member = MemberOptions::build(
                    name_set(record.method.as_ref(), record.methods.as_ref()),
                    name_set(record.object.as_ref(), record.objects.as_ref()),
                    record.optional_member,
                    record.computed,
                )?;
                Ok(Self { call, member })
            }
        }
    }

    /// Options matching calls of any of `methods`.
    #[must_use]
    pub fn methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let properties: BTreeSet<String> = methods
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();
        let computed = (!properties.is_empty()).then_some(false);
        Self {
            call: CallOptions::default(),
            member: MemberOptions {
                properties,
                computed,
                ..MemberOptions::default()
            },
        }
    }

    /// Returns the canonical raw record for these options.
    #[must_use]
    pub fn to_raw(&self) -> RawOptions {
        RawOptions::Record(RawRecord {
            methods: names_to_raw(&self.member.properties),
            objects: names_to_raw(&self.member.objects),
            computed: self.member.computed,
            optional_call: self.call.optional,
            optional_member: self.member.optional,
            ..arguments_to_raw(self.call.arguments, self.call.allow_spread)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(json: &str) -> RawOptions {
        RawOptions::from_json(json).expect("raw options")
    }

    #[rstest]
    #[case(RawOptions::from("reduce"))]
    #[case(RawOptions::from(&["reduce", "reduceRight"][..]))]
    #[case(record(r#"{ "names": ["b", "a", "a"], "argumentsLength": 2 }"#))]
    #[case(record(r#"{ "minimumArguments": 1, "maximumArguments": 2, "optional": false }"#))]
    #[case(record(r#"{ "name": "", "allowSpreadElement": true }"#))]
    fn call_normalization_is_idempotent(#[case] raw: RawOptions) {
        let once = CallOptions::from_raw(&raw).expect("normalize");
        let twice = CallOptions::from_raw(&once.to_raw()).expect("normalize again");
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case(RawOptions::from("map"))]
    #[case(record(r#"{ "methods": ["map"], "object": "arr", "optionalCall": true }"#))]
    #[case(record(r#"{ "computed": true, "optionalMember": false, "maximumArguments": 3 }"#))]
    fn method_normalization_is_idempotent(#[case] raw: RawOptions) {
        let once = MethodCallOptions::from_raw(&raw).expect("normalize");
        let twice = MethodCallOptions::from_raw(&once.to_raw()).expect("normalize again");
        assert_eq!(once, twice);
    }

    #[test]
    fn all_three_shapes_normalize_to_the_same_record() {
        let bare = CallOptions::from_raw(&RawOptions::from("fetch")).expect("bare");
        let list = CallOptions::from_raw(&RawOptions::from(&["fetch"][..])).expect("list");
        let object = CallOptions::from_raw(&record(r#"{ "name": "fetch" }"#)).expect("record");
        assert_eq!(bare, list);
        assert_eq!(list, object);
    }

    #[rstest]
    #[case(r#"{ "minimumArguments": 3, "maximumArguments": 2 }"#, OptionsError::InvertedBounds { min: 3, max: 2 })]
    #[case(r#"{ "argumentsLength": 4, "maximumArguments": 2 }"#, OptionsError::ExactOutsideBounds { exact: 4 })]
    #[case(r#"{ "argumentsLength": 0, "minimumArguments": 1 }"#, OptionsError::ExactOutsideBounds { exact: 0 })]
    #[case(r#"{ "property": "x" }"#, OptionsError::inapplicable("property", "CallExpression"))]
    fn contradictory_call_options_are_rejected(#[case] json: &str, #[case] expected: OptionsError) {
        assert_eq!(CallOptions::from_raw(&record(json)), Err(expected));
    }

    #[test]
    fn optional_is_rejected_for_new_expressions() {
        let result = NewOptions::from_raw(&record(r#"{ "name": "Map", "optional": false }"#));
        assert_eq!(
            result,
            Err(OptionsError::inapplicable("optional", "NewExpression"))
        );
    }

    #[test]
    fn properties_imply_non_computed_members() {
        let options = MemberOptions::from_raw(&RawOptions::from("length")).expect("normalize");
        assert_eq!(options.computed, Some(false));

        let contradiction = MemberOptions::from_raw(&record(r#"{ "property": "length", "computed": true }"#));
        assert!(matches!(contradiction, Err(OptionsError::Contradiction { .. })));
    }

    #[test]
    fn unknown_keys_fail_deserialization() {
        assert!(matches!(
            RawOptions::from_json(r#"{ "argumentLength": 1 }"#),
            Err(OptionsError::Malformed { .. })
        ));
    }

    #[rstest]
    #[case(ArgumentBounds::new(None, 1, Some(2)).expect("bounds"), &[(0, false), (1, true), (2, true), (3, false)])]
    #[case(ArgumentBounds::exactly(2), &[(1, false), (2, true), (3, false)])]
    #[case(ArgumentBounds::default(), &[(0, true), (7, true)])]
    fn bounds_accept_counts_at_their_boundaries(
        #[case] bounds: ArgumentBounds,
        #[case] expectations: &[(usize, bool)],
    ) {
        for (count, expected) in expectations {
            assert_eq!(bounds.accepts(*count), *expected, "count {count}");
        }
    }

    #[rstest]
    #[case(ArgumentBounds::exactly(2), Some(2))]
    #[case(ArgumentBounds::new(Some(1), 0, Some(3)).expect("bounds"), Some(3))]
    #[case(ArgumentBounds::new(None, 2, None).expect("bounds"), None)]
    fn spread_window_prefers_a_finite_maximum(
        #[case] bounds: ArgumentBounds,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(bounds.spread_window(), expected);
    }
}
