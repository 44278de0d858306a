//! Static per-operation configuration and the operation table

use serde::Serialize;

use crate::error::{FieldError, ValidationError};
use crate::params::{FieldValue, ParamType, RequestParams};

/// One declared field of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Caller-facing field name
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Upstream query-parameter name
    pub query_key: &'static str,
}

impl ParamSpec {
    /// A field forwarded under its own name
    pub const fn new(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            query_key: name,
        }
    }

    /// A field forwarded under a different query-parameter name
    pub const fn renamed(name: &'static str, ty: ParamType, query_key: &'static str) -> Self {
        Self {
            name,
            ty,
            query_key,
        }
    }
}

/// Merges two validated fields into a single query parameter.
///
/// The value is `"{first},{second}"`; neither source field is emitted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombineRule {
    pub first: &'static str,
    pub second: &'static str,
    pub query_key: &'static str,
}

impl CombineRule {
    pub fn covers(&self, field: &str) -> bool {
        field == self.first || field == self.second
    }

    pub fn apply(&self, first: &FieldValue, second: &FieldValue) -> String {
        format!("{},{}", first, second)
    }
}

/// Fields of one invocation that passed validation, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedParams {
    fields: Vec<(&'static ParamSpec, FieldValue)>,
}

impl ValidatedParams {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(spec, _)| spec.name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static ParamSpec, &FieldValue)> {
        self.fields.iter().map(|(spec, value)| (*spec, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Static, read-only description of one logical operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    /// Operation identifier; also the caller-facing route segment
    pub name: &'static str,
    /// Path appended to the upstream base URL
    pub upstream_path: &'static str,
    pub required: &'static [ParamSpec],
    pub optional: &'static [ParamSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combine: Option<CombineRule>,
    /// Fixed text reported when the upstream call fails
    pub error_message: &'static str,
}

impl OperationSpec {
    /// Caller-facing route (e.g. "/reverse-geocode")
    pub fn route(&self) -> String {
        format!("/{}", self.name)
    }

    /// All declared fields, required first
    pub fn fields(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Query-parameter name for a declared field
    pub fn query_key(&self, field: &str) -> Option<&'static str> {
        self.fields().find(|p| p.name == field).map(|p| p.query_key)
    }

    /// Check `params` against this operation's schema.
    ///
    /// Every declared field is checked and all failures are reported together.
    /// Blank optional fields are dropped; undeclared fields are ignored.
    pub fn validate(&self, params: &RequestParams) -> Result<ValidatedParams, ValidationError> {
        let mut fields = Vec::with_capacity(self.required.len() + self.optional.len());
        let mut errors = Vec::new();

        for spec in self.required {
            match params.get(spec.name).map(|raw| spec.ty.coerce(raw)) {
                None | Some(Ok(None)) => errors.push(FieldError::required(spec.name)),
                Some(Ok(Some(value))) => fields.push((spec, value)),
                Some(Err(_)) => errors.push(FieldError::invalid(spec.name, spec.ty.expectation())),
            }
        }

        for spec in self.optional {
            match params.get(spec.name).map(|raw| spec.ty.coerce(raw)) {
                None | Some(Ok(None)) => {}
                Some(Ok(Some(value))) => fields.push((spec, value)),
                Some(Err(_)) => errors.push(FieldError::invalid(spec.name, spec.ty.expectation())),
            }
        }

        if errors.is_empty() {
            Ok(ValidatedParams { fields })
        } else {
            Err(ValidationError::new(errors))
        }
    }

    /// Outbound query pairs for validated fields, without the credential.
    ///
    /// Fields are renamed through their `query_key`. A combined pair is
    /// emitted at the position of the first field it covers.
    pub fn query_pairs(&self, validated: &ValidatedParams) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(validated.len());

        for (spec, value) in validated.iter() {
            match &self.combine {
                Some(rule) if rule.covers(spec.name) => {
                    if spec.name != rule.first {
                        continue;
                    }
                    if let (Some(first), Some(second)) =
                        (validated.get(rule.first), validated.get(rule.second))
                    {
                        pairs.push((rule.query_key.to_string(), rule.apply(first, second)));
                    }
                }
                _ => pairs.push((spec.query_key.to_string(), value.to_string())),
            }
        }

        pairs
    }
}

pub const GEOCODE: OperationSpec = OperationSpec {
    name: "geocode",
    upstream_path: "/geocode/json",
    required: &[ParamSpec::new("address", ParamType::String)],
    optional: &[],
    combine: None,
    error_message: "Unable to geocode address",
};

pub const REVERSE_GEOCODE: OperationSpec = OperationSpec {
    name: "reverse-geocode",
    upstream_path: "/geocode/json",
    required: &[
        ParamSpec::new("lat", ParamType::Number),
        ParamSpec::new("lng", ParamType::Number),
    ],
    optional: &[],
    combine: Some(CombineRule {
        first: "lat",
        second: "lng",
        query_key: "latlng",
    }),
    error_message: "Unable to reverse geocode coordinates",
};

pub const DIRECTIONS: OperationSpec = OperationSpec {
    name: "directions",
    upstream_path: "/directions/json",
    required: &[
        ParamSpec::new("origin", ParamType::String),
        ParamSpec::new("destination", ParamType::String),
    ],
    optional: &[],
    combine: None,
    error_message: "Unable to calculate directions",
};

pub const PLACE_SEARCH: OperationSpec = OperationSpec {
    name: "place-search",
    upstream_path: "/place/nearbysearch/json",
    required: &[
        // "lat,lng"
        ParamSpec::new("location", ParamType::String),
        // meters
        ParamSpec::new("radius", ParamType::Integer),
    ],
    optional: &[ParamSpec::new("type", ParamType::String)],
    combine: None,
    error_message: "Unable to search places",
};

pub const PLACE_DETAILS: OperationSpec = OperationSpec {
    name: "place-details",
    upstream_path: "/place/details/json",
    required: &[ParamSpec::new("place_id", ParamType::String)],
    optional: &[],
    combine: None,
    error_message: "Unable to get place details",
};

/// Every operation the gateway exposes
pub static OPERATIONS: [OperationSpec; 5] = [
    GEOCODE,
    REVERSE_GEOCODE,
    DIRECTIONS,
    PLACE_SEARCH,
    PLACE_DETAILS,
];

/// Look up an operation by name
pub fn find_operation(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("geocode", json!({"address": "1600 Amphitheatre Pkwy"}), &[("address", "1600 Amphitheatre Pkwy")])]
    #[case("reverse-geocode", json!({"lat": 12.5, "lng": -45.25}), &[("latlng", "12.5,-45.25")])]
    #[case("directions", json!({"origin": "Berlin", "destination": "Hamburg"}), &[("origin", "Berlin"), ("destination", "Hamburg")])]
    #[case("place-search", json!({"location": "1,2", "radius": 500}), &[("location", "1,2"), ("radius", "500")])]
    #[case("place-details", json!({"place_id": "ChIJN1t_tDeuEmsRUsoyG83frY4"}), &[("place_id", "ChIJN1t_tDeuEmsRUsoyG83frY4")])]
    fn test_query_pairs_per_operation(
        #[case] name: &str,
        #[case] body: serde_json::Value,
        #[case] expected: &[(&str, &str)],
    ) {
        let op = find_operation(name).unwrap();
        let params: RequestParams = serde_json::from_value(body).unwrap();
        let validated = op.validate(&params).unwrap();
        assert_eq!(op.query_pairs(&validated), pairs(expected));
    }

    #[test]
    fn test_reverse_geocode_drops_source_fields() {
        let params = RequestParams::new().with("lat", "12.5").with("lng", "-45.25");
        let validated = REVERSE_GEOCODE.validate(&params).unwrap();
        let query = REVERSE_GEOCODE.query_pairs(&validated);

        assert_eq!(query, pairs(&[("latlng", "12.5,-45.25")]));
        assert!(!query.iter().any(|(k, _)| k == "lat" || k == "lng"));
    }

    #[test]
    fn test_place_search_optional_type() {
        let params = RequestParams::new()
            .with("location", "1,2")
            .with("radius", 500);
        let validated = PLACE_SEARCH.validate(&params).unwrap();
        let query = PLACE_SEARCH.query_pairs(&validated);
        assert!(!query.iter().any(|(k, _)| k == "type"));

        let params = params.with("type", "restaurant");
        let validated = PLACE_SEARCH.validate(&params).unwrap();
        assert_eq!(
            PLACE_SEARCH.query_pairs(&validated),
            pairs(&[("location", "1,2"), ("radius", "500"), ("type", "restaurant")])
        );
    }

    #[test]
    fn test_blank_optional_field_is_omitted() {
        let params = RequestParams::new()
            .with("location", "1,2")
            .with("radius", "500")
            .with("type", "");
        let validated = PLACE_SEARCH.validate(&params).unwrap();
        assert!(validated.get("type").is_none());

        let params = params.with("type", serde_json::Value::Null);
        assert!(PLACE_SEARCH.validate(&params).unwrap().get("type").is_none());
    }

    #[test]
    fn test_invalid_optional_field_fails() {
        let params = RequestParams::new()
            .with("location", "1,2")
            .with("radius", 500)
            .with("type", 7);
        let err = PLACE_SEARCH.validate(&params).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["type"]);
        assert_eq!(err.errors()[0].message, "The type field must be a string.");
    }

    #[rstest]
    #[case("geocode", json!({}), &["address"])]
    #[case("reverse-geocode", json!({"lat": 1}), &["lng"])]
    #[case("reverse-geocode", json!({}), &["lat", "lng"])]
    #[case("directions", json!({"origin": "A", "destination": "  "}), &["destination"])]
    #[case("place-search", json!({"location": "1,2"}), &["radius"])]
    #[case("place-details", json!({"place_id": null}), &["place_id"])]
    fn test_missing_required_fields(
        #[case] name: &str,
        #[case] body: serde_json::Value,
        #[case] missing: &[&str],
    ) {
        let op = find_operation(name).unwrap();
        let params: RequestParams = serde_json::from_value(body).unwrap();
        let err = op.validate(&params).unwrap_err();

        assert_eq!(err.fields().collect::<Vec<_>>(), missing.to_vec());
        for e in err.errors() {
            assert_eq!(e.message, format!("The {} field is required.", e.field));
        }
    }

    #[test]
    fn test_wrong_types_reported_per_field() {
        let params = RequestParams::new()
            .with("lat", "north")
            .with("lng", "-45.25");
        let err = REVERSE_GEOCODE.validate(&params).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].message, "The lat field must be a number.");

        let params = RequestParams::new()
            .with("location", "1,2")
            .with("radius", "1.5");
        let err = PLACE_SEARCH.validate(&params).unwrap_err();
        assert_eq!(err.errors()[0].message, "The radius field must be an integer.");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let params = RequestParams::new()
            .with("address", "Main St")
            .with("key", "caller-supplied")
            .with("language", "de");
        let validated = GEOCODE.validate(&params).unwrap();
        assert_eq!(GEOCODE.query_pairs(&validated), pairs(&[("address", "Main St")]));
    }

    #[test]
    fn test_renamed_field_uses_query_key() {
        static FIELDS: [ParamSpec; 1] = [ParamSpec::renamed("id", ParamType::String, "place_id")];
        let op = OperationSpec {
            name: "details-by-id",
            upstream_path: "/place/details/json",
            required: &FIELDS,
            optional: &[],
            combine: None,
            error_message: "Unable to get place details",
        };
        assert_eq!(op.query_key("id"), Some("place_id"));

        let validated = op.validate(&RequestParams::new().with("id", "abc")).unwrap();
        assert_eq!(op.query_pairs(&validated), pairs(&[("place_id", "abc")]));
    }

    #[test]
    fn test_operation_table() {
        let names: Vec<_> = OPERATIONS.iter().map(|op| op.name).collect();
        assert_eq!(
            names,
            vec!["geocode", "reverse-geocode", "directions", "place-search", "place-details"]
        );
        assert_eq!(find_operation("place-search").unwrap().route(), "/place-search");
        assert_eq!(
            find_operation("reverse-geocode").unwrap().upstream_path,
            "/geocode/json"
        );
        assert!(find_operation("elevation").is_none());
    }

    #[test]
    fn test_operation_serializes_contract() {
        let value = serde_json::to_value(PLACE_SEARCH).unwrap();
        assert_eq!(value["name"], "place-search");
        assert_eq!(value["required"][1]["name"], "radius");
        assert_eq!(value["required"][1]["type"], "integer");
        assert_eq!(value["optional"][0]["name"], "type");
        assert!(value.get("combine").is_none());

        let value = serde_json::to_value(REVERSE_GEOCODE).unwrap();
        assert_eq!(value["combine"]["query_key"], "latlng");
    }
}
