//! Adversarial tests: hostile payloads and broken artifacts.

use proptest::prelude::*;
use serde_json::{json, Value};
use txsentry_core::schema::FEATURE_COLUMNS;
use txsentry_core::{ArtifactError, InferenceError, InferenceService, PredictError, ValidationError};
use txsentry_tests::helpers::*;

// ── Payloads ─────────────────────────────────────────────────────────────────

#[test]
fn each_missing_field_is_named() {
    let service = demo_service();
    for name in FEATURE_COLUMNS {
        let mut raw = scenario();
        raw.as_object_mut().unwrap().remove(name);
        let err = service.predict(&raw).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err, PredictError::Validation(ValidationError::MissingFields(vec![name.to_string()])));
    }
}

#[test]
fn each_non_numeric_field_is_rejected() {
    let service = demo_service();
    for name in FEATURE_COLUMNS {
        let mut raw = scenario();
        raw[name] = json!("not-a-number");
        match service.predict(&raw).unwrap_err() {
            PredictError::Validation(ValidationError::InvalidType { field, .. }) => assert_eq!(field, name),
            other => panic!("unexpected error for {name}: {other}"),
        }
    }
}

#[test]
fn structured_values_are_rejected() {
    let service = demo_service();
    for bad in [json!(null), json!(true), json!([1.0]), json!({ "v": 1.0 })] {
        let mut raw = scenario();
        raw["account_age_days"] = bad;
        assert!(service.predict(&raw).unwrap_err().is_client_error());
    }
}

#[test]
fn non_object_bodies_report_every_field_missing() {
    let service = demo_service();
    for body in ["[]", "42", "\"text\"", "null", "{}", "   "] {
        let err = service.predict_body(body.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            PredictError::Validation(ValidationError::MissingFields(
                FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
            )),
            "body {body:?}"
        );
    }
}

#[test]
fn truncated_json_is_malformed() {
    let err = demo_service().predict_body(b"{\"tx_value_eth\": ").unwrap_err();
    assert!(matches!(err, PredictError::MalformedBody(_)));
    assert!(!err.is_client_error());
}

#[test]
fn overflowing_string_is_rejected() {
    let mut raw = scenario();
    raw["tx_value_eth"] = json!("1e400");
    assert!(demo_service().predict(&raw).unwrap_err().is_client_error());
}

#[test]
fn value_that_overflows_scaling_is_server_error() {
    // Finite on input, but (x - mean) / scale exceeds f64::MAX.
    let mut raw = scenario();
    raw["tx_value_eth"] = json!(1.0e308);
    let err = demo_service().predict(&raw).unwrap_err();
    assert_eq!(err, PredictError::Inference(InferenceError::NonFinite { stage: "scaler" }));
    assert!(!err.is_client_error());
}

#[test]
fn extra_keys_do_not_change_the_verdict() {
    let service = demo_service();
    let mut raw = scenario();
    raw["memo"] = json!("hello");
    raw["is_fraud"] = json!(true);
    assert_eq!(service.predict(&raw).unwrap(), service.predict(&scenario()).unwrap());
}

proptest! {
    #[test]
    fn any_finite_input_yields_bounded_verdict(
        values in prop::array::uniform6(-1.0e6f64..1.0e6),
    ) {
        let service = demo_service();
        let raw: Value = FEATURE_COLUMNS
            .iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect::<serde_json::Map<_, _>>()
            .into();
        let result = service.predict(&raw).unwrap();
        prop_assert!((0.0..=100.0).contains(&result.fraud_probability));
        prop_assert_eq!(result.is_fraud, result.fraud_probability > 50.0);
    }
}

// ── Artifacts ────────────────────────────────────────────────────────────────

fn load(scaler: &Value, model: &Value) -> Result<InferenceService, ArtifactError> {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifacts(dir.path(), scaler, model);
    InferenceService::load(&paths)
}

fn good_scaler() -> Value {
    standard_scaler_json([0.0; 6], [1.0; 6])
}

fn good_model() -> Value {
    logistic_json([0.1; 6], 0.0)
}

#[test]
fn reordered_feature_names_are_rejected() {
    let mut scaler = good_scaler();
    scaler["feature_names"] = json!([
        "gas_price_gwei", "tx_value_eth", "time_since_last_tx",
        "num_transactions_per_address", "account_age_days", "gas_fee_ratio"
    ]);
    let err = load(&scaler, &good_model()).err().unwrap();
    assert!(matches!(err, ArtifactError::SchemaMismatch { artifact: "scaler", .. }));
}

#[test]
fn short_coefficient_vector_is_rejected() {
    let mut model = good_model();
    model["coefficients"] = json!([0.1, 0.1, 0.1]);
    let err = load(&good_scaler(), &model).err().unwrap();
    assert!(matches!(err, ArtifactError::DimensionMismatch { artifact: "model", got: 3, .. }));
}

#[test]
fn unknown_model_kind_is_a_parse_error() {
    let model = json!({ "kind": "gradient_boosting", "stages": [] });
    let err = load(&good_scaler(), &model).err().unwrap();
    assert!(matches!(err, ArtifactError::Parse { artifact: "model", .. }));
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifacts(dir.path(), &good_scaler(), &good_model());
    std::fs::write(&paths.scaler, b"\x80\x04\x95 not json").unwrap();
    let err = InferenceService::load(&paths).err().unwrap();
    assert!(matches!(err, ArtifactError::Parse { artifact: "scaler", .. }));
}

#[test]
fn cyclic_tree_is_rejected() {
    let model = json!({
        "kind": "random_forest",
        "trees": [{ "nodes": [
            { "feature": 0, "threshold": 0.0, "left": 0, "right": 1 },
            { "probabilities": [0.5, 0.5] }
        ]}]
    });
    let err = load(&good_scaler(), &model).err().unwrap();
    assert!(matches!(err, ArtifactError::InvalidParameter { artifact: "model", .. }));
}

#[test]
fn empty_forest_is_rejected() {
    let model = json!({ "kind": "random_forest", "trees": [] });
    assert!(load(&good_scaler(), &model).is_err());
}

#[test]
fn leaf_probabilities_must_sum_to_one() {
    let model = json!({
        "kind": "random_forest",
        "trees": [{ "nodes": [{ "probabilities": [0.7, 0.7] }] }]
    });
    let err = load(&good_scaler(), &model).err().unwrap();
    assert!(err.to_string().contains("sum to 1"));
}
