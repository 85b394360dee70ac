use crate::commons::{
    self, COMMONS_FEATURES, COMPOSITE_INDICATOR, CommonsFeatures, FEATURES_ENDPOINT,
    HEALTH_INDICATOR,
};
use crate::{
    ConditionalRegistry, ConfigurationSnapshot, FeatureDescriptor, RegistrationResult,
    RegistryError,
};

fn with_properties(properties: &[&str]) -> RegistrationResult {
    super::init_tracing();

    let snapshot = ConfigurationSnapshot::from_properties(properties).unwrap();
    commons::registry().evaluate(&snapshot).unwrap()
}

fn assert_not_registered(result: &RegistrationResult, name: &str) {
    assert!(
        matches!(result.get(name), Err(RegistryError::NotRegistered(_))),
        "{name} should not have been registered"
    );
}

#[test]
fn registered_normally() {
    let result = with_properties(&[]);

    assert!(result.get(HEALTH_INDICATOR).is_ok());
    assert!(result.get(COMPOSITE_INDICATOR).is_ok());
    assert!(result.get(FEATURES_ENDPOINT).is_ok());
    assert!(!result.instances_of::<CommonsFeatures>().is_empty());
}

#[test]
fn discovery_disabled() {
    let result = with_properties(&["discovery.enabled=false"]);

    assert_not_registered(&result, HEALTH_INDICATOR);
    assert_not_registered(&result, COMPOSITE_INDICATOR);
    // The features endpoint does not depend on discovery.
    assert!(result.get(FEATURES_ENDPOINT).is_ok());
    assert_not_registered(&result, COMMONS_FEATURES);
}

#[test]
fn blocking_discovery_disabled() {
    let result = with_properties(&["discovery.blocking.enabled=false"]);

    assert_not_registered(&result, HEALTH_INDICATOR);
    assert_not_registered(&result, COMPOSITE_INDICATOR);
    assert!(result.get(FEATURES_ENDPOINT).is_ok());
    assert!(result.get(COMMONS_FEATURES).is_ok());
}

#[test]
fn all_disabled_individually() {
    let result = with_properties(&[
        "discovery.client.health-indicator.enabled=false",
        "discovery.client.composite-indicator.enabled=false",
        "features.enabled=false",
    ]);

    assert_not_registered(&result, HEALTH_INDICATOR);
    assert_not_registered(&result, COMPOSITE_INDICATOR);
    assert_not_registered(&result, FEATURES_ENDPOINT);
    assert!(result.enabled().next().is_none());
}

#[test]
fn health_indicator_disabled() {
    let result = with_properties(&["discovery.client.health-indicator.enabled=false"]);

    assert_not_registered(&result, HEALTH_INDICATOR);
    assert_not_registered(&result, COMPOSITE_INDICATOR);
    assert!(result.get(FEATURES_ENDPOINT).is_ok());
}

#[test]
fn composite_indicator_disabled_alone() {
    let result = with_properties(&["discovery.client.composite-indicator.enabled=false"]);

    assert!(result.get(HEALTH_INDICATOR).is_ok());
    assert_not_registered(&result, COMPOSITE_INDICATOR);
}

#[derive(Debug)]
struct TestComponent;

fn evaluate_with(descriptor: FeatureDescriptor, property: &str) -> RegistrationResult {
    let snapshot = ConfigurationSnapshot::from_properties([property]).unwrap();
    ConditionalRegistry::new()
        .register(descriptor)
        .evaluate(&snapshot)
        .unwrap()
}

#[test]
fn on_discovery_enabled_gates_user_components() {
    let descriptor =
        FeatureDescriptor::new("test", |_| TestComponent).when(commons::on_discovery_enabled());

    assert!(!evaluate_with(descriptor.clone(), "discovery.enabled=false").is_enabled("test"));
    assert!(
        evaluate_with(descriptor, "discovery.enabled=true")
            .get_as::<TestComponent>("test")
            .is_ok()
    );
}

#[test]
fn on_blocking_discovery_enabled_gates_user_components() {
    let descriptor = FeatureDescriptor::new("test", |_| TestComponent)
        .when(commons::on_blocking_discovery_enabled());

    assert!(
        !evaluate_with(descriptor.clone(), "discovery.blocking.enabled=false").is_enabled("test")
    );
    assert!(evaluate_with(descriptor, "discovery.blocking.enabled=true").is_enabled("test"));
}

#[test]
fn report_explains_disabled_features() {
    let result = with_properties(&["discovery.enabled=false"]);
    let report = result.report();

    assert_eq!(report.enabled, vec![FEATURES_ENDPOINT.to_owned()]);
    assert_eq!(report.disabled.len(), 3);
    assert!(
        report
            .disabled
            .iter()
            .all(|d| d.reason == "`discovery.enabled` is false, requires true")
    );
}

#[test]
fn misconfigured_flag_is_reported() {
    let snapshot = ConfigurationSnapshot::from_properties(["discovery.enabled=off"]).unwrap();

    assert!(matches!(
        commons::registry().evaluate(&snapshot),
        Err(RegistryError::Snapshot { .. })
    ));
}
