use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("contact_gateway_statds")
        .with_description("Contact gateway statistics")
        .with_unit("attempt")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_auth_statds(outcome: &str) {
    incr_statds("auth".to_string(), outcome.into())
}

pub fn incr_lookup_statds(outcome: &str) {
    incr_statds("contact_lookup".to_string(), outcome.into())
}

pub fn incr_phone_update_statds(outcome: &str) {
    incr_statds("phone_update".to_string(), outcome.into())
}

pub fn incr_automation_statds(outcome: &str) {
    incr_statds("automation".to_string(), outcome.into())
}
