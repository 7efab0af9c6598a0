use metrics::counter;

/// Bumps `name` with an `outcome` label.
pub fn record_outcome(name: &'static str, outcome: &'static str) {
    counter!(name, "outcome" => outcome).increment(1);
}

/// Adds `value` to `name` without labels.
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}
