use crate::pricing::PricingTable;

/// Estimated cost in dollars for one session or event.
///
/// Uses explicit input/output counts when either is present. When only an
/// aggregate total is known, assumes a 25%/75% input/output split before
/// applying the same rates; that split is a stated approximation policy,
/// not a measurement, and callers surfacing the result should label it as
/// estimated. No rounding happens here; cents rounding is applied once at
/// aggregation output.
pub fn estimate_cost(
    table: &PricingTable,
    model: &str,
    input_tokens: u64,
    output_tokens: u64,
    total_tokens: u64,
) -> f64 {
    let price = table.price_for(model);
    if input_tokens > 0 || output_tokens > 0 {
        return (input_tokens as f64 / 1_000_000.0) * price.input_per_1m
            + (output_tokens as f64 / 1_000_000.0) * price.output_per_1m;
    }
    let est_input = total_tokens as f64 * 0.25;
    let est_output = total_tokens as f64 * 0.75;
    (est_input / 1_000_000.0) * price.input_per_1m
        + (est_output / 1_000_000.0) * price.output_per_1m
}
