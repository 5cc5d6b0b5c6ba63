use rand::RngCore;
use serde_json::Value;

use crate::errors::GenerationError;
use crate::generators::{GeneratedId, GeneratorContext, GeneratorRegistry};

pub const MIN_BATCH: usize = 1;
pub const MAX_BATCH: usize = 100;

/// Clamp a requested batch size into `MIN_BATCH..=MAX_BATCH`.
pub fn clamp_count(count: usize) -> usize {
    count.clamp(MIN_BATCH, MAX_BATCH)
}

/// Run generator `id` `count` times (after clamping) and collect the results.
///
/// Each value is sampled independently; duplicates are possible.
pub fn generate_batch(
    registry: &GeneratorRegistry,
    id: &str,
    ctx: &GeneratorContext,
    params: Option<&Value>,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<GeneratedId>, GenerationError> {
    let generator = registry
        .generator(id)
        .ok_or_else(|| GenerationError::UnknownGenerator(id.to_string()))?;
    let count = clamp_count(count);

    let items = (0..count)
        .map(|_| generator.generate(ctx, params, rng))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        event = "batch_generated",
        generator = id,
        scheme = %generator.scheme(),
        count = items.len()
    );
    Ok(items)
}

/// Group items by label, keeping labels in first-seen order. Unlabelled items
/// are grouped under the scheme name.
pub fn group_by_label(items: &[GeneratedId]) -> Vec<(String, Vec<&GeneratedId>)> {
    let mut groups: Vec<(String, Vec<&GeneratedId>)> = Vec::new();
    for item in items {
        let label = item
            .label
            .clone()
            .unwrap_or_else(|| item.scheme.as_str().to_string());
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, members)) => members.push(item),
            None => groups.push((label, vec![item])),
        }
    }
    groups
}
