mod enricher;

pub use enricher::{DescriptionEnricher, EnrichmentSummary, DESCRIPTION_UNAVAILABLE};

#[cfg(test)]
mod tests;
