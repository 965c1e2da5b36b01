mod aggregator;

pub use aggregator::Aggregator;

#[cfg(test)]
mod tests;
