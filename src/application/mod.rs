pub mod lifecycle;
pub mod metrics;
pub mod pricing;
