pub mod assessment;
pub mod findings;
