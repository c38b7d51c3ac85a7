pub mod greedy_matcher;
pub mod hungarian_matcher;
