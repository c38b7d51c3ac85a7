pub mod replay_classifier;
