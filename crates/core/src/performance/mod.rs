pub mod performance_controller;
