pub mod config;
pub mod operations;
pub mod refresh;
pub mod run;
pub mod services;
