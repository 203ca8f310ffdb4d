//! Runtime module — process start-up: logging, config, rule set.

pub mod boot;
