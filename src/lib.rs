//! Markscope: Student Marks Analysis Library
//!
//! A library for analysing a fixed class dataset: average marks,
//! distribution buckets, correlations, and a random forest grade classifier.

pub mod chart;
pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
