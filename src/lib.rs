//! Levelsrc - Library for compiling ASCII level maps
//!
//! This library provides functionality to:
//! - Parse level files into a map grid and a legend section
//! - Resolve legend expressions against map positions into typed custom tiles
//! - Assemble levels and order them into a level index
//! - Build whole level directories concurrently and write JSON level data

pub mod assemble;
pub mod build;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod legend;
pub mod models;
pub mod output;
pub mod parser;
