// ptkit/src/lib.rs
//! # ptkit CLI Application
//!
//! This crate provides the command-line front end for `ptkit-core`: phrase-table
//! statistics, feature filtering, lexical scoring, lexicon compilation and
//! unlabeled-phrase selection.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

