//! Pairing rules and match creation

pub mod engine;
pub mod strategy;

pub use engine::MatchEngine;
pub use strategy::{
    FirstInLineStrategy, MatchStrategy, OverflowStrategy, PairSelection, SkillWindowStrategy,
    StrategyTable,
};
