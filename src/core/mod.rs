// src/core/mod.rs

pub mod constraints;
pub mod converter;
pub mod document;
pub mod editor;
pub mod generator;
pub mod graph_display;
pub mod hierarchy;
pub mod path_resolver;
pub mod templates;
pub mod validation;
