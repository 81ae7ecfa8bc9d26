//! kiln is a question-driven scaffolding tool.
//! It asks declarative questions, builds a model from the answers, renders
//! template trees and patches existing project files (XML, Java sources,
//! `.properties`) to wire generated artifacts into a project.

/// Typed answers and the ordered answer store
pub mod answers;

/// Command-line interface module for the kiln application
pub mod cli;

/// `init`, `entity`, `screen` and `listener` commands
pub mod commands;

/// Common constants
pub mod constants;

/// Sequential question evaluation with defaults, conditions and validation
pub mod engine;

/// Error types and handling for the kiln application
pub mod error;

/// Atomic writes and other filesystem helpers
pub mod files;

/// Template name resolution
pub mod loader;

pub mod logger;

/// Domain models, template bindings and the per-invocation context
pub mod model;

/// XML, source and properties patchers
pub mod patch;

/// Template tree rendering
pub mod processor;

/// Project descriptor and file layout
pub mod project;

/// User input and interaction handling
pub mod prompt;

/// Question specifications
pub mod question;

/// Template engine abstraction and `${name}` substitution
pub mod renderer;

pub mod validators;

/// Processes `.verbatim` files listing entries copied without substitution
pub mod verbatim;

/// Background loading of platform versions
pub mod versions;
