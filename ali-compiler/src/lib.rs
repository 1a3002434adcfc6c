//! The Ali compiler back-end.
//!
//! The front end (lexer and parser for the source language) is an
//! external collaborator: it drives [`CompilerContext`] with a stream of
//! declaration and instruction events. This crate owns everything after
//! that point: interned symbol tables, vocabulary patterns, the grammar
//! builder, bytecode emission with jump patching, command binding, and
//! final module assembly.

mod commands;
mod context;
mod emit;
mod error;
mod grammar_build;
mod pattern;
mod tables;

pub use context::CompilerContext;
pub use error::CompileError;
pub use pattern::FragmentKind;
