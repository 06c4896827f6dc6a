//! `fusion_core` is the resolution engine for the fusion mail-merge tool.
//! Given a document containing placeholder tokens and conditional markup, and
//! a row of named data values, it produces a fully resolved document with
//! placeholders substituted and conditional blocks either flattened or
//! removed.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template document + data row
//!   → Condition evaluator (rewrites £SI field=value£ markers into £OK/£KO)
//!   → Block resolver (flattens £OK…£FIN spans, deletes £KO…£FIN spans;
//!     table cells resolved independently, then the linear body pass)
//!   → Placeholder substituter ({{field}}, {{field}}%, date fields)
//!   → Completeness checker (counts leftover markers; nonzero fails the row)
//!   → Row orchestrator (drives rows sequentially, reports per-row status)
//! ```
//!
//! ## Marker Syntax
//!
//! | Marker | Syntax | Meaning |
//! |---|---|---|
//! | Placeholder | `{{field}}` | literal substitution |
//! | Percent placeholder | `{{field}}%` | value ×100, rounded, integer + `%` |
//! | Date placeholder | `{{field}}` where `field` contains `DATE` | day/month/year formatted |
//! | Condition (equality) | `£SI field=value£` | resolves to `£OK`/`£KO` |
//! | Condition (inequality) | `£SI field<>value£` | resolves to `£OK`/`£KO` |
//! | Span open (keep) | `£OK` | keep content until `£FIN` |
//! | Span open (drop) | `£KO` | drop content until `£FIN` |
//! | Span close | `£FIN` | closes the open span |
//!
//! ## Quick Start
//!
//! ```rust
//! use fusion_core::DataRow;
//! use fusion_core::Document;
//! use fusion_core::MergeOptions;
//! use fusion_core::merge_row;
//!
//! let mut document = Document::from_text(
//! 	"Hello {{NAME}}, £SI VIP=YES£you get a discount£FIN, {{DISCOUNT}}%£SI VIP=NO£, sorry£FIN.",
//! );
//!
//! let mut row = DataRow::new();
//! row.insert("NAME", "Ana");
//! row.insert("VIP", "YES");
//! row.insert("DISCOUNT", 0.2);
//!
//! let outcome = merge_row(&mut document, &row, &MergeOptions::default());
//! assert!(outcome.is_success());
//! assert_eq!(document.to_text(), "Hello Ana, you get a discount, 20%.");
//! ```
//!
//! Host collaborators (row source, document store, export sink, status sink)
//! are abstract traits in [`engine`]; `fusion_cli` provides file-backed
//! bindings.

pub use checker::*;
pub use conditions::*;
pub use config::*;
pub use document::*;
pub use engine::*;
pub use error::*;
pub use lexer::*;
pub use resolver::*;
pub use substitute::*;

pub mod checker;
pub mod conditions;
pub mod config;
pub mod document;
mod engine;
mod error;
pub mod lexer;
pub mod resolver;
pub mod substitute;

#[cfg(test)]
mod __fixtures;
