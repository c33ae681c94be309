//! taxnav: taxonomy term trees as navigation menus and term lists
//!
//! Layers, leaf first:
//! - `domain`: terms, forests, navigation items, blocks and the menu merge
//! - `render`: term list, dropdown, filterable and navigation markup
//! - `application`: use cases over the term source
//! - `infrastructure`: term stores, link resolution, HTTP endpoint, wiring
//! - `cli`: the `taxnav` command

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;
