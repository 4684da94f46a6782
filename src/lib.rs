// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Download trend tracker for versioned release assets.

pub mod charts;
pub mod classify;
pub mod commands;
pub mod config;
pub mod derive;
pub mod dispatch;
pub mod github;
pub mod query;
pub mod select;
pub mod store;
