// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Download trend tracker for versioned release assets.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    release_trends::dispatch::dispatch().await
}
