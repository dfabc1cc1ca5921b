/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use pathvision::catalogue;

#[derive(clap::Args, Debug)]
pub struct AlgebrasCommand {
    /// Print the catalogue as JSON.
    #[arg(long)]
    json: bool,
}

impl AlgebrasCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let algebras = catalogue::algebras();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&algebras)?);
            return Ok(());
        }
        for info in algebras {
            println!("{:<16} {}", info.key, info.name);
            println!("{:<16} default edge {}, invalid {}", "", info.default_edge, info.invalid_edge);
            if !info.components.is_empty() {
                println!("{:<16} components: {}", "", info.components.join(", "));
            }
        }
        Ok(())
    }
}
