//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../guidepost.yml.example");

/// Initialize a new guidepost project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_content(root)?;

    println!("✓ guidepost initialized in {:?}", root);
    println!("  - Edit guidepost.yml to configure subtrees and listings");
    println!("  - Write guides in content/guides/ or content/learn-web3/");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("guidepost.yml");
    if config_path.exists() {
        println!("guidepost.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_content(root: &Path) -> Result<()> {
    let content_root = root.join("content");
    let guides = content_root.join("guides");
    let learn = content_root.join("learn-web3");

    for dir in [&content_root, &guides, &learn] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    write_sample(&guides.join("deploy-an-edition.mdx"), SAMPLE_GUIDE)?;
    write_sample(&learn.join("what-is-an-nft,nft.mdx"), SAMPLE_LEARN)?;

    Ok(())
}

fn write_sample(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);
    Ok(())
}

const SAMPLE_GUIDE: &str = r#"---
title: Deploy an Edition
summary: Create and deploy an ERC1155 edition contract
date: 2026-01-01
tags: [edition]
authorTwitter: "@guidepost"
---

# Deploy an Edition

Run the following to assemble the portal:

```bash
guidepost build
guidepost guides guides --tag edition
```

## Next steps

List your edition on a marketplace.
"#;

const SAMPLE_LEARN: &str = r#"---
title: What is an NFT?
summary: Non-fungible tokens in one page
date: 2026-01-01
tags: [nft]
---

# What is an NFT?

The `,nft` suffix of this file name is the route's tag hint: related guides
on this page are the other guides tagged `nft`.

## Ownership

## Metadata
"#;
