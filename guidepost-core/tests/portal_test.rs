//! Integration tests for the content pipeline
//!
//! These tests build real content trees on disk and run them through
//! scanning, parsing, indexing and route resolution.

use guidepost_core::{
    table_of_contents, Config, GuideQuery, PortalIndex, ResolveError, SiteBuilder, SortOrder,
    Subtree, SubtreeConfig,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn doc(title: &str, date: &str, tags: &[&str], body: &str) -> String {
    format!(
        "---\ntitle: \"{}\"\ndate: {}\ntags: [{}]\nsummary: Summary of {}\n---\n{}",
        title,
        date,
        tags.join(", "),
        title,
        body
    )
}

fn sample_portal() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "guides/a.mdx",
        &doc("Deploy an Edition", "2022-01-10", &["edition"], "# Deploy\n## Steps\n"),
    );
    write(
        root,
        "guides/b.mdx",
        &doc(
            "List on a Marketplace",
            "2022-03-02",
            &["marketplace", "edition"],
            "# Listing\n",
        ),
    );
    write(
        root,
        "guides/advanced/c.md",
        &doc("Custom Contracts", "2022-02-14", &["Contracts"], "# Custom\n"),
    );
    write(
        root,
        "learn-web3/what-is-an-nft,nft.mdx",
        &doc("What is an NFT?", "2022-04-01", &["nft"], "# NFTs\n"),
    );
    write(
        root,
        "learn-web3/minting,nft.mdx",
        &doc("Minting", "2022-04-02", &["nft"], "# Minting\n"),
    );
    write(
        root,
        "learn-web3/gas,ethereum.mdx",
        &doc("Gas", "2022-04-03", &["ethereum"], "# Gas\n"),
    );

    let mut config = Config::for_content_dir(root, &["guides"]);
    config.subtrees.push(SubtreeConfig {
        hint_delimiter: Some(",".into()),
        ..SubtreeConfig::plain("learn-web3")
    });

    (dir, config)
}

fn build(config: &Config) -> PortalIndex {
    SiteBuilder::new(config.clone()).build().unwrap()
}

#[test]
fn test_every_enumerated_path_resolves_to_its_record() {
    let (_dir, config) = sample_portal();
    let portal = build(&config);

    for subtree in portal.subtrees() {
        let resolver = portal.resolver(subtree).unwrap();
        let records = portal.all_records(subtree).unwrap();
        let paths = resolver.enumerate_all_paths();
        assert_eq!(paths.len(), records.len());

        for (query, record) in paths.iter().zip(records) {
            let resolved = resolver.resolve(query).unwrap();
            assert_eq!(resolved.record.slug, record.slug);

            // Through the URL form as well
            let route = resolver.scheme().route(query);
            let segments: Vec<&str> = route.split('/').collect();
            let via_route = resolver.resolve_segments(&segments).unwrap();
            assert_eq!(via_route.record.slug, record.slug);
        }
    }
}

#[test]
fn test_by_tag_example() {
    let (_dir, config) = sample_portal();
    let portal = build(&config);
    let guides = Subtree::from("guides");

    let slugs = |tag: &str| -> Vec<String> {
        portal
            .by_tag(&guides, tag)
            .unwrap()
            .iter()
            .map(|r| r.slug.join())
            .collect()
    };

    assert_eq!(slugs("edition"), vec!["a", "b"]);
    assert_eq!(slugs("marketplace"), vec!["b"]);
    assert_eq!(slugs("contracts"), vec!["advanced/c"]);
    assert!(slugs("nft").is_empty());
}

#[test]
fn test_newest_first_listing() {
    let (_dir, config) = sample_portal();
    let portal = build(&config);
    let index = portal.guide_index(&Subtree::from("guides")).unwrap();

    let newest: Vec<String> = index
        .query(GuideQuery::new().sorted(SortOrder::NewestFirst).limit(2))
        .iter()
        .map(|r| r.slug.join())
        .collect();
    assert_eq!(newest, vec!["b", "advanced/c"]);
}

#[test]
fn test_related_guides_from_configured_subtree() {
    let (dir, mut config) = sample_portal();
    write(
        dir.path(),
        "guides/mint-an-nft.mdx",
        &doc("Mint an NFT", "2022-05-01", &["nft"], "# Mint\n"),
    );
    if let Some(learn) = config.subtrees.iter_mut().find(|s| s.name == "learn-web3") {
        learn.related_subtree = Some("guides".into());
    }
    let portal = build(&config);

    let learn = config.subtree("learn-web3").unwrap();
    let resolver = portal.resolver(&learn.subtree()).unwrap();
    let source = portal.guide_index(&learn.related_subtree()).unwrap();

    let resolved = resolver.resolve_segments(&["what-is-an-nft,nft"]).unwrap();
    let related: Vec<&str> = resolver
        .related_in(&resolved, source, learn.related_limit)
        .iter()
        .map(|r| r.title())
        .collect();
    assert_eq!(related, vec!["Mint an NFT"]);
}

#[test]
fn test_qualified_routes_and_related() {
    let (_dir, config) = sample_portal();
    let portal = build(&config);
    let resolver = portal.resolver(&Subtree::from("learn-web3")).unwrap();

    let routes: Vec<String> = resolver
        .enumerate_all_paths()
        .iter()
        .map(|q| resolver.scheme().route(q))
        .collect();
    assert_eq!(routes, vec!["gas,ethereum", "minting,nft", "what-is-an-nft,nft"]);

    let resolved = resolver.resolve_segments(&["what-is-an-nft,nft"]).unwrap();
    assert_eq!(resolved.record.title(), "What is an NFT?");
    let related: Vec<&str> = resolver
        .related(&resolved, 3)
        .iter()
        .map(|r| r.title())
        .collect();
    assert_eq!(related, vec!["Minting"]);

    assert!(matches!(
        resolver.resolve_segments(&["what-is-an-nft"]),
        Err(ResolveError::MalformedRoute { .. })
    ));
    assert!(matches!(
        resolver.resolve_segments(&["missing,nft"]),
        Err(ResolveError::NotFound { .. })
    ));
}

#[test]
fn test_pipeline_is_idempotent() {
    let (_dir, config) = sample_portal();
    let first = build(&config);
    let second = build(&config);

    for subtree in first.subtrees() {
        assert_eq!(
            first.all_records(subtree).unwrap(),
            second.all_records(subtree).unwrap()
        );
        let toc_first: Vec<_> = first
            .all_records(subtree)
            .unwrap()
            .iter()
            .map(|r| table_of_contents(&r.raw_body))
            .collect();
        let toc_second: Vec<_> = second
            .all_records(subtree)
            .unwrap()
            .iter()
            .map(|r| table_of_contents(&r.raw_body))
            .collect();
        assert_eq!(toc_first, toc_second);
    }
}

#[test]
fn test_file_missing_date_is_excluded() {
    let (dir, config) = sample_portal();
    write(dir.path(), "guides/undated.mdx", "---\ntitle: Undated\n---\n# Body\n");

    let portal = build(&config);
    let records = portal.all_records(&Subtree::from("guides")).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.title() != "Undated"));

    let failures = portal.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].subtree, Subtree::from("guides"));
    assert!(failures[0].to_string().contains("undated.mdx"));
}

#[test]
fn test_record_toc() {
    let (_dir, config) = sample_portal();
    let portal = build(&config);
    let guides = Subtree::from("guides");
    let resolver = portal.resolver(&guides).unwrap();

    let resolved = resolver.resolve_segments(&["a"]).unwrap();
    let toc = table_of_contents(&resolved.record.raw_body);
    let outline: Vec<(&str, u8, &str)> = toc
        .iter()
        .map(|h| (h.text.as_str(), h.depth, h.anchor.as_str()))
        .collect();
    assert_eq!(outline, vec![("Deploy", 1, "deploy"), ("Steps", 2, "steps")]);
}
