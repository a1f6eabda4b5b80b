use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const CONFIG: &str = r#"
site:
  title: "Portal"
  url: "https://portal.example.com"
paths:
  content: "content"
  output: "dist"
subtrees:
  - name: guides
  - name: learn-web3
    hint_delimiter: ","
listings:
  - name: guides/edition
    subtree: guides
    tag: edition
"#;

fn write(root: &Path, rel: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().ok_or("no parent")?)?;
    fs::write(path, content)?;
    Ok(())
}

fn guide(title: &str, date: &str, tags: &str) -> String {
    format!(
        "---\ntitle: \"{}\"\ndate: {}\ntags: [{}]\nsummary: About {}\n---\n# {}\n\n## Details\n",
        title, date, tags, title, title
    )
}

fn portal() -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "guidepost.yml", CONFIG)?;
    write(root, "content/guides/a.mdx", &guide("Deploy an Edition", "2022-01-01", "edition"))?;
    write(
        root,
        "content/guides/b.mdx",
        &guide("List on a Marketplace", "2022-02-01", "marketplace, edition"),
    )?;
    write(
        root,
        "content/learn-web3/what-is-an-nft,nft.mdx",
        &guide("What is an NFT?", "2022-03-01", "nft"),
    )?;
    write(
        root,
        "content/learn-web3/minting,nft.mdx",
        &guide("Minting", "2022-03-02", "nft"),
    )?;
    Ok(dir)
}

#[allow(deprecated)]
fn guidepost(dir: &Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("guidepost")?;
    cmd.current_dir(dir).env_remove("GUIDEPOST_CONFIG");
    Ok(cmd)
}

fn stdout_json(output: &[u8]) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(output)?)
}

#[test]
fn build_writes_routes_listings_and_manifest() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    guidepost(dir.path())?.arg("build").assert().success();

    let dist = dir.path().join("dist");
    let page: Value = serde_json::from_str(&fs::read_to_string(
        dist.join("learn-web3/what-is-an-nft,nft.json"),
    )?)?;
    assert_eq!(page["title"], "What is an NFT?");
    assert_eq!(page["hint"], "nft");
    assert_eq!(
        page["canonical"],
        "https://portal.example.com/learn-web3/what-is-an-nft,nft"
    );
    assert_eq!(page["headings"][1]["anchor"], "details");
    assert_eq!(page["related"][0]["title"], "Minting");

    let listing: Value =
        serde_json::from_str(&fs::read_to_string(dist.join("guides/edition.json"))?)?;
    let titles: Vec<&str> = listing["guides"]
        .as_array()
        .ok_or("guides should be an array")?
        .iter()
        .filter_map(|g| g["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Deploy an Edition", "List on a Marketplace"]);

    let manifest: Value = serde_json::from_str(&fs::read_to_string(dist.join("routes.json"))?)?;
    assert_eq!(manifest["kind"], "routes.manifest");
    assert_eq!(
        manifest["data"]["routes"].as_array().map(|r| r.len()),
        Some(4)
    );
    Ok(())
}

#[test]
fn build_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    let page = dir.path().join("dist/guides/a.json");

    guidepost(dir.path())?.arg("build").assert().success();
    let first = fs::read_to_string(&page)?;
    guidepost(dir.path())?.arg("build").assert().success();
    let second = fs::read_to_string(&page)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn build_fails_after_writing_other_routes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    write(
        dir.path(),
        "content/learn-web3/no-hint.mdx",
        &guide("No hint", "2022-03-03", "nft"),
    )?;

    guidepost(dir.path())?
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("routes failed to assemble"));

    assert!(dir.path().join("dist/learn-web3/minting,nft.json").exists());
    assert!(!dir.path().join("dist/learn-web3/no-hint.json").exists());
    Ok(())
}

#[test]
fn build_refuses_listing_that_overwrites_a_route() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    write(
        dir.path(),
        "content/guides/edition.mdx",
        &guide("Editions", "2022-01-05", "edition"),
    )?;

    guidepost(dir.path())?
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("collide with other output files"));

    let page: Value = serde_json::from_str(&fs::read_to_string(
        dir.path().join("dist/guides/edition.json"),
    )?)?;
    assert_eq!(page["title"], "Editions");
    assert!(page.get("html").is_some());
    assert!(page.get("guides").is_none());
    Ok(())
}

#[test]
fn resolve_draws_related_guides_from_configured_subtree() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = portal()?;
    write(
        dir.path(),
        "guidepost.yml",
        &CONFIG.replace(
            "hint_delimiter: \",\"",
            "hint_delimiter: \",\"\n    related_subtree: guides",
        ),
    )?;
    write(
        dir.path(),
        "content/guides/mint-an-nft.mdx",
        &guide("Mint an NFT", "2022-04-01", "nft"),
    )?;

    let output = guidepost(dir.path())?
        .args(["resolve", "learn-web3", "what-is-an-nft,nft", "--json"])
        .output()?;
    assert!(output.status.success());

    let payload = stdout_json(&output.stdout)?;
    let related = payload["data"]["related"]
        .as_array()
        .ok_or("related should be an array")?;
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["title"], "Mint an NFT");
    assert_eq!(related[0]["url"], "/guides/mint-an-nft");
    Ok(())
}

#[test]
fn paths_lists_qualified_routes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    guidepost(dir.path())?
        .args(["paths", "learn-web3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/learn-web3/minting,nft"))
        .stdout(predicate::str::contains("/learn-web3/what-is-an-nft,nft"));
    Ok(())
}

#[test]
fn guides_filters_by_tag() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    let output = guidepost(dir.path())?
        .args(["guides", "guides", "--tag", "marketplace", "--json"])
        .output()?;
    assert!(output.status.success());

    let payload = stdout_json(&output.stdout)?;
    assert_eq!(payload["kind"], "guides.list");
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["guides"][0]["slug"], "b");
    Ok(())
}

#[test]
fn resolve_reports_malformed_route() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    guidepost(dir.path())?
        .args(["resolve", "learn-web3", "what-is-an-nft"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed route"));

    guidepost(dir.path())?
        .args(["resolve", "learn-web3", "what-is-an-nft,nft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What is an NFT?"))
        .stdout(predicate::str::contains("Minting"));
    Ok(())
}

#[test]
fn verify_reports_parse_failures() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    write(dir.path(), "content/guides/undated.mdx", "---\ntitle: Undated\n---\n")?;

    let output = guidepost(dir.path())?.args(["verify", "--json"]).output()?;
    assert!(output.status.success());

    let payload = stdout_json(&output.stdout)?;
    assert_eq!(payload["data"]["records"], 4);
    assert_eq!(payload["data"]["errors"], 1);
    assert_eq!(
        payload["data"]["diagnostics"][0]["source_path"],
        "undated.mdx"
    );
    Ok(())
}

#[test]
fn toc_prints_headings() -> Result<(), Box<dyn std::error::Error>> {
    let dir = portal()?;
    guidepost(dir.path())?
        .args(["toc", "content/guides/a.mdx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deploy an Edition (#deploy-an-edition)"))
        .stdout(predicate::str::contains("  Details (#details)"));
    Ok(())
}

#[test]
fn init_scaffolds_a_buildable_project() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    guidepost(dir.path())?.args(["init", "site"]).assert().success();

    let site = dir.path().join("site");
    assert!(site.join("guidepost.yml").exists());
    guidepost(&site)?.arg("build").assert().success();
    assert!(site.join("dist/guides/deploy-an-edition.json").exists());
    Ok(())
}
