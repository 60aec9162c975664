/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use rankgraph_cli::cli_main;
use std::path::Path;
use tempfile::Builder;

const CYCLE: &str = "2\n0.85\n3\nA\nB\nC\n3\nA B\nB C\nC A\n";

fn write_input(dir: &Path, name: &str, content: &str) -> Result<String> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path.display().to_string())
}

#[test]
fn test_rank_named() -> Result<()> {
    let tmp_dir = Builder::new().prefix("RankNamed").tempdir()?;
    let input = write_input(tmp_dir.path(), "cycle.txt", CYCLE)?;
    let output = tmp_dir.path().join("out").join("cycle.scores");
    let output_str = output.display().to_string();

    for engine in ["sequential", "unrolled", "parallel", "matrix"] {
        cli_main(vec![
            "rankgraph",
            "rank",
            &input,
            "--engine",
            engine,
            "--threshold",
            "1E-12",
            "-o",
            &output_str,
        ])?;
        let scores = std::fs::read_to_string(&output)?;
        assert_eq!(scores, "A 0.3333\nB 0.3333\nC 0.3333\n", "{engine}");
    }
    Ok(())
}

#[test]
fn test_rank_json() -> Result<()> {
    let tmp_dir = Builder::new().prefix("RankJson").tempdir()?;
    // 1, 2 and 3 point to 0, which is dangling
    let input = write_input(tmp_dir.path(), "star.arcs", "1 0\n2 0\n3 0\n")?;
    let output = tmp_dir.path().join("star.json");

    cli_main(vec![
        "rankgraph",
        "rank",
        &input,
        "--input-format",
        "arcs",
        "--dangling",
        "redistribute",
        "--norm",
        "squared-l2",
        "--threshold",
        "1E-24",
        "--fmt",
        "json",
        "-j",
        "2",
        "-o",
        &output.display().to_string(),
    ])?;

    let scores: Vec<f64> = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    assert_eq!(scores.len(), 4);
    assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1E-9);
    // node names are assigned in order of appearance: "1" is node 0
    assert!(scores[1] > scores[0]);
    assert!((scores[0] - scores[2]).abs() < 1E-12);
    Ok(())
}

#[test]
fn test_rank_invalid() -> Result<()> {
    let tmp_dir = Builder::new().prefix("RankInvalid").tempdir()?;
    let input = write_input(tmp_dir.path(), "zero.txt", "0\n0.85\n1\nA\n0\n")?;
    let output = tmp_dir.path().join("zero.scores");

    // Zero workers: no output
    cli_main(vec![
        "rankgraph",
        "rank",
        &input,
        "-o",
        &output.display().to_string(),
    ])?;
    assert!(!output.exists());

    // The command line overrides the input
    cli_main(vec![
        "rankgraph",
        "rank",
        &input,
        "-j",
        "1",
        "--max-iter",
        "1",
        "-o",
        &output.display().to_string(),
    ])?;
    assert_eq!(std::fs::read_to_string(&output)?, "A 0.1500\n");

    // Non-positive damping: no output
    std::fs::remove_file(&output)?;
    cli_main(vec![
        "rankgraph",
        "rank",
        &input,
        "-j",
        "1",
        "--damping",
        "0",
        "-o",
        &output.display().to_string(),
    ])?;
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_rank_malformed() -> Result<()> {
    let tmp_dir = Builder::new().prefix("RankMalformed").tempdir()?;
    let input = write_input(tmp_dir.path(), "bad.txt", "2\n0.85\n2\nA\nB\n1\nA Z\n")?;
    assert!(cli_main(vec!["rankgraph", "rank", &input]).is_err());
    Ok(())
}

#[test]
fn test_compare() -> Result<()> {
    let tmp_dir = Builder::new().prefix("Compare").tempdir()?;
    let input = write_input(
        tmp_dir.path(),
        "graph.txt",
        "4\n0.85\n5\na\nb\nc\nd\ne\n6\na b\nb c\nc a\nc d\nd a\ne a\n",
    )?;
    cli_main(vec![
        "rankgraph",
        "compare",
        &input,
        "--threshold",
        "1E-12",
        "--tolerance",
        "1E-9",
    ])?;
    cli_main(vec![
        "rankgraph",
        "compare",
        &input,
        "--dangling",
        "redistribute",
        "--max-iter",
        "20",
    ])?;
    Ok(())
}
