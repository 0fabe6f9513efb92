use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use tikzedit_cli::{Args, MoveCommand, ResizeCommand, run};

fn demos_dir() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|crates| crates.parent())
        .expect("crate lives two levels below the workspace root")
        .join("demos")
}

/// Collects all .tex files from a directory
fn collect_tex_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("tex")
                })
                .collect()
        })
        .unwrap_or_default();

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        snap: false,
        moves: Vec::new(),
        resizes: Vec::new(),
    }
}

#[test]
fn e2e_smoke_test_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_tex_files(demos_dir());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for demo in &demos {
        let output = temp_dir
            .path()
            .join(demo.file_name().expect("demo has a file name"));

        match run(&args(demo, &output)) {
            Ok(()) => {
                let source = fs::read_to_string(demo).expect("demo is readable");
                let written = fs::read_to_string(&output).expect("output was written");
                // Every declaration survives regeneration.
                if written.matches("\\node").count() != source.matches("\\node").count() {
                    failed.push(format!("{}: node count changed", demo.display()));
                }
            }
            Err(err) => failed.push(format!("{}: {err}", demo.display())),
        }
    }

    assert!(failed.is_empty(), "demos failed: {failed:#?}");
}

#[test]
fn e2e_move_and_resize() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_dir().join("backend_groups.tex");
    let output = temp_dir.path().join("moved.tex");

    let mut args = args(&input, &output);
    args.moves.push(MoveCommand {
        name: "gateway".to_string(),
        x: 1.0,
        y: 4.0,
    });
    args.resizes.push(ResizeCommand {
        name: "billing_domain".to_string(),
        x: 2.0,
        y: 1.0,
        width: 1.0,
        height: 1.0,
    });
    run(&args).expect("edits apply");

    let written = fs::read_to_string(&output).expect("output was written");
    assert!(written.contains("(gateway) at (1.00cm,4.00cm)"), "{written}");
}

#[test]
fn e2e_snap_mode_uses_short_precision() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_dir().join("backend_groups.tex");
    let output = temp_dir.path().join("snapped.tex");

    let mut args = args(&input, &output);
    args.snap = true;
    run(&args).expect("snap run succeeds");

    let written = fs::read_to_string(&output).expect("output was written");
    assert!(written.contains("(gateway) at (0.0cm,"), "{written}");
    assert!(!written.contains(".00cm"), "{written}");
}

#[test]
fn e2e_unknown_node_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_dir().join("cloud_stack.tex");
    let output = temp_dir.path().join("never.tex");

    let mut args = args(&input, &output);
    args.moves.push(MoveCommand {
        name: "no_such_node".to_string(),
        x: 0.0,
        y: 0.0,
    });

    assert!(run(&args).is_err());
    assert!(!output.exists());
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("missing.tex");
    let output = temp_dir.path().join("out.tex");
    assert!(run(&args(&input, &output)).is_err());
}
