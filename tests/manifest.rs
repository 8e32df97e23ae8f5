use std::fs;

use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};

use tenx_samples::domain::NameFieldTitles;
use tenx_samples::error::SampleError;
use tenx_samples::manifest::{Manifest, discover_manifests};

fn scratch() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, root)
}

fn write(dir: &Utf8Path, name: &str, body: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(path.as_std_path(), body).unwrap();
    path
}

#[test]
fn discovery_is_sorted_and_filtered() {
    let (_temp, root) = scratch();
    write(&root, "b_x.100.1.sample", "/runs/b\n");
    write(&root, "a_x.100.1.sample", "/runs/a\n");
    write(&root, "notes.txt", "ignored\n");
    fs::create_dir(root.join("dir.sample").as_std_path()).unwrap();

    let found = discover_manifests(&root).unwrap();
    let names = found
        .iter()
        .map(|path| path.file_name().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a_x.100.1.sample", "b_x.100.1.sample"]);
}

#[test]
fn discovery_without_manifests() {
    let (_temp, root) = scratch();
    write(&root, "readme.md", "nothing here\n");

    let err = discover_manifests(&root).unwrap_err();
    assert_matches!(err, SampleError::NoInput(dir) if dir == root);
}

#[test]
fn discovery_skips_hidden_files() {
    let (_temp, root) = scratch();
    write(&root, "donor1_stim.2000.1.sample", "/runs/a\n");
    write(&root, "._donor1_stim.2000.1.sample", "\0\0");

    let found = discover_manifests(&root).unwrap();
    assert_eq!(found, vec![root.join("donor1_stim.2000.1.sample")]);

    let (_temp, only_hidden) = scratch();
    write(&only_hidden, ".2000.1.sample", "/runs/a\n");
    let err = discover_manifests(&only_hidden).unwrap_err();
    assert_matches!(err, SampleError::NoInput(_));
}

#[test]
fn discovery_of_missing_directory() {
    let (_temp, root) = scratch();
    let err = discover_manifests(&root.join("absent")).unwrap_err();
    assert_matches!(err, SampleError::Filesystem(_));
}

#[test]
fn load_manifest_with_blank_lines() {
    let (_temp, root) = scratch();
    let path = write(
        &root,
        "donor1_stim.2000.1.sample",
        "\n/data/runA\n   \n/data/runB\n\n",
    );
    let titles: NameFieldTitles = "donor,condition".parse().unwrap();

    let manifest = Manifest::load(&path, &titles).unwrap();
    assert_eq!(manifest.library_id(), "donor1_stim");
    assert_eq!(manifest.runs, vec!["/data/runA", "/data/runB"]);

    let inputs = manifest.run_inputs();
    assert_eq!(inputs.id, "donor1_stim-count");
    assert_eq!(inputs.expect_cells, 2000);
    assert_eq!(inputs.samples_arg(), "runA,runB");
}

#[test]
fn manifest_without_runs() {
    let (_temp, root) = scratch();
    let path = write(&root, "donor1_stim.2000.1.sample", "\n  \n\t\n");
    let titles: NameFieldTitles = "donor,condition".parse().unwrap();

    let err = Manifest::load(&path, &titles).unwrap_err();
    assert_matches!(err, SampleError::EmptyManifest(file) if file == path);
}

#[test]
fn name_is_validated_before_body() {
    let (_temp, root) = scratch();
    let path = write(&root, "donor1.2000.1.sample", "");
    let titles: NameFieldTitles = "donor,condition".parse().unwrap();

    let err = Manifest::load(&path, &titles).unwrap_err();
    assert_matches!(err, SampleError::FieldCountMismatch { found: 1, .. });
}
