//! End-to-end tests for docmatch
//!
//! Real directory trees under a TempDir, real CSV/XLSX files on disk.

use docmatch::compare::{MergeSource, SOURCE_COLUMN};
use docmatch::config::Settings;
use docmatch::scan::{FileWalker, WalkConfig};
use docmatch::{
    collect, compare_files, export, load, merge, run_pipeline, scan_to_file, Dataset,
    DocmatchError, ErrorKind, JoinSide,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a test environment with temp directories
struct TestEnv {
    /// Temp directory (cleaned up on drop)
    _temp: TempDir,
    /// Tree that gets scanned
    pub docs_dir: PathBuf,
    /// Where outputs go
    pub out_dir: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let docs_dir = temp.path().join("docs");
        let out_dir = temp.path().join("out");
        fs::create_dir_all(&docs_dir).expect("Failed to create docs dir");

        Self {
            _temp: temp,
            docs_dir,
            out_dir,
        }
    }

    fn touch(&self, rel: &str) -> PathBuf {
        let path = self.docs_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&path, b"%PDF").expect("Failed to write file");
        path
    }

    fn write_index(&self, name: &str, content: &str) -> PathBuf {
        let path = self._temp.path().join(name);
        fs::write(&path, content).expect("Failed to write index");
        path
    }

    fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.scan.path = self.docs_dir.clone();
        settings.scan.output_csv = self.out_dir.join("files_details.csv");
        settings.compare.df1.file_path = settings.scan.output_csv.clone();
        settings
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn source_labels(dataset: &Dataset) -> Vec<String> {
    (0..dataset.num_rows())
        .map(|row| dataset.cell_string(row, SOURCE_COLUMN).unwrap().unwrap())
        .collect()
}

// ============================================================================
// Scan
// ============================================================================

#[test]
fn test_scan_extracts_metadata_from_tree() {
    let env = TestEnv::new();
    env.touch("contracts/20240115 Contract FinalDraft.pdf");
    env.touch("contracts/BadName.pdf");
    env.touch("invoices/2023/20231231 Invoice ACME.xlsx");
    env.touch("invoices/20231399 Invoice broken.pdf");

    let output = env.out_dir.join("files_details.csv");
    let collected = scan_to_file(&env.docs_dir, &output, &WalkConfig::default()).unwrap();

    assert_eq!(collected.stats.scanned, 4);
    assert_eq!(collected.stats.matched, 2);
    assert_eq!(collected.stats.skipped_pattern, 1);
    assert_eq!(collected.stats.skipped_date, 1);

    let loaded = load(&output).unwrap();
    assert_eq!(loaded.num_rows(), 2);

    let contract = (0..loaded.num_rows())
        .find(|&row| {
            loaded.cell_string(row, "doc_type").unwrap().as_deref() == Some("Contract")
        })
        .expect("contract row");
    assert_eq!(
        loaded.cell_string(contract, "created_date").unwrap().as_deref(),
        Some("15/01/2024")
    );
    assert_eq!(
        loaded.cell_string(contract, "original_file_name").unwrap().as_deref(),
        Some("Contract FinalDraft")
    );
    assert_eq!(
        loaded.cell_string(contract, "parent_directory").unwrap(),
        Some(env.docs_dir.join("contracts").display().to_string())
    );
}

#[test]
fn test_walker_prunes_excluded_directories() {
    let env = TestEnv::new();
    env.touch("keep/20240101 Memo A.txt");
    env.touch("archive/20240101 Memo B.txt");

    let config = WalkConfig {
        exclude_dir_names: vec!["archive".to_string()],
        ..WalkConfig::default()
    };
    let collected = collect(FileWalker::new(&env.docs_dir, &config).unwrap()).unwrap();
    assert_eq!(collected.dataset.num_rows(), 1);
    assert_eq!(
        collected.dataset.cell_string(0, "original_file_name").unwrap().as_deref(),
        Some("Memo A")
    );
}

#[test]
fn test_metadata_csv_roundtrip() {
    let env = TestEnv::new();
    env.touch("20240115 Contract FinalDraft.pdf");
    env.touch("20220630 Report Q2.docx");

    let collected = collect(FileWalker::new(&env.docs_dir, &WalkConfig::default()).unwrap())
        .unwrap();
    let path = env.out_dir.join("meta.csv");
    export(&collected.dataset, &path).unwrap();

    let loaded = load(&path).unwrap();
    assert_eq!(loaded.column_names(), collected.dataset.column_names());

    let mut expected = collected.dataset.to_string_rows().unwrap();
    let mut actual = loaded.to_string_rows().unwrap();
    expected.sort();
    actual.sort();
    assert_eq!(actual, expected);
}

#[test]
fn test_zero_padded_codes_survive_reload() {
    let env = TestEnv::new();
    env.touch("20240115 007 Dossier.pdf");

    let output = env.out_dir.join("files_details.csv");
    scan_to_file(&env.docs_dir, &output, &WalkConfig::default()).unwrap();
    let reloaded = load(&output).unwrap();
    assert_eq!(reloaded.cell_string(0, "doc_type").unwrap().as_deref(), Some("007"));

    let index = Dataset::from_string_rows(&["code"], vec![vec![Some("007".into())]]).unwrap();
    let out = merge(&reloaded, &keys(&["doc_type"]), &index, &keys(&["code"])).unwrap();
    assert_eq!(out.summary.both, 1);
}

#[cfg(unix)]
#[test]
fn test_symlinked_documents_are_collected() {
    use std::os::unix::fs::symlink;

    let env = TestEnv::new();
    let store = env.out_dir.join("store");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join("blob.pdf"), b"%PDF").unwrap();
    symlink(
        store.join("blob.pdf"),
        env.docs_dir.join("20240115 Contract Linked.pdf"),
    )
    .unwrap();

    let collected = collect(FileWalker::new(&env.docs_dir, &WalkConfig::default()).unwrap())
        .unwrap();
    assert_eq!(collected.dataset.num_rows(), 1);
    assert_eq!(
        collected.dataset.cell_string(0, "original_file_name").unwrap().as_deref(),
        Some("Contract Linked")
    );
}

// ============================================================================
// Compare
// ============================================================================

#[test]
fn test_compare_against_xlsx_index() {
    let env = TestEnv::new();
    let left = Dataset::from_string_rows(
        &["file_name", "parent"],
        vec![
            vec![Some("a".into()), Some("X".into())],
            vec![Some("b".into()), Some("X".into())],
        ],
    )
    .unwrap();
    let right = Dataset::from_string_rows(
        &["document_name", "parent_folder", "owner"],
        vec![
            vec![Some("a".into()), Some("X".into()), Some("legal".into())],
            vec![Some("c".into()), Some("Y".into()), None],
        ],
    )
    .unwrap();

    let left_path = env.out_dir.join("left.csv");
    let right_path = env.out_dir.join("index.xlsx");
    export(&left, &left_path).unwrap();
    export(&right, &right_path).unwrap();

    let mut settings = env.settings();
    settings.compare.df1.file_path = left_path;
    settings.compare.df1.on_columns = keys(&["file_name", "parent"]);
    settings.compare.df2.file_path = right_path;
    settings.compare.output = Some(env.out_dir.join("merged.xlsx"));

    let merged = compare_files(&settings).unwrap();
    assert_eq!(
        source_labels(&merged.dataset),
        vec!["In both", "Only in df1", "Only in df2"]
    );
    assert_eq!(
        merged.dataset.cell_string(0, "owner").unwrap().as_deref(),
        Some("legal")
    );
    assert_eq!(merged.dataset.cell_string(1, "owner").unwrap(), None);

    let written = load(env.out_dir.join("merged.xlsx")).unwrap();
    assert_eq!(written.num_rows(), 3);
    assert_eq!(written.column_names().last().map(String::as_str), Some(SOURCE_COLUMN));
}

#[test]
fn test_missing_key_column_names_the_side() {
    let env = TestEnv::new();
    let left_path = env.write_index("left.csv", "file_name_stem,parent_directory\na,X\n");
    let right_path = env.write_index("right.csv", "document_name,folder\na,X\n");

    let mut settings = env.settings();
    settings.compare.df1.file_path = left_path;
    settings.compare.df2.file_path = right_path;

    match compare_files(&settings).unwrap_err() {
        DocmatchError::MissingColumns { side, missing, .. } => {
            assert_eq!(side, JoinSide::Right);
            assert_eq!(missing, vec!["parent_folder"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_merge_scenarios() {
    let a = Dataset::from_string_rows(&["id"], vec![vec![Some("1".into())]]).unwrap();
    let b = Dataset::from_string_rows(&["other"], vec![vec![Some("2".into())]]).unwrap();

    let out = merge(&a, &keys(&["id"]), &b, &keys(&["other"])).unwrap();
    assert_eq!(out.summary.count(MergeSource::OnlyLeft), 1);
    assert_eq!(out.dataset.cell_string(0, "other").unwrap(), None);

    let err = merge(&a, &keys(&["id"]), &b, &keys(&["other", "id"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_full_pipeline() {
    let env = TestEnv::new();
    env.touch("X/20240115 Contract FinalDraft.pdf");
    env.touch("X/20240116 Memo Internal.pdf");
    env.touch("X/scan0001.pdf");

    let folder = env.docs_dir.join("X").display().to_string();
    let index = env.write_index(
        "comparison.csv",
        &format!(
            "document_name,parent_folder\n\
             20240115 Contract FinalDraft,{folder}\n\
             20240301 Lease,{folder}\n"
        ),
    );

    let mut settings = env.settings();
    settings.compare.df2.file_path = index;
    settings.compare.output = Some(env.out_dir.join("merged.csv"));

    let report = run_pipeline(&settings).unwrap();
    assert_eq!(report.metadata_rows, 2);
    assert_eq!(report.comparison_rows, 2);
    assert_eq!(report.collect_stats.skipped_pattern, 1);

    let summary = report.merged.summary;
    assert_eq!(summary.both, 1);
    assert_eq!(summary.only_left, 1);
    assert_eq!(summary.only_right, 1);

    assert!(settings.scan.output_csv.exists());
    let merged = load(env.out_dir.join("merged.csv")).unwrap();
    assert_eq!(merged.num_rows(), 3);
}

#[test]
fn test_pipeline_fails_on_missing_comparison_file() {
    let env = TestEnv::new();
    env.touch("20240115 Contract FinalDraft.pdf");

    let mut settings = env.settings();
    settings.compare.df2.file_path = env.out_dir.join("absent.xlsx");

    let err = run_pipeline(&settings).unwrap_err();
    assert!(matches!(err, DocmatchError::FileNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
    // The metadata step already ran
    assert!(settings.scan.output_csv.exists());
}
