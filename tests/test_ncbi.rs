use bintax::Error;
use bintax::taxonomy::ncbi::MAX_TAXONOMY_DEPTH;
use bintax::taxonomy::{NcbiTaxonomy, TaxonomyReference};
use std::fs;

const NODES: &str = "\
1\t|\t1\t|\tno rank\t|\t\t|\t8\t|
5\t|\t1\t|\tgenus\t|\t\t|\t0\t|
6\t|\t1\t|\tgenus\t|\t\t|\t0\t|
10\t|\t5\t|\tspecies\t|\tEC\t|\t0\t|
20\t|\t5\t|\tspecies\t|\t\t|\t0\t|
30\t|\t6\t|\tspecies\t|\t\t|\t0\t|
40\t|\t41\t|\tspecies\t|\t\t|\t0\t|
";

const NAMES: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
10\t|\tE. coli\t|\t\t|\tsynonym\t|
10\t|\tEscherichia coli\t|\t\t|\tscientific name\t|
5\t|\tEscherichia\t|\t\t|\tscientific name\t|
";

const MERGED: &str = "\
7\t|\t10\t|
8\t|\t7\t|
";

fn taxonomy() -> NcbiTaxonomy {
    NcbiTaxonomy::from_nodes_reader(NODES.as_bytes(), "nodes.dmp")
        .unwrap()
        .with_names_reader(NAMES.as_bytes(), "names.dmp")
        .unwrap()
        .with_merged_reader(MERGED.as_bytes(), "merged.dmp")
        .unwrap()
}

// --- NODES ---
#[test]
fn test_root_and_size() {
    let taxonomy = taxonomy();
    assert_eq!(taxonomy.root_taxid(), 1);
    assert_eq!(taxonomy.num_nodes(), 7);
    assert!(taxonomy.contains(30));
    assert!(!taxonomy.contains(7));
}

#[test]
fn test_ancestor_path_starts_at_root() {
    let taxonomy = taxonomy();
    assert_eq!(taxonomy.ancestor_path(10), vec![Some(1), Some(5), Some(10)]);
    assert_eq!(taxonomy.ancestor_path(30), vec![Some(1), Some(6), Some(30)]);
    assert_eq!(taxonomy.ancestor_path(1), vec![Some(1)]);
}

#[test]
fn test_ancestor_path_of_unknown_taxid() {
    assert_eq!(taxonomy().ancestor_path(999), vec![None]);
}

#[test]
fn test_ancestor_path_with_missing_parent() {
    assert_eq!(taxonomy().ancestor_path(40), vec![None, Some(40)]);
}

#[test]
fn test_ancestor_path_of_cycle_is_bounded() {
    let nodes = "1\t|\t1\t|\tno rank\t|\n50\t|\t51\t|\tgenus\t|\n51\t|\t50\t|\tgenus\t|\n";
    let taxonomy = NcbiTaxonomy::from_nodes_reader(nodes.as_bytes(), "nodes.dmp").unwrap();

    let path = taxonomy.ancestor_path(50);
    assert_eq!(path.len(), MAX_TAXONOMY_DEPTH + 1);
    assert_eq!(path[0], None);
    assert_eq!(path.last(), Some(&Some(50)));
}

#[test]
fn test_ranks() {
    let taxonomy = taxonomy();
    assert_eq!(taxonomy.rank_of(1), Some("no rank"));
    assert_eq!(taxonomy.rank_of(5), Some("genus"));
    assert_eq!(taxonomy.rank_of(10), Some("species"));
    assert_eq!(taxonomy.rank_of(999), None);
}

// --- NAMES & MERGED ---
#[test]
fn test_only_scientific_names_kept() {
    let taxonomy = taxonomy();
    assert_eq!(taxonomy.name_of(10), Some("Escherichia coli"));
    assert_eq!(taxonomy.name_of(5), Some("Escherichia"));
    assert_eq!(taxonomy.name_of(30), None);
}

#[test]
fn test_merged_taxids_resolve_to_primary() {
    let taxonomy = taxonomy();
    assert_eq!(taxonomy.primary_taxid(10), Some(10));
    assert_eq!(taxonomy.primary_taxid(7), Some(10));
    assert_eq!(taxonomy.primary_taxid(8), Some(10)); // chained merge
    assert_eq!(taxonomy.primary_taxid(999), None);
}

#[test]
fn test_without_names_and_merged() {
    let taxonomy = NcbiTaxonomy::from_nodes_reader(NODES.as_bytes(), "nodes.dmp").unwrap();
    assert_eq!(taxonomy.name_of(10), None);
    assert_eq!(taxonomy.primary_taxid(7), None);
}

// --- ERRORS ---
#[test]
fn test_invalid_taxid_reports_line() {
    let nodes = "1\t|\t1\t|\tno rank\t|\nabc\t|\t1\t|\tgenus\t|\n";
    let result = NcbiTaxonomy::from_nodes_reader(nodes.as_bytes(), "nodes.dmp");

    match result {
        Err(Error::InvalidDumpRecord { source_name, line, .. }) => {
            assert_eq!(source_name, "nodes.dmp");
            assert_eq!(line, 2);
        }
        other => panic!("Expected InvalidDumpRecord, got {:?}", other),
    }
}

#[test]
fn test_too_few_fields_in_merged() {
    let result = NcbiTaxonomy::from_nodes_reader(NODES.as_bytes(), "nodes.dmp")
        .unwrap()
        .with_merged_reader("7\n".as_bytes(), "merged.dmp");
    assert!(matches!(result, Err(Error::InvalidDumpRecord { line: 1, .. })));
}

#[test]
fn test_missing_root() {
    let nodes = "5\t|\t1\t|\tgenus\t|\n";
    let result = NcbiTaxonomy::from_nodes_reader(nodes.as_bytes(), "nodes.dmp");
    assert!(matches!(result, Err(Error::MissingTaxonomyRoot(_))));
}

#[test]
fn test_invalid_utf8_in_names_reports_file_and_line() {
    let names: &[u8] = b"1\t|\troot\t|\t\t|\tscientific name\t|\n10\t|\tEscherichia \xe9\t|\t\t|\tscientific name\t|\n";
    let result = NcbiTaxonomy::from_nodes_reader(NODES.as_bytes(), "nodes.dmp")
        .unwrap()
        .with_names_reader(names, "names.dmp");

    match result {
        Err(Error::InvalidDumpRecord { source_name, line, .. }) => {
            assert_eq!(source_name, "names.dmp");
            assert_eq!(line, 2);
        }
        other => panic!("Expected InvalidDumpRecord, got {:?}", other),
    }
}

// --- FILES ---
#[test]
fn test_load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let nodes_path = dir.path().join("nodes.dmp");
    let names_path = dir.path().join("names.dmp");
    let merged_path = dir.path().join("merged.dmp");
    fs::write(&nodes_path, NODES).unwrap();
    fs::write(&names_path, NAMES).unwrap();
    fs::write(&merged_path, MERGED).unwrap();

    let taxonomy = NcbiTaxonomy::load(&nodes_path, Some(&names_path), Some(&merged_path)).unwrap();
    assert_eq!(taxonomy.num_nodes(), 7);
    assert_eq!(taxonomy.name_of(10), Some("Escherichia coli"));
    assert_eq!(taxonomy.primary_taxid(7), Some(10));
}

#[test]
fn test_load_only_nodes_file() {
    let dir = tempfile::tempdir().unwrap();
    let nodes_path = dir.path().join("nodes.dmp");
    fs::write(&nodes_path, NODES).unwrap();

    let taxonomy = NcbiTaxonomy::load(nodes_path.as_path(), None, None).unwrap();
    assert_eq!(taxonomy.ancestor_path(20), vec![Some(1), Some(5), Some(20)]);
}

#[test]
fn test_load_names_file_with_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let nodes_path = dir.path().join("nodes.dmp");
    let names_path = dir.path().join("names.dmp");
    fs::write(&nodes_path, NODES).unwrap();
    fs::write(&names_path, b"10\t|\tE\xe9\t|\t\t|\tscientific name\t|\n").unwrap();

    let err = NcbiTaxonomy::load(&nodes_path, Some(&names_path), None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(&names_path.display().to_string()), "{message}");
    assert!(message.contains("line 1"), "{message}");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nodes.dmp");

    let result = NcbiTaxonomy::load(missing.as_path(), None, None);
    match result {
        Err(Error::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("Expected Io error, got {:?}", other),
    }
}
