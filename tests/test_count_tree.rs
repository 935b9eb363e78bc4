use bintax::Error;
use bintax::model::{CountTree, CountTreeBuilder};
use bintax::taxonomy::{NcbiTaxonomy, TaxId};
use std::fs;

const NODES: &str = "\
1\t|\t1\t|\tno rank\t|
5\t|\t1\t|\tgenus\t|
6\t|\t1\t|\tgenus\t|
10\t|\t5\t|\tspecies\t|
20\t|\t5\t|\tspecies\t|
30\t|\t6\t|\tspecies\t|
40\t|\t41\t|\tspecies\t|
";

const MERGED: &str = "7\t|\t10\t|\n";

fn taxonomy() -> NcbiTaxonomy {
    NcbiTaxonomy::from_nodes_reader(NODES.as_bytes(), "nodes.dmp")
        .unwrap()
        .with_merged_reader(MERGED.as_bytes(), "merged.dmp")
        .unwrap()
}

fn child_taxids(tree: &CountTree, index: usize) -> Vec<TaxId> {
    tree[index].children().iter().map(|&c| tree[c].taxid()).collect()
}

fn child_counts(tree: &CountTree, index: usize) -> Vec<u64> {
    tree[index].children().iter().map(|&c| tree[c].count()).collect()
}

// --- BUILDING ---
#[test]
fn test_build_scenario() {
    let taxonomy = taxonomy();
    let (tree, summary) = bintax::tree_from_taxids(&[10, 10, 20, 30], &taxonomy).unwrap();

    let root = tree.root();
    assert_eq!(root.taxid(), 1);
    assert_eq!(root.count(), 4);
    assert_eq!(child_taxids(&tree, root.index()), vec![5, 6]);
    assert_eq!(child_counts(&tree, root.index()), vec![3, 1]);

    let genus = tree.child(root.index(), 5).unwrap();
    assert_eq!(tree[genus].rank(), "genus");
    assert_eq!(child_taxids(&tree, genus), vec![10, 20]);
    assert_eq!(child_counts(&tree, genus), vec![2, 1]);
    assert_eq!(tree[genus].parent(), Some(root.index()));

    assert_eq!(tree.num_nodes(), 6);
    assert_eq!(tree.leaf_taxids(), vec![10, 20, 30]);
    assert_eq!(summary.input_samples, 4);
    assert_eq!(summary.distinct_taxids, 3);
    assert_eq!(summary.counted_samples, 4);
    assert_eq!(summary.uncounted_samples(), 0);
}

#[test]
fn test_children_follow_ascending_taxid_order_of_input() {
    let taxonomy = taxonomy();
    // 30 is listed first, but tallying sorts taxids, so genus 5 is created first
    let (tree, _) = bintax::tree_from_taxids(&[30, 20, 10], &taxonomy).unwrap();
    assert_eq!(child_taxids(&tree, tree.root_index()), vec![5, 6]);
}

#[test]
fn test_counts_conserved_and_cover_children() {
    let taxonomy = taxonomy();
    let taxids: Vec<TaxId> = [10, 20, 30, 5, 6, 10, 10, 30, 20, 1]
        .iter()
        .cycle()
        .take(137)
        .copied()
        .collect();
    let (tree, summary) = bintax::tree_from_taxids(&taxids, &taxonomy).unwrap();

    assert_eq!(tree.root().count(), 137);
    assert_eq!(summary.counted_samples, 137);

    for node in tree.pre_order_iter() {
        let children_sum: u64 = node.children().iter().map(|&c| tree[c].count()).sum();
        assert!(node.count() >= children_sum);
    }
}

#[test]
fn test_samples_at_internal_taxid() {
    let taxonomy = taxonomy();
    let (tree, _) = bintax::tree_from_taxids(&[5, 10, 1], &taxonomy).unwrap();

    let genus = tree.child(tree.root_index(), 5).unwrap();
    assert_eq!(tree[genus].count(), 2);
    assert_eq!(tree.terminal_count(genus), 1);
    assert_eq!(tree.root().count(), 3);
    assert_eq!(tree.terminal_count(tree.root_index()), 1);
}

#[test]
fn test_samples_above_leaves_are_surfaced() {
    let taxonomy = taxonomy();
    let (tree, summary) = bintax::tree_from_taxids(&[1, 1, 1, 5, 10, 20], &taxonomy).unwrap();

    assert_eq!(tree.samples_above_leaves(), vec![(1, 3), (5, 1)]);
    assert_eq!(summary.counted_samples, 6);
    assert_eq!(summary.samples_above_leaves, 4);
    assert!(summary.to_string().contains("4 above the leaves"));

    // Only the samples of 10 and 20 reach leaves
    let binary = bintax::to_binary(&tree).unwrap();
    assert_eq!(binary.root().count(), 2);
    assert_eq!(binary.leaf_taxids(), vec![10, 20]);
}

// --- DIAGNOSTICS ---
#[test]
fn test_merged_taxid_redirected() {
    let taxonomy = taxonomy();
    let (tree, summary) = bintax::tree_from_taxids(&[7, 10, 10], &taxonomy).unwrap();

    let genus = tree.child(tree.root_index(), 5).unwrap();
    let species = tree.child(genus, 10).unwrap();
    assert_eq!(tree[species].count(), 3);
    assert_eq!(tree.leaf_taxids(), vec![10]);
    assert_eq!(summary.merged_taxids, 1);
    assert_eq!(summary.distinct_taxids, 2);
}

#[test]
fn test_unknown_taxid_is_surfaced() {
    let taxonomy = taxonomy();
    let (tree, summary) = bintax::tree_from_taxids(&[10, 999, 999], &taxonomy).unwrap();

    assert_eq!(tree.root().count(), 1);
    assert_eq!(summary.input_samples, 3);
    assert_eq!(summary.unknown_taxids, 1);
    assert_eq!(summary.uncounted_samples(), 2);
}

#[test]
fn test_unresolvable_element_skipped() {
    let taxonomy = taxonomy();
    let (tree, summary) = bintax::tree_from_taxids(&[40, 10], &taxonomy).unwrap();

    // Parent 41 is missing, so 40 hangs directly below the root
    let orphan = tree.child(tree.root_index(), 40).unwrap();
    assert_eq!(tree[orphan].count(), 1);
    assert_eq!(tree.root().count(), 2);
    assert_eq!(summary.unresolved_elements, 1);
    assert_eq!(summary.uncounted_samples(), 0);
}

#[test]
fn test_add_taxid_returns_placement() {
    let taxonomy = taxonomy();
    let mut builder = CountTreeBuilder::new(&taxonomy);

    let placed = builder.add_taxid(20, 4);
    assert!(placed.is_some());
    assert_eq!(builder.add_taxid(999, 1), None);

    let (tree, summary) = builder.build();
    assert_eq!(tree[placed.unwrap()].taxid(), 20);
    assert_eq!(tree[placed.unwrap()].count(), 4);
    assert_eq!(summary.input_samples, 5);
    assert_eq!(summary.counted_samples, 4);
}

#[test]
fn test_empty_input() {
    let taxonomy = taxonomy();
    let result = bintax::tree_from_taxids(&[], &taxonomy);
    assert!(matches!(result, Err(Error::EmptyInput)));
}

// --- MANUAL CONSTRUCTION ---
#[test]
fn test_add_path_without_reference() {
    let mut tree = CountTree::new(1);
    let leaf = tree.add_path(&[1, 2, 3], 5);
    tree.add_path(&[2, 4], 1); // root taxid may be omitted

    assert_eq!(tree[leaf].taxid(), 3);
    assert_eq!(tree[leaf].rank(), "no rank");
    assert_eq!(tree.root().count(), 6);
    assert_eq!(tree.num_nodes(), 4);
    assert_eq!(tree.num_leaves(), 2);
    assert_eq!(tree[tree.child(0, 2).unwrap()].count(), 6);
}

#[test]
fn test_same_taxid_under_different_parents() {
    let mut tree = CountTree::new(1);
    let a = tree.add_path(&[1, 2, 9], 1);
    let b = tree.add_path(&[1, 3, 9], 1);
    assert_ne!(a, b);
    assert_eq!(tree.leaf_taxids(), vec![9, 9]);
}

// --- FILES ---
#[test]
fn test_tree_from_taxid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.taxids");
    fs::write(&path, "10\n10\n# comment\n\n20\n30\n").unwrap();

    let (tree, summary) = bintax::tree_from_taxid_file(&path, &taxonomy()).unwrap();
    assert_eq!(tree.root().count(), 4);
    assert_eq!(summary.input_samples, 4);
}

#[test]
fn test_unreadable_taxid_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.taxids");
    fs::write(&path, b"10\n\xe9\n").unwrap();

    match bintax::tree_from_taxid_file(&path, &taxonomy()) {
        Err(Error::UnreadableLine { source_name, line, .. }) => {
            assert_eq!(source_name, path.display().to_string());
            assert_eq!(line, 2);
        }
        other => panic!("Expected UnreadableLine, got {:?}", other.map(|(_, s)| s)),
    }
}

#[test]
fn test_invalid_taxid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.taxids");
    fs::write(&path, "10\n-3\n").unwrap();

    match bintax::tree_from_taxid_file(&path, &taxonomy()) {
        Err(Error::InvalidTaxid { line, content, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "-3");
        }
        other => panic!("Expected InvalidTaxid, got {:?}", other.map(|(_, s)| s)),
    }
}
