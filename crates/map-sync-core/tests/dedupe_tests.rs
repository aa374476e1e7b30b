use std::fs;
use std::path::Path;
use tempfile::tempdir;

use map_sync_core::dedupe::remove_duplicates;
use map_sync_core::SilentReporter;

fn count_files_recursive(dir: &Path) -> usize {
    let mut count = 0;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                count += count_files_recursive(&path);
            } else if path.is_file() {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn test_removes_one_of_two_identical_and_keeps_same_size_variant() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let a = root.join("A.map");
    let b = root.join("B.map");
    let c = root.join("C.map");
    fs::write(&a, b"identical payload").unwrap();
    fs::write(&b, b"identical payload").unwrap();
    fs::write(&c, b"identical paylOad").unwrap();

    let removed = remove_duplicates(root, &SilentReporter).unwrap();

    assert_eq!(removed, 1);
    assert!(a.exists());
    assert!(!b.exists());
    assert_eq!(fs::read(&c).unwrap(), b"identical paylOad");
}

#[test]
fn test_large_duplicates_in_subdirectories() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("a")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    fs::write(root.join("a").join("A.map"), vec![0xAAu8; 200_000]).unwrap();
    fs::write(root.join("b").join("B.map"), vec![0xAAu8; 200_000]).unwrap();
    let mut variant = vec![0xAAu8; 200_000];
    variant[150_000] = 0xAB;
    fs::write(root.join("b").join("C.map"), &variant).unwrap();

    let removed = remove_duplicates(root, &SilentReporter).unwrap();

    assert_eq!(removed, 1);
    assert!(root.join("a").join("A.map").exists());
    assert!(!root.join("b").join("B.map").exists());
    assert!(root.join("b").join("C.map").exists());
    assert_eq!(count_files_recursive(root), 2);
}

#[test]
fn test_keeps_first_in_listing_order_across_directories() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("a").join("Alpha.map"), "shared content xyz").unwrap();
    fs::write(root.join("b").join("Beta.map"), "shared content xyz").unwrap();
    fs::write(root.join("b").join("Bravo.map"), "shared content xyz").unwrap();
    fs::write(root.join("unique.map"), "unique").unwrap();

    let removed = remove_duplicates(root, &SilentReporter).unwrap();
    assert_eq!(removed, 2);
    assert!(root.join("a").join("Alpha.map").exists());
    assert!(!root.join("b").join("Beta.map").exists());
    assert!(!root.join("b").join("Bravo.map").exists());
    assert!(root.join("unique.map").exists());
}

#[test]
fn test_second_pass_is_a_no_op() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("x.map"), "dup").unwrap();
    fs::write(root.join("y.map"), "dup").unwrap();

    assert_eq!(remove_duplicates(root, &SilentReporter).unwrap(), 1);
    assert_eq!(remove_duplicates(root, &SilentReporter).unwrap(), 0);
    assert_eq!(count_files_recursive(root), 1);
}

#[test]
fn test_missing_root_is_an_error() {
    let tmp = tempdir().unwrap();
    assert!(remove_duplicates(&tmp.path().join("nope"), &SilentReporter).is_err());
}
