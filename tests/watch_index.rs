// tests/watch_index.rs

use inotools::errors::InotoolsError;
use inotools::index::WatchIndex;

fn index_with(entries: &[(i32, &str)]) -> WatchIndex {
    let mut index = WatchIndex::new();
    for (handle, path) in entries {
        index.insert(*handle, *path).unwrap();
    }
    index
}

#[test]
fn insert_makes_watch_reachable_by_both_keys() {
    let index = index_with(&[(1, "/tmp/a/"), (2, "/tmp/b.txt")]);

    assert_eq!(index.count(), 2);
    assert_eq!(index.find_by_handle(1).unwrap().path(), "/tmp/a/");
    assert_eq!(index.find_by_path("/tmp/b.txt").unwrap().handle(), 2);
    assert!(index.find_by_path("/tmp/a").is_none());
    assert!(index.find_by_handle(3).is_none());
}

#[test]
fn insert_rejects_bad_handle_and_empty_path() {
    let mut index = WatchIndex::new();

    assert!(matches!(
        index.insert(0, "/tmp/x"),
        Err(InotoolsError::InvalidArgument(_))
    ));
    assert!(matches!(
        index.insert(-4, "/tmp/x"),
        Err(InotoolsError::InvalidArgument(_))
    ));
    assert!(matches!(
        index.insert(1, ""),
        Err(InotoolsError::InvalidArgument(_))
    ));
    assert_eq!(index.count(), 0);
}

#[test]
fn reinserting_a_path_under_new_handle_replaces_old_record() {
    let mut index = index_with(&[(1, "/srv/data/")]);
    index.insert(7, "/srv/data/").unwrap();

    assert_eq!(index.count(), 1);
    assert!(index.find_by_handle(1).is_none());
    assert_eq!(index.find_by_path("/srv/data/").unwrap().handle(), 7);
}

#[test]
fn reinserting_a_handle_moves_it_to_the_new_path() {
    let mut index = index_with(&[(3, "/old")]);
    index.insert(3, "/new").unwrap();

    assert_eq!(index.count(), 1);
    assert!(index.find_by_path("/old").is_none());
    assert_eq!(index.find_by_handle(3).unwrap().path(), "/new");
}

#[test]
fn remove_is_idempotent() {
    let mut index = index_with(&[(1, "/a"), (2, "/b")]);

    let removed = index.remove(1).unwrap();
    assert_eq!(removed.path(), "/a");
    assert!(index.remove(1).is_none());
    assert!(index.find_by_path("/a").is_none());

    assert_eq!(index.remove_by_path("/b").unwrap().handle(), 2);
    assert!(index.remove_by_path("/b").is_none());
    assert!(index.is_empty());
}

#[test]
fn rename_rekeys_the_path_index() {
    let mut index = index_with(&[(1, "/tmp/old.txt")]);

    assert!(index.rename("/tmp/old.txt", "/tmp/new.txt"));
    assert!(index.find_by_path("/tmp/old.txt").is_none());
    assert_eq!(index.find_by_path("/tmp/new.txt").unwrap().handle(), 1);
    assert_eq!(index.find_by_handle(1).unwrap().path(), "/tmp/new.txt");

    assert!(!index.rename("/tmp/missing", "/tmp/other"));
}

#[test]
fn rename_onto_a_watched_path_evicts_the_previous_holder() {
    let mut index = index_with(&[(1, "/x"), (2, "/y")]);

    assert!(index.set_path(1, "/y"));
    assert_eq!(index.count(), 1);
    assert_eq!(index.find_by_path("/y").unwrap().handle(), 1);
    assert!(index.find_by_handle(2).is_none());
}

#[test]
fn set_path_on_unknown_handle_does_nothing() {
    let mut index = index_with(&[(1, "/x")]);

    assert!(!index.set_path(9, "/z"));
    assert!(!index.set_path(1, ""));
    assert_eq!(index.find_by_handle(1).unwrap().path(), "/x");
}

#[test]
fn rename_prefix_rewrites_matching_paths_and_keeps_suffix() {
    let mut index = index_with(&[
        (1, "/home/u/proj/"),
        (2, "/home/u/proj/src/"),
        (3, "/home/u/proj/src/main.rs"),
        (4, "/home/u/other/"),
    ]);

    let renamed = index.rename_prefix("/home/u/proj/", "/home/u/app/");

    assert_eq!(renamed, 2);
    assert_eq!(index.find_by_handle(2).unwrap().path(), "/home/u/app/src/");
    assert_eq!(
        index.find_by_handle(3).unwrap().path(),
        "/home/u/app/src/main.rs"
    );
    assert_eq!(index.find_by_handle(4).unwrap().path(), "/home/u/other/");
    // the exact match would become the bare new prefix and is left alone
    assert_eq!(index.find_by_handle(1).unwrap().path(), "/home/u/proj/");
    assert!(index.find_by_path("/home/u/proj/src/").is_none());
}

#[test]
fn rename_prefix_is_idempotent_once_nothing_matches() {
    let mut index = index_with(&[(1, "/a/one"), (2, "/a/two"), (3, "/b/three")]);

    assert_eq!(index.rename_prefix("/a/", "/c/"), 2);
    let after_first: Vec<String> = index.iter().map(|w| w.path().to_string()).collect();

    assert_eq!(index.rename_prefix("/a/", "/c/"), 0);
    let after_second: Vec<String> = index.iter().map(|w| w.path().to_string()).collect();

    assert_eq!(after_first, after_second);
    assert_eq!(after_first, vec!["/c/one", "/c/two", "/b/three"]);
}

#[test]
fn rename_prefix_with_empty_old_prefix_is_a_no_op() {
    let mut index = index_with(&[(1, "/a")]);
    assert_eq!(index.rename_prefix("", "/b"), 0);
    assert_eq!(index.find_by_handle(1).unwrap().path(), "/a");
}

#[test]
fn iteration_orders_by_handle_and_by_path() {
    let index = index_with(&[(5, "/a"), (2, "/c"), (9, "/b")]);

    let handles: Vec<i32> = index.iter().map(|w| w.handle()).collect();
    assert_eq!(handles, vec![2, 5, 9]);

    let paths: Vec<&str> = index.iter_by_path().map(|w| w.path()).collect();
    assert_eq!(paths, vec!["/a", "/b", "/c"]);
}
