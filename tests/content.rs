//! Index building against real post directories

use std::fs;
use std::path::{Path, PathBuf};

use yamlblog::config::MarkdownConfig;
use yamlblog::content::{ContentError, ContentLoader, SharedIndex};
use yamlblog::Blog;

fn write_post(dir: &Path, name: &str, title: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let yaml = format!(
        "title: {}\nexcerpt: about {}\ncreated: 2024-03-01\ncontent: |\n  {}\n",
        title, title, body
    );
    fs::write(&path, yaml).unwrap();
    path
}

fn loader(dir: &Path) -> ContentLoader {
    ContentLoader::new(dir, "yaml", &MarkdownConfig::default()).unwrap()
}

#[test]
fn test_build_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "one.yaml", "One", "first *post*");
    write_post(dir.path(), "two.yaml", "Two", "second post");

    let loader = loader(dir.path());
    let first = loader.load_all().unwrap();
    let second = loader.load_all().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_slug_from_file_name() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "hello-world.yaml", "Something Else Entirely", "hi");

    let index = loader(dir.path()).load_all().unwrap();
    let post = index.get("hello-world").unwrap();
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.title, "Something Else Entirely");
    assert_eq!(post.excerpt, "about Something Else Entirely");
    assert_eq!(post.date, "2024-03-01");
    assert_eq!(post.raw, "hi\n");
    assert_eq!(post.content, "<p>hi</p>\n");
}

#[test]
fn test_only_matching_extension_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "post.yaml", "Post", "body");
    fs::write(dir.path().join("notes.txt"), "not: a post").unwrap();
    fs::write(dir.path().join("draft.yml"), "title: [broken").unwrap();
    fs::create_dir(dir.path().join("folder.yaml")).unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    write_post(&nested, "deep.yaml", "Deep", "body");

    let index = loader(dir.path()).load_all().unwrap();
    let slugs: Vec<&str> = index.all().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["post"]);
}

#[test]
fn test_discovery_is_alphabetical() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "b.yaml", "B", "b");
    write_post(dir.path(), "a.yaml", "A", "a");
    write_post(dir.path(), "c.yaml", "C", "c");

    let files = loader(dir.path()).discover().unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.yaml", "b.yaml", "c.yaml"]);
}

#[test]
fn test_slug_collision_last_wins() {
    let dir = tempfile::tempdir().unwrap();
    let first_dir = dir.path().join("first");
    let second_dir = dir.path().join("second");
    fs::create_dir(&first_dir).unwrap();
    fs::create_dir(&second_dir).unwrap();
    let a = write_post(&first_dir, "same.yaml", "From First", "first");
    let b = write_post(&second_dir, "same.yaml", "From Second", "second");

    let loader = loader(dir.path());

    let index = loader.load_files(vec![a.clone(), b.clone()]).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.get("same").unwrap().title, "From Second");

    let index = loader.load_files(vec![b, a]).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.get("same").unwrap().title, "From First");
}

#[test]
fn test_parse_failure_aborts_build() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "a-good.yaml", "Good", "fine");
    fs::write(dir.path().join("b-bad.yaml"), "title: [unclosed\n").unwrap();
    fs::write(dir.path().join("c-worse.yaml"), "title: {also: [bad\n").unwrap();

    let err = loader(dir.path()).load_all().unwrap_err();
    match err {
        ContentError::Parse { path, .. } => assert!(path.ends_with("b-bad.yaml")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_failed_refresh_keeps_previous_index() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "kept.yaml", "Kept", "still here");

    let loader = loader(dir.path());
    let shared = SharedIndex::load(&loader).unwrap();
    let before = shared.snapshot();

    fs::write(dir.path().join("broken.yaml"), "title: [oops\n").unwrap();
    assert!(matches!(
        shared.refresh(&loader),
        Err(ContentError::Parse { .. })
    ));
    assert_eq!(*shared.snapshot(), *before);
    assert!(shared.snapshot().get("kept").is_some());

    fs::remove_file(dir.path().join("broken.yaml")).unwrap();
    write_post(dir.path(), "added.yaml", "Added", "new");
    let refreshed = shared.refresh(&loader).unwrap();
    assert_eq!(refreshed.len(), 2);
    assert!(shared.snapshot().contains("added"));
}

#[test]
fn test_missing_lookup_is_none() {
    let dir = tempfile::tempdir().unwrap();
    write_post(dir.path(), "exists.yaml", "Exists", "x");
    let index = loader(dir.path()).load_all().unwrap();
    assert!(index.get("does-not-exist").is_none());
}

#[test]
fn test_empty_store_is_empty_index() {
    let dir = tempfile::tempdir().unwrap();
    let index = loader(dir.path()).load_all().unwrap();
    assert!(index.is_empty());
}

#[test]
fn test_missing_store_is_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader(&dir.path().join("nope")).load_all().unwrap_err();
    assert!(matches!(err, ContentError::Discovery { .. }));
}

#[test]
fn test_blog_uses_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("_config.yml"),
        "posts_dir: entries\npost_extension: yml\n",
    )
    .unwrap();
    let entries = dir.path().join("entries");
    fs::create_dir(&entries).unwrap();
    write_post(&entries, "configured.yml", "Configured", "ok");
    write_post(&entries, "ignored.yaml", "Ignored", "no");

    let blog = Blog::new(dir.path()).unwrap();
    let index = blog.load_all().unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.contains("configured"));
}
