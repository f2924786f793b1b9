//! Build the index once and report the result

use anyhow::Result;

use crate::Blog;

/// Build the index, returning how many posts it holds
pub fn run(blog: &Blog) -> Result<usize> {
    let start = std::time::Instant::now();
    let index = blog.load_all()?;
    tracing::debug!("Checked in {:.2}s", start.elapsed().as_secs_f64());
    Ok(index.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir(&posts).unwrap();
        fs::write(posts.join("ok.yaml"), "title: fine\n").unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(run(&blog).unwrap(), 1);

        fs::write(posts.join("broken.yaml"), "title: [oops\n").unwrap();
        let err = run(&blog).unwrap_err();
        assert!(format!("{}", err).contains("broken.yaml"));
    }

    #[test]
    fn test_check_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(run(&blog).is_err());
    }
}
