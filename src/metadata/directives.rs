/// ExifTool argument file (`-@ FILE`) for keyword writes
///
/// One argument per line: `-keywords=<tag>` sets, `-keywords-=<tag>` removes.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::error::MetadataError;

/// Render the directive lines for a keyword write.
///
/// Duplicates are kept as given. Tags containing a line break would split
/// into two arguments, so they are refused.
pub fn render(tags: &[String], removals: &[String]) -> Result<String, MetadataError> {
    let mut out = String::new();

    for tag in tags {
        check_line(tag)?;
        out.push_str("-keywords=");
        out.push_str(tag);
        out.push('\n');
    }

    for tag in removals {
        check_line(tag)?;
        out.push_str("-keywords-=");
        out.push_str(tag);
        out.push('\n');
    }

    Ok(out)
}

fn check_line(tag: &str) -> Result<(), MetadataError> {
    if tag.contains(['\n', '\r']) {
        return Err(MetadataError::InvalidTag(tag.to_owned()));
    }
    Ok(())
}

/// Write the directives to a temporary file that is removed on drop
pub fn write_temp(tags: &[String], removals: &[String]) -> Result<NamedTempFile, MetadataError> {
    let contents = render(tags, removals)?;

    let mut file = tempfile::Builder::new()
        .prefix("pic-tagger-")
        .suffix(".args")
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_sets_then_removals() {
        let rendered = render(&strings(&["novo", "широко"]), &strings(&["old"])).unwrap();
        assert_eq!(rendered, "-keywords=novo\n-keywords=широко\n-keywords-=old\n");
    }

    #[test]
    fn test_removing_last_tag() {
        let rendered = render(&[], &strings(&["last"])).unwrap();
        assert_eq!(rendered.lines().filter(|l| l.starts_with("-keywords-=")).count(), 1);
        assert_eq!(rendered.lines().filter(|l| l.starts_with("-keywords=")).count(), 0);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let rendered = render(&strings(&["a", "a"]), &[]).unwrap();
        assert_eq!(rendered, "-keywords=a\n-keywords=a\n");
    }

    #[test]
    fn test_multiline_tag_is_rejected() {
        let err = render(&strings(&["two\nlines"]), &[]).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidTag(_)));
    }

    #[test]
    fn test_temp_file_is_removed_on_drop() {
        let file = write_temp(&strings(&["a"]), &strings(&["b"])).unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "-keywords=a\n-keywords-=b\n"
        );
        drop(file);
        assert!(!path.exists());
    }
}
