use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use super::keywords::{self, KeywordFields, Resolution};
use super::{directives, MetadataStore};
use crate::error::MetadataError;

/// Charset flags so tags round-trip as UTF-8 on write
const WRITE_CHARSET_ARGS: [&str; 9] = [
    "-charset",
    "utf8",
    "-charset",
    "iptc=utf8",
    "-charset",
    "exif=utf8",
    "-charset",
    "filename=utf8",
    "-codedcharacterset=utf8",
];

/// `MetadataStore` backed by the `exiftool` command line tool.
///
/// Every call spawns a fresh process; nothing is cached between reads.
#[derive(Debug, Clone)]
pub struct ExifTool {
    /// Program followed by any leading arguments (e.g. `perl exiftool.pl`)
    command: Vec<String>,
}

impl ExifTool {
    /// Build a store from a command prefix. An empty prefix means `exiftool`.
    pub fn new(command: Vec<String>) -> Self {
        let command = if command.is_empty() {
            vec!["exiftool".to_string()]
        } else {
            command
        };
        Self { command }
    }

    fn program(&self) -> &str {
        &self.command[0]
    }

    /// Run the tool with `args` and return its stdout, failing on a non-zero exit
    fn run<I, S>(&self, args: I) -> Result<String, MetadataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(self.program());
        cmd.args(&self.command[1..])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MetadataError::ToolNotFound(self.program().to_string()),
            _ => MetadataError::Io(e),
        })?;

        check_status(&output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Structured query of the two keyword fields
    fn query_fields(&self, path: &Path) -> Result<KeywordFields, MetadataError> {
        let args: [&OsStr; 5] = [
            OsStr::new("-j"),
            OsStr::new("-G"),
            OsStr::new("-EXIF:XPKeywords"),
            OsStr::new("-IPTC:Keywords"),
            path.as_os_str(),
        ];
        let stdout = self.run(args)?;
        KeywordFields::from_json(&stdout)
    }

    /// Plain listing, used when the structured value carries the marker
    fn read_listing(&self, path: &Path) -> Result<Vec<String>, MetadataError> {
        let args: [&OsStr; 3] = [
            OsStr::new("-charset"),
            OsStr::new("filename=utf8"),
            path.as_os_str(),
        ];
        let stdout = self.run(args)?;
        Ok(keywords::parse_listing(&stdout))
    }
}

fn check_status(output: &Output) -> Result<(), MetadataError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    tracing::error!("ExifTool exited with {}: {}", output.status, stderr);
    Err(MetadataError::ToolFailed {
        exit_code: output.status.code(),
        stderr,
    })
}

impl MetadataStore for ExifTool {
    fn read_keywords(&self, path: &Path) -> Result<Vec<String>, MetadataError> {
        let tags = match self.query_fields(path)?.resolve() {
            Resolution::Tags(tags) => tags,
            Resolution::NeedsFallback => {
                tracing::info!(
                    "Keywords of {} contain '?', re-reading plain listing",
                    path.display()
                );
                self.read_listing(path)?
            }
        };

        tracing::info!("Read {} tag(s) from {}: {:?}", tags.len(), path.display(), tags);
        Ok(tags)
    }

    fn write_keywords(
        &self,
        path: &Path,
        tags: &[String],
        removals: &[String],
    ) -> Result<(), MetadataError> {
        // Dropped (and deleted) once the process has finished
        let args_file = directives::write_temp(tags, removals)?;

        let mut args: Vec<&OsStr> = vec![OsStr::new("-P"), OsStr::new("-overwrite_original")];
        args.extend(WRITE_CHARSET_ARGS.into_iter().map(OsStr::new));
        args.push(OsStr::new("-@"));
        args.push(args_file.path().as_os_str());
        args.push(path.as_os_str());

        let stdout = self.run(args)?;

        tracing::info!(
            "Wrote {} tag(s), removed {:?} on {}: {}",
            tags.len(),
            removals,
            path.display(),
            stdout.trim()
        );
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Fake exiftool: a shell script run through `sh`
    fn fake_tool(dir: &TempDir, body: &str) -> ExifTool {
        let script = dir.path().join("fake-exiftool.sh");
        std::fs::write(&script, body).unwrap();
        ExifTool::new(vec!["sh".to_string(), script.to_string_lossy().into_owned()])
    }

    fn image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("007.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        path
    }

    #[test]
    fn test_read_structured_list() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(
            &dir,
            r#"cat <<'EOF'
[{"SourceFile": "007.jpg", "IPTC:Keywords": ["sea", "sun"]}]
EOF
"#,
        );
        let tags = tool.read_keywords(&image(&dir)).unwrap();
        assert_eq!(tags, vec!["sea".to_string(), "sun".to_string()]);
    }

    #[test]
    fn test_read_falls_back_on_marker() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(
            &dir,
            r#"if [ "$1" = "-j" ]; then
cat <<'EOF'
[{"SourceFile": "007.jpg", "IPTC:Keywords": ["???", "ok"]}]
EOF
else
cat <<'EOF'
File Name                       : 007.jpg
Keywords                        : кот, ok
EOF
fi
"#,
        );
        let tags = tool.read_keywords(&image(&dir)).unwrap();
        assert_eq!(tags, vec!["кот".to_string(), "ok".to_string()]);
    }

    #[test]
    fn test_read_without_keywords() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, "echo '[{\"SourceFile\": \"007.jpg\"}]'\n");
        assert!(tool.read_keywords(&image(&dir)).unwrap().is_empty());
    }

    #[test]
    fn test_write_passes_directive_file() {
        let dir = TempDir::new().unwrap();
        let captured = dir.path().join("captured.args");
        let argv = dir.path().join("argv.txt");
        let tool = fake_tool(
            &dir,
            &format!(
                r#"printf '%s\n' "$@" > '{argv}'
while [ $# -gt 0 ]; do
  if [ "$1" = "-@" ]; then cp "$2" '{captured}'; fi
  shift
done
echo "    1 image files updated"
"#,
                argv = argv.display(),
                captured = captured.display()
            ),
        );
        let target = image(&dir);

        tool.write_keywords(&target, &[], &["last".to_string()]).unwrap();

        let directives = std::fs::read_to_string(&captured).unwrap();
        assert_eq!(directives.lines().filter(|l| l.starts_with("-keywords-=")).count(), 1);
        assert_eq!(directives.lines().filter(|l| l.starts_with("-keywords=")).count(), 0);

        let argv = std::fs::read_to_string(&argv).unwrap();
        let argv: Vec<&str> = argv.lines().collect();
        assert_eq!(&argv[..2], &["-P", "-overwrite_original"]);
        assert!(argv.contains(&"-codedcharacterset=utf8"));
        assert!(argv.contains(&"iptc=utf8"));
        assert_eq!(argv.last().copied(), Some(target.to_str().unwrap()));

        // The argument file is scoped to the call
        let args_file = argv[argv.iter().position(|a| *a == "-@").unwrap() + 1];
        assert!(!Path::new(args_file).exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, "echo 'Error: File not found' >&2\nexit 1\n");
        let err = tool
            .write_keywords(&image(&dir), &["a".to_string()], &[])
            .unwrap_err();
        match err {
            MetadataError::ToolFailed { exit_code, stderr } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "Error: File not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_tool() {
        let tool = ExifTool::new(vec!["/nonexistent/exiftool-for-tests".to_string()]);
        let err = tool.read_keywords(Path::new("a.jpg")).unwrap_err();
        assert!(matches!(err, MetadataError::ToolNotFound(_)));
    }
}
