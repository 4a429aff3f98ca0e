use anyhow::anyhow;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file in a directory, the file name made by
/// substituting the key into a `{}` template.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn path_for_location_key(&self, location_key: &str) -> anyhow::Result<PathBuf> {
        let file_name = formatx!(&self.file_template, location_key).map_err(|e| {
            anyhow!(
                "Could not build output file name from template '{}': {e}",
                self.file_template
            )
        })?;

        Ok(self.directory_path.join(file_name))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.path_for_location_key(location_key)?,
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_substitute_location_key_into_file_name() {
        let output = FileOutput::new(PathBuf::from("out"), "stock_{}.csv".to_string());

        assert_eq!(
            output.path_for_location_key("results").unwrap(),
            PathBuf::from("out").join("stock_results.csv")
        );
    }

    #[rstest]
    fn should_write_to_file_in_directory() {
        let directory =
            std::env::temp_dir().join(format!("stock-heat-output-{}", std::process::id()));
        std::fs::create_dir_all(&directory).unwrap();
        let output = FileOutput::new(directory.clone(), "{}.csv".to_string());

        {
            let mut writer = output.writer_for_location_key("results").unwrap();
            writer.write_all(b"row\n0\n").unwrap();
        }

        assert_eq!(
            std::fs::read_to_string(directory.join("results.csv")).unwrap(),
            "row\n0\n"
        );
        std::fs::remove_dir_all(directory).unwrap();
    }

    #[rstest]
    fn should_be_noop_for_sink() {
        assert!(SinkOutput.is_noop());
        assert!(!FileOutput::new(PathBuf::new(), "{}".to_string()).is_noop());
    }
}
