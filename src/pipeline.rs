//! Collect, merge and lay out the image in one call.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::collect::{ReadProvider, SkippedInput, collect_chunks};
use crate::image::{
    ImageError, ImageOptions, ImageOutcome, build_image, image_range, write_image,
};
use crate::{Error, InputSpec, MergedImage, merge_chunks};

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub inputs: Vec<InputSpec>,
    pub image: ImageOptions,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub outcome: ImageOutcome,
    pub skipped: Vec<SkippedInput>,
}

impl Pipeline {
    pub fn new(inputs: Vec<InputSpec>, image: ImageOptions) -> Self {
        Self { inputs, image }
    }

    /// Build a pipeline from `path[@address]` tokens.
    pub fn from_tokens<I, S>(tokens: I, image: ImageOptions) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let inputs = tokens
            .into_iter()
            .map(|token| token.as_ref().parse::<InputSpec>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(inputs, image))
    }

    /// Decode and merge all inputs without laying out the image.
    pub fn merge(
        &self,
        provider: &impl ReadProvider,
    ) -> Result<(MergedImage, Vec<SkippedInput>), Error> {
        let collected = collect_chunks(&self.inputs, provider)?;
        let merged = merge_chunks(collected.chunks);
        log::debug!(
            "merged into {} span(s), {} data bytes",
            merged.spans().len(),
            merged.data_len()
        );
        Ok((merged, collected.skipped))
    }

    pub fn execute_to_vec(
        &self,
        provider: &impl ReadProvider,
    ) -> Result<(Vec<u8>, PipelineResult), Error> {
        let (merged, skipped) = self.merge(provider)?;
        let (data, outcome) = build_image(&merged, &self.image)?;
        warn_if_empty(&outcome);
        Ok((data, PipelineResult { outcome, skipped }))
    }

    /// Stream the image to `output`. The file only appears once it has been
    /// written completely; on failure any previous file at `output` is left
    /// untouched.
    pub fn execute_to_file(
        &self,
        provider: &impl ReadProvider,
        output: &Path,
    ) -> Result<PipelineResult, Error> {
        let (merged, skipped) = self.merge(provider)?;
        image_range(&merged, &self.image)?;
        let outcome =
            write_file_atomically(output, |writer| write_image(&merged, &self.image, writer))?;
        warn_if_empty(&outcome);
        Ok(PipelineResult { outcome, skipped })
    }
}

fn warn_if_empty(outcome: &ImageOutcome) {
    if outcome.is_empty() {
        log::warn!("no data segments found, output is empty");
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn write_file_atomically<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T, ImageError>,
) -> Result<T, Error> {
    let partial = partial_path(path);
    match write_new_file(&partial, path, write) {
        Ok(value) => {
            std::fs::rename(&partial, path).map_err(|source| Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(value)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}

/// Errors name `target`, the path the caller asked for, rather than the
/// temporary `path` being written.
fn write_new_file<T>(
    path: &Path,
    target: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T, ImageError>,
) -> Result<T, Error> {
    let wrap = |source: std::io::Error| Error::Write {
        path: target.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    let value = write(&mut writer).map_err(|e| match e {
        ImageError::Io(source) => wrap(source),
        other => Error::Image(other),
    })?;
    writer.flush().map_err(wrap)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryProvider, SourceError};

    #[test]
    fn test_execute_to_vec_mixed_inputs() {
        let provider = MemoryProvider::new()
            .with_file(
                "app.hex",
                b":020000040800F2\n:1000200022222222222222222222222222222222B0\n:00000001FF\n"
                    .to_vec(),
            )
            .with_file("boot.bin", vec![0x11; 16]);
        let pipeline = Pipeline::new(
            vec![
                "app.hex".parse().unwrap(),
                "boot.bin@0x08000000".parse().unwrap(),
            ],
            ImageOptions::default(),
        );
        let (data, result) = pipeline.execute_to_vec(&provider).unwrap();
        assert_eq!(data.len(), 0x30);
        assert_eq!(&data[..0x10], &[0x11; 0x10]);
        assert_eq!(&data[0x10..0x20], &[0xFF; 0x10]);
        assert_eq!(&data[0x20..], &[0x22; 0x10]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_execute_to_vec_nothing_usable() {
        let provider = MemoryProvider::new();
        let pipeline = Pipeline::new(
            vec![InputSpec::new("missing.hex")],
            ImageOptions::default(),
        );
        let (data, result) = pipeline.execute_to_vec(&provider).unwrap();
        assert!(data.is_empty());
        assert!(result.outcome.is_empty());
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn test_from_tokens() {
        let pipeline = Pipeline::from_tokens(
            ["app.hex", "boot.bin@0x08000000"],
            ImageOptions::default(),
        )
        .unwrap();
        assert_eq!(
            pipeline.inputs,
            vec![
                InputSpec::new("app.hex"),
                InputSpec::new("boot.bin").with_load_address(0x0800_0000),
            ]
        );
    }

    #[test]
    fn test_from_tokens_bad_address() {
        let result = Pipeline::from_tokens(["boot.bin@nowhere"], ImageOptions::default());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::InvalidAddress { .. })
        ));
        assert!(err.to_string().contains("boot.bin@nowhere"));
    }

    #[test]
    fn test_stream_failure_names_output_and_removes_partial() {
        let dir = std::env::temp_dir().join(format!("hexmerge_pipeline_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("fw.bin");

        let result: Result<(), Error> = write_file_atomically(&output, |_| {
            Err(ImageError::Io(std::io::Error::other("disk full")))
        });
        let err = result.unwrap_err();
        match &err {
            Error::Write { path, .. } => assert_eq!(path, &output),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("fw.bin"));
        assert!(err.to_string().contains("disk full"));
        assert!(!partial_path(&output).exists());
        assert!(!output.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("out/fw.bin")),
            PathBuf::from("out/fw.bin.part")
        );
    }
}
