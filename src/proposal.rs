//! Region proposals from an external UI element detector.
//!
//! The detector writes `<output_root>/ip/<image stem>.json` with a `compos`
//! array; this module runs it, reads that artifact back and turns each entry
//! into a [`Region`].

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{Error, Region, Result};

/// Produces the candidate regions for one screenshot.
pub trait RegionProposer: Send + Sync {
    fn propose(&self, image: &Path) -> Result<Vec<Region>>;
}

/// Key parameters handed to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProposalParams {
    pub min_grad: u32,
    pub ffl_block: u32,
    pub min_ele_area: u32,
    pub merge_contained_ele: bool,
    pub merge_line_to_paragraph: bool,
    pub remove_bar: bool,
    /// Target length of the longest edge the detector resizes to.
    pub resize_length: u32,
}

impl Default for ProposalParams {
    fn default() -> Self {
        Self {
            min_grad: 10,
            ffl_block: 5,
            min_ele_area: 50,
            merge_contained_ele: true,
            merge_line_to_paragraph: false,
            remove_bar: true,
            resize_length: 800,
        }
    }
}

/// Height the detector should resize to: `resize_length` for portrait images,
/// otherwise the height that keeps the aspect ratio at width `resize_length`.
#[instrument(level = "debug")]
pub fn resize_height_by_longest_edge(image: &Path, resize_length: u32) -> Result<u32> {
    let (width, height) = image::image_dimensions(image).map_err(|source| Error::Image {
        path: image.to_path_buf(),
        source,
    })?;
    Ok(resize_height(width, height, resize_length))
}

pub(crate) fn resize_height(width: u32, height: u32, resize_length: u32) -> u32 {
    if height > width {
        resize_length
    } else {
        (resize_length as f64 * (height as f64 / width as f64)) as u32
    }
}

#[derive(Debug, Deserialize)]
struct ComposArtifact {
    #[serde(default)]
    compos: Vec<RawCompo>,
}

#[derive(Debug, Deserialize)]
struct RawCompo {
    id: u32,
    column_min: i32,
    row_min: i32,
    width: i32,
    height: i32,
}

impl From<RawCompo> for Region {
    fn from(compo: RawCompo) -> Self {
        Region {
            id: compo.id,
            x: compo.column_min,
            y: compo.row_min,
            width: compo.width,
            height: compo.height,
        }
    }
}

/// Reads a detector artifact. A missing `compos` key means no regions.
#[instrument(level = "debug")]
pub fn read_artifact(path: &Path) -> Result<Vec<Region>> {
    let data = fs::read_to_string(path).map_err(|source| Error::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ComposArtifact =
        serde_json::from_str(&data).map_err(|source| Error::ArtifactFormat {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("Read {} components from {}", artifact.compos.len(), path.display());
    Ok(artifact.compos.into_iter().map(Region::from).collect())
}

/// Where the detector leaves the artifact for `image` under `output_root`.
pub fn artifact_path(output_root: &Path, image: &Path) -> Result<PathBuf> {
    let stem = image.file_stem().ok_or_else(|| {
        Error::Proposal(format!("image path {} has no file name", image.display()))
    })?;
    let mut name = stem.to_os_string();
    name.push(".json");
    Ok(output_root.join("ip").join(name))
}

/// Reads artifacts the detector already produced; never deletes them.
#[derive(Debug, Clone)]
pub struct ArtifactProposer {
    output_root: PathBuf,
}

impl ArtifactProposer {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }
}

impl RegionProposer for ArtifactProposer {
    fn propose(&self, image: &Path) -> Result<Vec<Region>> {
        read_artifact(&artifact_path(&self.output_root, image)?)
    }
}

/// Runs the detector program once per image and consumes its artifact.
///
/// The program is invoked as
/// `<program> [args..] <image> --output-root <dir> --resize-height <h>` followed
/// by one `--<key> <value>` pair per [`ProposalParams`] field.
#[derive(Debug, Clone)]
pub struct CommandProposer {
    program: PathBuf,
    args: Vec<OsString>,
    output_root: PathBuf,
    params: ProposalParams,
}

impl CommandProposer {
    pub fn new(program: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_root: output_root.into(),
            params: ProposalParams::default(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn params(mut self, params: ProposalParams) -> Self {
        self.params = params;
        self
    }

    fn command(&self, image: &Path, resize_height: u32) -> Command {
        let ProposalParams {
            min_grad,
            ffl_block,
            min_ele_area,
            merge_contained_ele,
            merge_line_to_paragraph,
            remove_bar,
            ..
        } = self.params;
        let flags = [
            ("--min-grad", min_grad.to_string()),
            ("--ffl-block", ffl_block.to_string()),
            ("--min-ele-area", min_ele_area.to_string()),
            ("--merge-contained-ele", merge_contained_ele.to_string()),
            ("--merge-line-to-paragraph", merge_line_to_paragraph.to_string()),
            ("--remove-bar", remove_bar.to_string()),
        ];

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(image)
            .arg("--output-root")
            .arg(&self.output_root)
            .arg("--resize-height")
            .arg(resize_height.to_string());
        for (flag, value) in flags {
            command.arg(flag).arg(value);
        }
        command
    }
}

impl RegionProposer for CommandProposer {
    #[instrument(level = "debug", skip(self))]
    fn propose(&self, image: &Path) -> Result<Vec<Region>> {
        let resize_height = resize_height_by_longest_edge(image, self.params.resize_length)?;
        let artifact = ArtifactGuard::new(artifact_path(&self.output_root, image)?);

        if let Some(dir) = artifact.path().parent() {
            fs::create_dir_all(dir).map_err(|source| Error::ArtifactIo {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let output = self
            .command(image, resize_height)
            .output()
            .map_err(|err| {
                Error::Proposal(format!("failed to run {}: {err}", self.program.display()))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Proposal(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        read_artifact(artifact.path())
    }
}

/// Removes the artifact when dropped, whether or not it was read.
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::trace!("Removed artifact {}", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("Failed to remove artifact {}: {err}", self.path.display()),
        }
    }
}
