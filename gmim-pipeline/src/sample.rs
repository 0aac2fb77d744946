use std::path::{Path, PathBuf, is_separator};

use serde::Serialize;

use gmim_core::errors::{GmimError, Result};
use gmim_core::layout::SampleLayout;

/// One input sample and where its outputs go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSpec {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub base_name: Option<String>,
}

impl SampleSpec {
    /// A sample writing to `<input minus extension>_out` next to the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let out_dir = default_out_dir(&input);
        SampleSpec {
            input,
            out_dir,
            base_name: None,
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_base_name(mut self, base_name: Option<String>) -> Self {
        self.base_name = base_name;
        self
    }

    pub fn name(&self) -> String {
        self.input.display().to_string()
    }

    pub fn layout(&self) -> Result<SampleLayout> {
        if let Some(base) = &self.base_name {
            if base.is_empty() || base.chars().any(is_separator) {
                return Err(GmimError::InvalidConfig(format!(
                    "Cannot use a path as an output base name: {base:?}"
                )));
            }
        }
        Ok(SampleLayout::new(&self.out_dir, self.base_name.as_deref()))
    }
}

fn default_out_dir(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let stem = match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    };
    input.with_file_name(format!("{stem}_out"))
}
