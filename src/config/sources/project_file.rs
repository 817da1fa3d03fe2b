//! Project config file source: the file passed on the command line.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::{File, FileFormat};
use std::path::Path;

/// Serialization format of a project file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Toml,
    Json,
}

impl ProjectFormat {
    pub fn from_path(path: &Path) -> ProjectFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ProjectFormat::Json,
            _ => ProjectFormat::Toml,
        }
    }

    fn file_format(self) -> FileFormat {
        match self {
            ProjectFormat::Toml => FileFormat::Toml,
            ProjectFormat::Json => FileFormat::Json,
        }
    }
}

/// Layer the project file's settings tables (`remote`, `timings`, `logging`) over earlier sources.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let format = ProjectFormat::from_path(path);
    Ok(builder.add_source(File::new(&path.to_string_lossy(), format.file_format()).required(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ProjectFormat::from_path(Path::new("a.json")), ProjectFormat::Json);
        assert_eq!(ProjectFormat::from_path(Path::new("a.JSON")), ProjectFormat::Json);
        assert_eq!(ProjectFormat::from_path(Path::new("a.toml")), ProjectFormat::Toml);
        assert_eq!(ProjectFormat::from_path(Path::new("a")), ProjectFormat::Toml);
    }
}
