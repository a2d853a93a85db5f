//! Command-line path resolution.
//!
//! Arguments are classified by suffix only. There are no flags; anything
//! that is not a data or model path is ignored.

use std::path::{Path, PathBuf};

use super::config::{DATA_EXTENSION, MODEL_EXTENSION, PipelineConfig};

/// Input and output paths of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
}

/// Resolve the data and model paths from positional arguments.
///
/// The last argument ending in `.json` selects the training document and
/// the last one ending in `.bstr` selects the model file; defaults from
/// `config` apply otherwise. Relative paths are joined onto `base_dir`.
///
/// ```
/// use std::path::Path;
/// use boostfit::pipeline::{PipelineConfig, resolve_paths};
///
/// let paths = resolve_paths(["extra", "data/train.json"], Path::new("/opt/app"), &PipelineConfig::default());
/// assert_eq!(paths.data_path, Path::new("/opt/app/data/train.json"));
/// assert_eq!(paths.model_path, Path::new("/opt/app/boost_model.bstr"));
/// ```
pub fn resolve_paths<I, S>(args: I, base_dir: &Path, config: &PipelineConfig) -> ResolvedPaths
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut data_file = config.default_data_file.clone();
    let mut model_file = config.default_model_file.clone();

    for arg in args {
        let arg = arg.as_ref();
        if arg.ends_with(DATA_EXTENSION) {
            data_file = arg.to_string();
        } else if arg.ends_with(MODEL_EXTENSION) {
            model_file = arg.to_string();
        }
    }

    ResolvedPaths {
        data_path: base_dir.join(data_file),
        model_path: base_dir.join(model_file),
    }
}

/// Directory holding the running executable.
///
/// Falls back to the working directory when the executable path is
/// unavailable.
pub fn executable_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    match exe.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn resolve(args: &[&str]) -> ResolvedPaths {
        resolve_paths(args.iter().copied(), Path::new("/base"), &PipelineConfig::default())
    }

    #[test]
    fn defaults_without_arguments() {
        let paths = resolve(&[]);
        assert_eq!(paths.data_path, Path::new("/base/catboost_training_data.json"));
        assert_eq!(paths.model_path, Path::new("/base/boost_model.bstr"));
    }

    #[rstest]
    #[case(&["in.json", "out.bstr"])]
    #[case(&["out.bstr", "in.json"])]
    #[case(&["--verbose", "out.bstr", "notes.txt", "in.json"])]
    fn order_is_irrelevant(#[case] args: &[&str]) {
        let paths = resolve(args);
        assert_eq!(paths.data_path, Path::new("/base/in.json"));
        assert_eq!(paths.model_path, Path::new("/base/out.bstr"));
    }

    #[test]
    fn last_match_wins() {
        let paths = resolve(&["first.json", "second.json", "a.bstr", "b.bstr"]);
        assert_eq!(paths.data_path, Path::new("/base/second.json"));
        assert_eq!(paths.model_path, Path::new("/base/b.bstr"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let paths = resolve(&["/data/train.json", "/models/m.bstr"]);
        assert_eq!(paths.data_path, Path::new("/data/train.json"));
        assert_eq!(paths.model_path, Path::new("/models/m.bstr"));
    }

    #[test]
    fn suffix_must_match_exactly() {
        let paths = resolve(&["train.json.bak", "model.bstr.old", "json", "bstr"]);
        assert_eq!(paths, resolve(&[]));
    }

    #[test]
    fn executable_dir_is_parent_of_current_exe() {
        let exe = std::env::current_exe().unwrap();
        let dir = executable_dir().unwrap();
        assert_eq!(Some(dir.as_path()), exe.parent());
        assert!(dir.is_dir());
    }

    #[test]
    fn relative_arguments_land_next_to_executable() {
        let dir = executable_dir().unwrap();
        let paths = resolve_paths(["in.json"], &dir, &PipelineConfig::default());
        assert_eq!(paths.data_path, dir.join("in.json"));
        assert_eq!(paths.model_path, dir.join("boost_model.bstr"));
    }
}
