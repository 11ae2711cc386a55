use std::path::{Path, PathBuf};
use std::time::Duration;

/// Paths, identifiers, and bounds for one pipeline instance.
///
/// All defaults are derived from a single public root so tests can point
/// the whole pipeline at a scratch directory and shrink the stage
/// timeout without touching global state.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Web root backing uploaded assets, preset audio, and outputs.
    pub public_dir: PathBuf,
    /// Session-scoped upload storage, `<public>/uploads` by default.
    pub uploads_dir: PathBuf,
    /// Preset background-music directory, `<public>/bgm` by default.
    pub bgm_dir: PathBuf,
    /// Rendered output directory, `<public>/out` by default.
    pub output_dir: PathBuf,
    /// Name of the composition instantiated for every export.
    pub composition_id: String,
    /// Upper bound on the composition-selection and encoding stages.
    pub stage_timeout: Duration,
}

impl PipelineConfig {
    /// Build a config rooted at `public_dir` with default subdirectories,
    /// composition id `"Slideshow"`, and a 120 second stage timeout.
    pub fn with_public_dir(public_dir: impl Into<PathBuf>) -> Self {
        let public_dir = public_dir.into();
        Self {
            uploads_dir: public_dir.join("uploads"),
            bgm_dir: public_dir.join("bgm"),
            output_dir: public_dir.join("out"),
            composition_id: "Slideshow".to_owned(),
            stage_timeout: Duration::from_secs(120),
            public_dir,
        }
    }

    /// Filesystem path backing a public web path such as
    /// `/uploads/<session>/<file>`.
    pub fn public_fs_path(&self, web_path: &str) -> PathBuf {
        self.public_dir.join(web_path.trim_start_matches('/'))
    }

    /// Filesystem path of the preset track `name`.
    pub fn preset_track_path(&self, name: &str) -> PathBuf {
        self.bgm_dir.join(format!("{name}.mp3"))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_public_dir(Path::new("public"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_from_public_root() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.uploads_dir, PathBuf::from("public/uploads"));
        assert_eq!(cfg.bgm_dir, PathBuf::from("public/bgm"));
        assert_eq!(cfg.output_dir, PathBuf::from("public/out"));
        assert_eq!(cfg.composition_id, "Slideshow");
        assert_eq!(cfg.stage_timeout, Duration::from_secs(120));
    }

    #[test]
    fn web_paths_map_under_public() {
        let cfg = PipelineConfig::with_public_dir("/srv/app/public");
        assert_eq!(
            cfg.public_fs_path("/uploads/s1/a.jpg"),
            PathBuf::from("/srv/app/public/uploads/s1/a.jpg")
        );
        assert_eq!(
            cfg.preset_track_path("calm"),
            PathBuf::from("/srv/app/public/bgm/calm.mp3")
        );
    }
}
