/// Slide and timeline data model.
pub mod model;
/// Bundled caption styling and background-music catalogs.
pub mod presets;
/// Timeline invariant validation.
pub mod validate;
