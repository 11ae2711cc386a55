/// Reference-to-source resolution strategies per asset kind and context.
pub mod resolver;
/// Render-time source representation and MIME/locator helpers.
pub mod source;
