use crate::timeline::model::{AudioSelection, Timeline};
use crate::timeline::presets::is_preset_track;
use std::collections::HashSet;
use std::fmt;

/// Location of a validation failure inside a timeline document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPathElem {
    /// Named field.
    Field(&'static str),
    /// Sequence index.
    Index(usize),
}

/// One validation failure with its document path.
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Path from the document root to the offending value.
    pub path: Vec<SchemaPathElem>,
    /// Human-readable description of the failure.
    pub message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// All validation failures found in one pass over a timeline.
#[derive(Debug, Clone)]
pub struct SchemaErrors {
    /// Failures in document order.
    pub errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

/// Validate a timeline's model invariants, accumulating every failure.
///
/// A timeline with zero slides is accepted; the composition floors to a
/// single frame instead of rejecting the export.
pub fn validate_timeline(timeline: &Timeline) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();
    let mut ids = HashSet::<&str>::new();

    for (i, slide) in timeline.slides.iter().enumerate() {
        let base = [SchemaPathElem::Field("slides"), SchemaPathElem::Index(i)];

        if slide.id.trim().is_empty() {
            errors.push(SchemaError::at(
                &[&base[..], &[SchemaPathElem::Field("id")]].concat(),
                "slide id must be non-empty",
            ));
        } else if !ids.insert(slide.id.as_str()) {
            errors.push(SchemaError::at(
                &[&base[..], &[SchemaPathElem::Field("id")]].concat(),
                format!("duplicate slide id \"{}\"", slide.id),
            ));
        }

        if slide.reference.trim().is_empty() {
            errors.push(SchemaError::at(
                &[&base[..], &[SchemaPathElem::Field("reference")]].concat(),
                "slide reference must be non-empty",
            ));
        }

        if !slide.duration_seconds.is_finite() || slide.duration_seconds <= 0.0 {
            errors.push(SchemaError::at(
                &[&base[..], &[SchemaPathElem::Field("duration_seconds")]].concat(),
                "slide duration_seconds must be finite and > 0",
            ));
        }
    }

    match &timeline.audio {
        AudioSelection::None => {}
        AudioSelection::Preset(name) => {
            if !is_preset_track(name) {
                errors.push(SchemaError::at(
                    &[SchemaPathElem::Field("audio")],
                    format!("unknown preset track \"{name}\""),
                ));
            }
        }
        AudioSelection::Uploaded(reference) => {
            if reference.trim().is_empty() {
                errors.push(SchemaError::at(
                    &[SchemaPathElem::Field("audio")],
                    "uploaded audio reference must be non-empty",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::model::{AspectRatio, CaptionStyle, Slide, SlideKind};

    fn minimal_ok() -> Timeline {
        Timeline {
            slides: vec![Slide {
                id: "s1".to_owned(),
                kind: SlideKind::Image,
                reference: "/uploads/sess/a.jpg".to_owned(),
                caption: "hello".to_owned(),
                duration_seconds: 3.0,
            }],
            aspect_ratio: AspectRatio::Wide,
            caption_style: CaptionStyle::Simple,
            audio: AudioSelection::None,
        }
    }

    #[test]
    fn ok_timeline_validates() {
        validate_timeline(&minimal_ok()).unwrap();
    }

    #[test]
    fn zero_slides_is_accepted() {
        let mut tl = minimal_ok();
        tl.slides.clear();
        validate_timeline(&tl).unwrap();
    }

    #[test]
    fn rejects_duplicate_slide_ids() {
        let mut tl = minimal_ok();
        let dup = tl.slides[0].clone();
        tl.slides.push(dup);
        let err = validate_timeline(&tl).unwrap_err();
        assert!(err.to_string().contains("duplicate slide id"));
        assert!(err.to_string().contains("$.slides[1].id"));
    }

    #[test]
    fn rejects_non_positive_duration() {
        let mut tl = minimal_ok();
        tl.slides[0].duration_seconds = 0.0;
        let err = validate_timeline(&tl).unwrap_err();
        assert!(err.to_string().contains("duration_seconds must be finite and > 0"));
    }

    #[test]
    fn rejects_unknown_preset_track() {
        let mut tl = minimal_ok();
        tl.audio = AudioSelection::Preset("dubstep".to_owned());
        let err = validate_timeline(&tl).unwrap_err();
        assert!(err.to_string().contains("unknown preset track"));
    }

    #[test]
    fn accumulates_multiple_failures() {
        let mut tl = minimal_ok();
        tl.slides[0].id = String::new();
        tl.slides[0].duration_seconds = -1.0;
        let err = validate_timeline(&tl).unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }
}
