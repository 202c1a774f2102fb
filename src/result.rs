//! Result types for extraction output.
//!
//! An [`ExtractionResult`] is what every extraction stage produces: the
//! rebuilt body, its plain text and the text length. A [`Document`] is the
//! accepted outcome of a whole run, with metadata and optional comments.

use serde::{Deserialize, Serialize};

use crate::text;
use crate::tree::Tree;

/// Output of one extraction stage.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Output tree rooted at `body`, using the output vocabulary.
    pub body: Tree,

    /// Text of the body, fragments joined by single spaces.
    pub text: String,

    /// Character count of `text`.
    pub length: usize,
}

impl ExtractionResult {
    /// Computes text and length for a finished body.
    #[must_use]
    pub fn from_body(body: Tree) -> Self {
        let text = text::trim(&body.iter_text(body.root(), " "));
        let length = text.chars().count();
        Self { body, text, length }
    }

    /// Returns `true` if the body holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Document-level metadata gathered from the pristine tree.
///
/// All fields are optional as metadata may not be present in all documents.
/// Metadata never influences body extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Page title.
    pub title: Option<String>,

    /// Author name(s).
    pub author: Option<String>,

    /// Canonical URL of the document, or the configured `url`.
    pub url: Option<String>,

    /// Hostname of `url`.
    pub hostname: Option<String>,

    /// Page description (meta description).
    pub description: Option<String>,

    /// Site name (e.g., "New York Times").
    pub sitename: Option<String>,

    /// Declared document language (`<html lang>`).
    pub language: Option<String>,
}

/// Accepted result of an extraction run.
#[derive(Debug, Clone)]
pub struct Document {
    /// Extracted metadata about the document.
    pub metadata: DocumentMetadata,

    /// Main content tree rooted at `body`.
    pub body: Tree,

    /// Main content as plain text.
    pub text: String,

    /// Comments tree rooted at `body`, when comments were requested and found.
    pub comments_body: Option<Tree>,

    /// Comments as plain text.
    pub comments: Option<String>,
}

impl Document {
    pub(crate) fn new(
        metadata: DocumentMetadata,
        main: ExtractionResult,
        comments: Option<ExtractionResult>,
    ) -> Self {
        let (comments_body, comments) = match comments {
            Some(result) => (Some(result.body), Some(result.text)),
            None => (None, None),
        };
        Self {
            metadata,
            body: main.body,
            text: main.text,
            comments_body,
            comments,
        }
    }

    /// Main content serialized as XML.
    #[must_use]
    pub fn body_xml(&self) -> String {
        self.body.to_xml(self.body.root())
    }

    /// Comments serialized as XML.
    #[must_use]
    pub fn comments_xml(&self) -> Option<String> {
        self.comments_body.as_ref().map(|tree| tree.to_xml(tree.root()))
    }
}
