//! Platform-neutral rich reply.
//!
//! Mirrors what a chat embed can show: title, description, inline fields, an
//! image or thumbnail pointing at an attachment, and a footer. Adapters turn
//! this into the platform's own builders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Where the attached image is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePlacement {
    /// Full-width image under the fields
    Image,
    /// Small image in the corner
    Thumbnail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyAttachment {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub placement: ImagePlacement,
}

impl ReplyAttachment {
    /// `attachment://` URL the embed uses to reference this file
    pub fn url(&self) -> String {
        format!("attachment://{}", self.filename)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichReply {
    pub title: String,
    pub description: String,
    pub fields: Vec<ReplyField>,
    pub footer: Option<String>,
    pub attachment: Option<ReplyAttachment>,
}

impl RichReply {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) {
        self.fields.push(ReplyField {
            name: name.into(),
            value: value.into(),
            inline,
        });
    }

    pub fn field(&self, name: &str) -> Option<&ReplyField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
