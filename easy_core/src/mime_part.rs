/// Payload of a multipart body part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeData {
    Text(String),
    Bytes(Vec<u8>),
}

impl MimeData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MimeData::Text(s) => s.as_bytes(),
            MimeData::Bytes(b) => b,
        }
    }
}

/// Description of one part of a multipart (`MIMEPOST`) body.
///
/// Nested `subparts` turn the part into a `multipart/mixed` container; in that
/// case `data` is ignored by the native side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    pub name: String,
    pub filename: Option<String>,
    pub data: MimeData,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub subparts: Vec<MimePart>,
}

impl MimePart {
    pub fn text(name: &str, data: &str) -> Self {
        Self::with_data(name, MimeData::Text(data.to_string()))
    }

    pub fn bytes(name: &str, data: &[u8]) -> Self {
        Self::with_data(name, MimeData::Bytes(data.to_vec()))
    }

    fn with_data(name: &str, data: MimeData) -> Self {
        MimePart {
            name: name.to_string(),
            filename: None,
            data,
            content_type: None,
            headers: Vec::new(),
            subparts: Vec::new(),
        }
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Extra part header; any displayable value is formatted as `name: value`.
    pub fn header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn subpart(mut self, part: MimePart) -> Self {
        self.subparts.push(part);
        self
    }

    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let part = MimePart::bytes("upload", b"\x00\x01")
            .filename("blob.bin")
            .content_type("application/octet-stream")
            .header("X-Size", 2)
            .subpart(MimePart::text("inner", "hi"));

        assert_eq!(part.data.as_bytes(), b"\x00\x01");
        assert_eq!(part.filename.as_deref(), Some("blob.bin"));
        assert_eq!(part.header_lines(), vec!["X-Size: 2".to_string()]);
        assert_eq!(part.subparts.len(), 1);
    }
}
