//! Caller-side accumulation of a fragment stream.

use futures_util::StreamExt;

use crate::{FragmentStream, Notice, StreamFragment};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTranscript {
    content: String,
    notices: Vec<Notice>,
    rendered: String,
}

impl DispatchTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains `stream` to completion.
    pub async fn collect(mut stream: FragmentStream<'_>) -> Self {
        let mut transcript = Self::new();
        while let Some(fragment) = stream.next().await {
            transcript.push(&fragment);
        }
        transcript
    }

    pub fn push(&mut self, fragment: &StreamFragment) {
        self.rendered.push_str(&fragment.to_string());
        match fragment {
            StreamFragment::Content(text) => self.content.push_str(text),
            StreamFragment::Notice(notice) => self.notices.push(notice.clone()),
        }
    }

    /// Model text only, in arrival order.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Everything a client would have displayed, notices included.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn terminal_notice(&self) -> Option<&Notice> {
        self.notices.last().filter(|notice| notice.kind.is_terminal())
    }

    /// Content, or the terminal notice text when no content arrived.
    pub fn into_output(self) -> String {
        if !self.content.is_empty() {
            return self.content;
        }

        self.notices
            .into_iter()
            .rev()
            .find(|notice| notice.kind.is_terminal())
            .map(|notice| notice.text)
            .unwrap_or_default()
    }
}
