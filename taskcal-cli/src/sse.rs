//! Incremental parser for `text/event-stream` bodies.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Fields collected since the last blank line.
#[derive(Debug, Default)]
struct FrameBuilder {
    event: Option<String>,
    data: Vec<String>,
}

impl FrameBuilder {
    /// Feed one line without its terminator. A blank line dispatches the frame.
    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.build();
        }

        // Comments, including keep-alives.
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn build(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        if event.is_none() && data.is_empty() {
            return None;
        }

        Some(SseFrame {
            event,
            data: data.join("\n"),
        })
    }
}

/// Buffers raw body chunks and yields complete frames.
///
/// Chunks may split a frame, a line or a multi-byte character anywhere.
/// Lines may end in `\n` or `\r\n`.
#[derive(Debug, Default)]
pub struct SseParser {
    line: Vec<u8>,
    builder: FrameBuilder,
}

impl SseParser {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();

        for &byte in chunk {
            if byte != b'\n' {
                self.line.push(byte);
                continue;
            }

            let line = std::mem::take(&mut self.line);
            let line = line.strip_suffix(b"\r").unwrap_or(&line);
            if let Some(frame) = self.builder.process_line(&String::from_utf8_lossy(line)) {
                frames.push(frame);
            }
        }

        frames
    }
}
