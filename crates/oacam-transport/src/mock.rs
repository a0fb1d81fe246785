//! Scripted byte stream for exercising serial protocols without hardware

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// In-memory port that replays scripted input and records output
#[derive(Debug, Default)]
pub struct ScriptedPort {
    input: VecDeque<u8>,
    output: Vec<u8>,
    write_limit: Option<usize>,
}

impl ScriptedPort {
    /// Create a port that will return `input` to readers
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Accept at most `limit` bytes per write call
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Queue more bytes for readers
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.output
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> usize {
        self.input.len()
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.input.pop_front() {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no scripted input")),
        }
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.write_limit.map_or(buf.len(), |limit| buf.len().min(limit));
        self.output.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
