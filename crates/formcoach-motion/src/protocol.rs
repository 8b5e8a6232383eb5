//! Streaming decoder for the wearable's newline-delimited sample feed.
//!
//! Each notification is one text line:
//!
//! ```text
//! Acc[X,Y,Z]:0.012,0.981,-0.044 Gyro[X,Y,Z]:1.50,-0.25,0.88
//! ```
//!
//! Either section may be absent; they appear in a fixed order with
//! nothing else on the line. Push raw bytes in with
//! [`FeedParser::push_data`], then drain decoded frames with
//! [`FeedParser::next_frame`]. The decoder only checks shape; value
//! validation (finiteness) happens downstream in the session.

use std::collections::VecDeque;

use glam::Vec3;
use thiserror::Error;

use crate::types::SampleFrame;

/// Marker introducing the acceleration triple (g).
const ACC_MARKER: &str = "Acc[X,Y,Z]:";
/// Marker introducing the angular-rate triple (deg/s).
const GYRO_MARKER: &str = "Gyro[X,Y,Z]:";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed line carries no sensor section")]
    NotSensorData,
    #[error("malformed {section} vector, expected three comma-separated numbers")]
    MalformedVector { section: &'static str },
    #[error("unexpected text after the sensor sections")]
    TrailingData,
    #[error("feed line is not valid UTF-8")]
    NotUtf8,
}

/// Incremental parser over the raw byte stream.
///
/// Bytes may arrive fragmented or with several lines per read; the
/// internal buffer holds whatever has not yet formed a complete line.
pub struct FeedParser {
    buffer: VecDeque<u8>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(4096),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Try to extract the next complete frame from the buffer.
    ///
    /// Returns `None` when no full line is buffered yet. Blank lines are
    /// skipped. A malformed line is reported once and consumed, so the
    /// stream recovers on the next newline.
    pub fn next_frame(&mut self) -> Option<Result<SampleFrame, FeedError>> {
        loop {
            let newline = self.buffer.iter().position(|&b| b == b'\n')?;
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let Ok(text) = std::str::from_utf8(&line) else {
                return Some(Err(FeedError::NotUtf8));
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(parse_line(text));
        }
    }

    /// Bytes currently buffered without a terminating newline.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one complete feed line into a frame.
///
/// Sections appear in a fixed order, acceleration first. Anything left on
/// the line after the recognized sections, other than whitespace, rejects
/// the whole line.
fn parse_line(line: &str) -> Result<SampleFrame, FeedError> {
    let mut rest = line.trim_start();

    let mut accel = None;
    if let Some(after) = rest.strip_prefix(ACC_MARKER) {
        let (vector, remainder) = take_vector(after, "acceleration")?;
        accel = Some(vector);
        rest = remainder.trim_start();
    }

    let mut gyro = None;
    if let Some(after) = rest.strip_prefix(GYRO_MARKER) {
        let (vector, remainder) = take_vector(after, "gyro")?;
        gyro = Some(vector);
        rest = remainder.trim_start();
    }

    if accel.is_none() && gyro.is_none() {
        return Err(FeedError::NotSensorData);
    }
    if !rest.is_empty() {
        return Err(FeedError::TrailingData);
    }
    Ok(SampleFrame { accel, gyro })
}

/// Parse the three-component vector at the start of `input`, returning it
/// together with whatever follows the vector token. The token runs up to
/// the next whitespace or end of line.
fn take_vector<'a>(input: &'a str, name: &'static str) -> Result<(Vec3, &'a str), FeedError> {
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let (value, remainder) = input.split_at(end);

    let mut components = [0.0f32; 3];
    let mut parts = value.split(',');
    for slot in components.iter_mut() {
        let part = parts
            .next()
            .ok_or(FeedError::MalformedVector { section: name })?;
        *slot = part
            .parse::<f32>()
            .map_err(|_| FeedError::MalformedVector { section: name })?;
    }
    if parts.next().is_some() {
        return Err(FeedError::MalformedVector { section: name });
    }

    Ok((Vec3::from_array(components), remainder))
}
