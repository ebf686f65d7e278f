//! Image upload bookkeeping.
//!
//! The transfer itself happens in the host (see the wasm bridge); this
//! module decides what a finished transfer means. Each upload is tied to the
//! tracker's current generation, and [`UploadTracker::teardown`] bumps it so
//! results arriving after the canvas went away are ignored.

use deck_core::element::ElementRef;
use deck_core::patch::Patch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Why a transfer failed. Crosses the wasm boundary as JSON, e.g.
/// `{"status": 413}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UploadError {
    #[error("upload rejected with HTTP {0}")]
    Status(u16),
    #[error("upload failed: {0}")]
    Network(String),
    #[error("upload response was not understood: {0}")]
    MalformedResponse(String),
}

/// Handle for one in-flight upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadTicket {
    pub element: ElementRef,
    generation: u64,
    serial: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The new URL should replace the element's image.
    Applied(Patch),
    /// The upload failed; the image is unchanged and the user is told once.
    Failed { element: ElementRef, alert: String },
    /// The result belongs to a torn-down scope or a superseded upload.
    Stale,
}

#[derive(Debug, Default)]
pub struct UploadTracker {
    generation: u64,
    next_serial: u64,
    in_flight: HashMap<ElementRef, UploadTicket>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an upload for `element`. `None` while one is already running.
    pub fn begin(&mut self, element: ElementRef) -> Option<UploadTicket> {
        if self.in_flight.contains_key(&element) {
            log::debug!("{element}: upload already in flight");
            return None;
        }
        self.next_serial += 1;
        let ticket = UploadTicket {
            element,
            generation: self.generation,
            serial: self.next_serial,
        };
        self.in_flight.insert(element, ticket);
        Some(ticket)
    }

    pub fn is_busy(&self, element: ElementRef) -> bool {
        self.in_flight.contains_key(&element)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolve a finished transfer.
    pub fn finish(
        &mut self,
        ticket: UploadTicket,
        result: Result<String, UploadError>,
    ) -> UploadOutcome {
        if ticket.generation != self.generation
            || self.in_flight.get(&ticket.element) != Some(&ticket)
        {
            log::debug!("{}: stale upload result ignored", ticket.element);
            return UploadOutcome::Stale;
        }
        self.in_flight.remove(&ticket.element);

        match result {
            Ok(url) => {
                log::info!("{}: image replaced with {url}", ticket.element);
                UploadOutcome::Applied(Patch::image_url(ticket.element, url))
            }
            Err(err) => {
                log::warn!("{}: {err}", ticket.element);
                UploadOutcome::Failed {
                    element: ticket.element,
                    alert: format!("Image upload failed. {err}"),
                }
            }
        }
    }

    /// Forget the upload running for `element`; its result comes back
    /// [`UploadOutcome::Stale`]. Returns `true` if one was in flight.
    pub fn abandon(&mut self, element: ElementRef) -> bool {
        let abandoned = self.in_flight.remove(&element).is_some();
        if abandoned {
            log::debug!("{element}: upload abandoned");
        }
        abandoned
    }

    /// Invalidate every in-flight upload.
    pub fn teardown(&mut self) {
        if !self.in_flight.is_empty() {
            log::debug!("abandoning {} in-flight upload(s)", self.in_flight.len());
        }
        self.generation += 1;
        self.in_flight.clear();
    }
}
